//! Liveness watcher tests against a local WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use airdrop_claimer::config::NetworkConfig;
use airdrop_claimer::watcher::{HeightEvent, LivenessWatcher};

fn ack() -> Message {
    Message::text(r#"{"jsonrpc":"2.0","id":1,"result":"0xfeed"}"#)
}

fn head_notification(height: u64) -> Message {
    Message::text(format!(
        r#"{{"jsonrpc":"2.0","method":"eth_subscription","params":{{"subscription":"0xfeed","result":{{"number":"0x{:x}"}}}}}}"#,
        height
    ))
}

fn test_config(addr: std::net::SocketAddr) -> NetworkConfig {
    NetworkConfig {
        rpc_wss_url: format!("ws://{}", addr),
        keep_alive_interval_ms: 60_000,
        expected_pong_ms: 60_000,
        reconnect_base_ms: 10,
        reconnect_max_ms: 50,
        ..NetworkConfig::default()
    }
}

/// Accept one connection, ack the subscription, push heights, then drop.
async fn serve_once(listener: &TcpListener, heights: &[u64]) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();

    // Wait for the eth_subscribe request
    while let Some(Ok(msg)) = ws.next().await {
        if msg.is_text() {
            break;
        }
    }
    ws.send(ack()).await.unwrap();
    for &height in heights {
        ws.send(head_notification(height)).await.unwrap();
    }
}

/// Accept connections forever, streaming heights until the peer goes away.
async fn serve_forever(listener: TcpListener) {
    let mut height = 1_000;
    loop {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(_) => continue,
        };
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_text() {
                break;
            }
        }
        if ws.send(ack()).await.is_err() {
            continue;
        }
        loop {
            height += 1;
            if ws.send(head_notification(height)).await.is_err() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn collect_events(rx: &mut mpsc::Receiver<HeightEvent>, count: usize) -> Vec<HeightEvent> {
    let mut events = Vec::new();
    timeout(Duration::from_secs(10), async {
        while events.len() < count {
            match rx.recv().await {
                Some(event) => events.push(event),
                None => break,
            }
        }
    })
    .await
    .expect("expected events did not arrive");
    events
}

#[tokio::test]
async fn reconnect_replays_heights_with_fresh_subscription() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // First connection delivers two heights then drops; the second
        // replays a lower height than already seen.
        serve_once(&listener, &[101, 102]).await;
        serve_once(&listener, &[100]).await;
        serve_forever(listener).await;
    });

    let (tx, mut rx) = mpsc::channel(32);
    tokio::spawn(LivenessWatcher::new(test_config(addr)).run(tx));

    let events = collect_events(&mut rx, 5).await;
    assert_eq!(
        events,
        vec![
            HeightEvent::Connected,
            HeightEvent::Height(101),
            HeightEvent::Height(102),
            HeightEvent::Connected,
            HeightEvent::Height(100),
        ]
    );
}

#[tokio::test]
async fn missed_pong_forces_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // First connection goes silent after one height: it stops reading,
        // so liveness pings never get a pong.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_text() {
                break;
            }
        }
        ws.send(ack()).await.unwrap();
        ws.send(head_notification(50)).await.unwrap();
        sleep(Duration::from_secs(2)).await;
        drop(ws);

        serve_once(&listener, &[51]).await;
        serve_forever(listener).await;
    });

    let config = NetworkConfig {
        keep_alive_interval_ms: 50,
        expected_pong_ms: 100,
        ..test_config(addr)
    };
    let (tx, mut rx) = mpsc::channel(32);
    tokio::spawn(LivenessWatcher::new(config).run(tx));

    let events = collect_events(&mut rx, 4).await;
    assert_eq!(
        events,
        vec![
            HeightEvent::Connected,
            HeightEvent::Height(50),
            HeightEvent::Connected,
            HeightEvent::Height(51),
        ]
    );
}

#[tokio::test]
async fn watcher_stops_when_downstream_is_dropped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        serve_forever(listener).await;
    });

    let (tx, mut rx) = mpsc::channel(32);
    let handle = tokio::spawn(LivenessWatcher::new(test_config(addr)).run(tx));

    let events = collect_events(&mut rx, 2).await;
    assert_eq!(events[0], HeightEvent::Connected);
    drop(rx);

    // The run loop must notice the closed channel and finish.
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("watcher did not stop")
        .unwrap();
}
