//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses and keys actually parse
//! - Validate value ranges (timeouts > 0, ceiling > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ClaimerConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::ClaimerConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClaimerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "network.rpc_http_url", &config.network.rpc_http_url, &["http", "https"]);
    check_url(&mut errors, "network.rpc_wss_url", &config.network.rpc_wss_url, &["ws", "wss"]);

    if config.network.rpc_timeout_secs == 0 {
        push(&mut errors, "network.rpc_timeout_secs", "must be greater than zero");
    }
    if config.network.keep_alive_interval_ms == 0 {
        push(&mut errors, "network.keep_alive_interval_ms", "must be greater than zero");
    }
    if config.network.expected_pong_ms == 0 {
        push(&mut errors, "network.expected_pong_ms", "must be greater than zero");
    }

    check_address(&mut errors, "claim.distributor_address", &config.claim.distributor_address);
    check_address(&mut errors, "claim.token_address", &config.claim.token_address);

    if config.claim.max_attempts == 0 {
        push(&mut errors, "claim.max_attempts", "must be greater than zero");
    }

    if config.gas.default_gas_limit == 0 {
        push(&mut errors, "gas.default_gas_limit", "must be greater than zero");
    }
    if config.gas.max_fee_gwei == 0 {
        push(&mut errors, "gas.max_fee_gwei", "must be greater than zero");
    }

    if config.accounts.is_empty() {
        push(&mut errors, "accounts", "at least one account is required");
    }
    for (i, account) in config.accounts.iter().enumerate() {
        let key_hex = account
            .private_key
            .strip_prefix("0x")
            .unwrap_or(&account.private_key);
        if key_hex.len() != 64 || !key_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            push(
                &mut errors,
                &format!("accounts[{}].private_key", i),
                "must be a 32-byte hex string",
            );
        }
        if let Some(forward_to) = &account.forward_to {
            check_address(&mut errors, &format!("accounts[{}].forward_to", i), forward_to);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn push(errors: &mut Vec<ValidationError>, field: &str, message: &str) {
    errors.push(ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    });
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str, schemes: &[&str]) {
    match value.parse::<url::Url>() {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => push(
            errors,
            field,
            &format!("unexpected scheme '{}', want one of {:?}", url.scheme(), schemes),
        ),
        Err(e) => push(errors, field, &format!("invalid URL: {}", e)),
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<Address>().is_err() {
        push(errors, field, "invalid address");
    }
}
