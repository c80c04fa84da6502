use std::net::IpAddr;

/// Validation outcome with a specific error message
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { is_valid: true, error: None }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(msg.into()) }
    }
}

/// Validate a host identifier (IP address or hostname).
///
/// The host string later becomes a single argv element of the probe
/// subprocess, so anything outside the plain hostname character set is
/// rejected here, before it can reach a network primitive.
pub fn validate_hostname(target: &str) -> ValidationResult {
    let target = target.trim();

    if target.is_empty() {
        return ValidationResult::err("host cannot be empty");
    }

    // IP addresses pass as-is
    if target.parse::<IpAddr>().is_ok() {
        return ValidationResult::ok();
    }

    if target.contains(char::is_whitespace) {
        return ValidationResult::err("host cannot contain whitespace");
    }

    if target.starts_with('-') || target.ends_with('-') {
        return ValidationResult::err("hostname cannot start or end with hyphen");
    }

    if target.len() > 253 {
        return ValidationResult::err("hostname too long (max 253 characters)");
    }

    if target.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
        ValidationResult::ok()
    } else {
        ValidationResult::err("invalid host. Use an IP address or a valid hostname")
    }
}
