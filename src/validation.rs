use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Check a `0x`-prefixed, 20-byte hex address
pub fn validate_evm_address(address: &str) -> Result<(), ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ValidationError::InvalidAddress(address.to_string()))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    Ok(())
}

/// Parse an optional fid query value. Blank counts as absent.
pub fn validate_fid(fid: Option<&str>) -> Result<Option<u64>, ValidationError> {
    let Some(raw) = fid.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(ValidationError::InvalidParameter(format!(
            "fid must be a positive integer, got '{}'",
            raw
        ))),
        Ok(fid) => Ok(Some(fid)),
    }
}

/// Farcaster usernames: 1-20 chars of lowercase letters, digits, '-' and '_',
/// optionally a `.eth` suffix. An optional leading '@' is stripped.
pub fn validate_username(username: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(raw) = username.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let name = raw.trim_start_matches('@').to_lowercase();
    let base = name.strip_suffix(".eth").unwrap_or(&name);
    let valid = !base.is_empty()
        && base.len() <= 20
        && base
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if !valid {
        return Err(ValidationError::InvalidParameter(format!("invalid username '{}'", raw)));
    }
    Ok(Some(name))
}
