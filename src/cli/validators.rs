use std::{path::PathBuf, time::Duration};

/// Validate a timeout in seconds (> 0 and representable as a `Duration`, fractions allowed)
pub fn validate_timeout(s: &str) -> Result<f64, String> {
    let val: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if !(val.is_finite() && val > 0.0) {
        return Err(format!("Timeout must be > 0, got {val}"));
    }
    Duration::try_from_secs_f64(val)
        .map(|_| val)
        .map_err(|e| format!("Timeout {val} is out of range: {e}"))
}

/// Validate a non-blank string argument
pub fn validate_non_empty(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    (!trimmed.is_empty())
        .then(|| trimmed.to_string())
        .ok_or_else(|| "Value must not be empty".to_string())
}

/// Validate file exists at the given path
pub fn validate_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("File does not exist: '{s}'"))
    }
}
