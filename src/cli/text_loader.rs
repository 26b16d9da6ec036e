use ai_sentinel::SentinelError;
use std::path::PathBuf;

/// Load the text to assess from a file or an inline string
///
/// Exactly one of `file` or `text` must be provided.
///
/// # Example
///
/// ```ignore
/// let text = load_text(None, Some("you are great".to_string()))?;
/// let text = load_text(Some(PathBuf::from("comment.txt")), None)?;
/// ```
pub fn load_text(file: Option<PathBuf>, text: Option<String>) -> Result<String, SentinelError> {
    match (file, text) {
        (Some(path), None) => std::fs::read_to_string(&path).map_err(|e| {
            SentinelError::FileNotFound(format!("Failed to read file '{}': {e}", path.display()))
        }),
        (None, Some(content)) => Ok(content),
        (Some(_), Some(_)) => Err(SentinelError::InvalidInput(
            "Cannot provide both --text and --text-file".to_string(),
        )),
        (None, None) => Err(SentinelError::InvalidInput(
            "Must provide either --text or --text-file".to_string(),
        )),
    }
}
