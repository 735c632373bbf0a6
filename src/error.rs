pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create decode error for files that are neither UTF-8 nor UTF-16
pub fn decode_error(path: &str) -> AppError {
    AppError::bad_request(format!(
        "Failed to decode file '{}': expected UTF-8 or UTF-16 text",
        path
    ))
}

/// Create error for a path that is neither a file nor a directory
pub fn path_error(path: &str) -> AppError {
    AppError::bad_request(format!("Invalid path '{}'", path))
}

/// Create directory traversal error
pub fn walk_error(path: &str, source: walkdir::Error) -> AppError {
    AppError::internal(format!("Failed to scan '{}': {}", path, source))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create config error for a rule selector that matches no rule
pub fn unknown_selector_error(setting: &str, selector: &str) -> AppError {
    config_error(format!(
        "Unknown rule selector '{}' in '{}': no rule id starts with it",
        selector, setting
    ))
}

/// Create serialization error
pub fn render_error(format: &str, message: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("Failed to render {} output: {}", format, message))
}
