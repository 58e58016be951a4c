/// Centralized error types for diff-context using thiserror
///
/// Two families live here. `ContextError`, `DiffError` and `DescriptorError`
/// are ordinary `Result` errors raised while loading configuration, strictly
/// parsing a diff, or splitting a component file. `ExtractError` is the per-file failure
/// taxonomy: its `Display` output is the error tag string recorded on an
/// `ExtractionResult`, so it never crosses the dispatch boundary as an `Err`.
use thiserror::Error;

/// Main error type for diff-context
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors raised by the strict unified-diff helpers
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiffError {
    #[error("Invalid hunk header: {0}")]
    InvalidHunkHeader(String),

    #[error("Diff contains no hunks")]
    Empty,
}

/// Structural problems in a component file's top-level blocks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("<{tag}> opened on line {line} is never closed")]
    Unclosed { tag: String, line: usize },

    #[error("duplicate <{tag}> block on line {line}")]
    Duplicate { tag: String, line: usize },
}

impl From<DescriptorError> for ExtractError {
    fn from(err: DescriptorError) -> Self {
        ExtractError::Parse(format!("component descriptor: {}", err))
    }
}

/// Per-file extraction failure categories.
///
/// The `Display` string of each variant is the tag stored in
/// `ExtractionResult::errors` / `ExtractionResult::warnings`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("file_not_readable")]
    FileNotReadable { path: String, reason: String },

    #[error("parse_error: {0}")]
    Parse(String),

    #[error("traverse_error: {0}")]
    Traverse(String),

    #[error("depth_exceeded: traversal stopped at depth {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("timeout: {stage} exceeded {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    #[error("unsupported_file_type")]
    UnsupportedFileType(String),

    #[error("syntax_recovered: {0} syntax error(s) tolerated")]
    SyntaxRecovered(usize),

    #[error("unexpected_error: {0}")]
    Unexpected(String),
}

impl ContextError {
    /// Check if this is a configuration problem the operator has to fix
    pub fn is_config_error(&self) -> bool {
        matches!(self, ContextError::Config(_))
    }
}

impl ExtractError {
    /// The tag string recorded on an extraction result
    pub fn tag(&self) -> String {
        self.to_string()
    }

    /// Warning-level conditions keep whatever partial results were collected
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ExtractError::DepthExceeded { .. } | ExtractError::SyntaxRecovered(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: ContextError = ConfigError::FileNotFound("diff-context.toml".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Configuration file not found: diff-context.toml"
        );
    }

    #[test]
    fn test_is_config_error() {
        let config_err = ContextError::Config(ConfigError::InvalidValue {
            key: "analysis.max_depth".to_string(),
            reason: "must be greater than 0".to_string(),
        });
        assert!(config_err.is_config_error());
    }

    #[test]
    fn test_diff_error_display() {
        let err = DiffError::InvalidHunkHeader("@@ nonsense @@".to_string());
        assert_eq!(err.to_string(), "Invalid hunk header: @@ nonsense @@");
        assert_eq!(DiffError::Empty.to_string(), "Diff contains no hunks");
    }

    #[test]
    fn test_extract_error_tags() {
        let unreadable = ExtractError::FileNotReadable {
            path: "src/a.js".to_string(),
            reason: "No such file".to_string(),
        };
        assert_eq!(unreadable.tag(), "file_not_readable");
        assert_eq!(
            ExtractError::Parse("unexpected token".to_string()).tag(),
            "parse_error: unexpected token"
        );
        assert_eq!(
            ExtractError::Traverse("bad span".to_string()).tag(),
            "traverse_error: bad span"
        );
        assert_eq!(
            ExtractError::UnsupportedFileType("png".to_string()).tag(),
            "unsupported_file_type"
        );
        assert_eq!(
            ExtractError::Unexpected("boom".to_string()).tag(),
            "unexpected_error: boom"
        );
    }

    #[test]
    fn test_timeout_tag() {
        let err = ExtractError::Timeout {
            stage: "parse".to_string(),
            timeout_ms: 250,
        };
        assert_eq!(err.tag(), "timeout: parse exceeded 250ms");
        assert!(!err.is_warning());
    }

    #[test]
    fn test_descriptor_error_is_parse_error() {
        let err: ExtractError = DescriptorError::Unclosed {
            tag: "script".to_string(),
            line: 3,
        }
        .into();
        assert_eq!(
            err.tag(),
            "parse_error: component descriptor: <script> opened on line 3 is never closed"
        );
    }

    #[test]
    fn test_warning_classification() {
        assert!(ExtractError::DepthExceeded { max_depth: 10 }.is_warning());
        assert!(ExtractError::SyntaxRecovered(2).is_warning());
        assert!(!ExtractError::Parse("x".to_string()).is_warning());
        assert!(!ExtractError::UnsupportedFileType("png".to_string()).is_warning());
    }
}
