//! Depth guard, timeout wrapper, and tolerant file reader shared by the
//! extractors.
//!
//! The timeout only bounds how long the caller waits. Work handed to
//! [`run_blocking`] runs on tokio's blocking pool and cannot be interrupted:
//! when the deadline fires the caller gets `ExtractError::Timeout` while the
//! parse keeps running until it returns on its own.

use crate::error::ExtractError;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Counts traversal nesting and fails once `max_depth` would be exceeded
#[derive(Debug)]
pub struct DepthGuard {
    depth: usize,
    max_depth: usize,
}

impl DepthGuard {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Enter one level deeper
    pub fn enter(&mut self) -> Result<(), ExtractError> {
        if self.depth >= self.max_depth {
            return Err(ExtractError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Race a future against a deadline
pub async fn with_timeout<F>(limit: Duration, stage: &str, work: F) -> Result<F::Output, ExtractError>
where
    F: Future,
{
    tokio::time::timeout(limit, work)
        .await
        .map_err(|_| ExtractError::Timeout {
            stage: stage.to_string(),
            timeout_ms: limit.as_millis() as u64,
        })
}

/// Run synchronous CPU work on the blocking pool under a deadline
pub async fn run_blocking<T, F>(limit: Duration, stage: &str, work: F) -> Result<T, ExtractError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);

    match with_timeout(limit, stage, handle).await? {
        Ok(value) => Ok(value),
        Err(e) => Err(ExtractError::Unexpected(format!("{} task failed: {}", stage, e))),
    }
}

/// Outcome of reading a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceText {
    Readable(String),
    Unreadable { reason: String },
}

/// Read a file's full text. Invalid UTF-8 is replaced rather than rejected;
/// any I/O failure becomes `SourceText::Unreadable`.
pub async fn read_source(path: &Path) -> SourceText {
    match tokio::fs::read(path).await {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => SourceText::Readable(text),
            Err(e) => {
                tracing::debug!("{} is not valid UTF-8, decoding lossily", path.display());
                SourceText::Readable(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            SourceText::Unreadable {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_depth_guard_limits() {
        let mut guard = DepthGuard::new(2);
        assert!(guard.enter().is_ok());
        assert!(guard.enter().is_ok());
        assert_eq!(
            guard.enter().unwrap_err(),
            ExtractError::DepthExceeded { max_depth: 2 }
        );

        guard.exit();
        assert_eq!(guard.depth(), 1);
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_depth_guard_exit_saturates() {
        let mut guard = DepthGuard::new(1);
        guard.exit();
        assert_eq!(guard.depth(), 0);
    }

    #[tokio::test]
    async fn test_with_timeout_completes() {
        let value = with_timeout(Duration::from_millis(500), "quick", async { 7 })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_with_timeout_fires() {
        let result = with_timeout(
            Duration::from_millis(10),
            "parse",
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            ExtractError::Timeout {
                stage: "parse".to_string(),
                timeout_ms: 10,
            }
        );
    }

    #[tokio::test]
    async fn test_run_blocking_times_out_without_interrupting() {
        let result = run_blocking(Duration::from_millis(10), "parse", || {
            std::thread::sleep(Duration::from_millis(200));
            1
        })
        .await;

        assert!(matches!(result, Err(ExtractError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_run_blocking_panic_is_unexpected() {
        let result: Result<(), _> = run_blocking(Duration::from_secs(5), "parse", || {
            panic!("grammar exploded");
        })
        .await;

        match result {
            Err(ExtractError::Unexpected(msg)) => assert!(msg.starts_with("parse task failed")),
            other => panic!("expected unexpected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_source_missing_file() {
        let dir = TempDir::new().unwrap();
        let outcome = read_source(&dir.path().join("missing.js")).await;
        assert!(matches!(outcome, SourceText::Unreadable { .. }));
    }

    #[tokio::test]
    async fn test_read_source_lossy_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.js");
        std::fs::write(&path, b"const s = '\xe9';\n").unwrap();

        match read_source(&path).await {
            SourceText::Readable(text) => assert!(text.starts_with("const s = '")),
            other => panic!("expected readable text, got {:?}", other),
        }
    }
}
