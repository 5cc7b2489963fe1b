//! External file processor
//!
//! Located data files are handed to a separate program together with the
//! directory its output belongs in. The program's output is not read; only
//! whether it ran and exited successfully is reported back.

use crate::config::ProcessorConfig;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

/// Errors reported by a file processor
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("'{program}' exited with status {code:?}")]
    ExitStatus { program: String, code: Option<i32> },
}

/// Anything that can process one located file into an output directory
#[async_trait]
pub trait FileProcessor: Send + Sync {
    /// Processes the file at `locator`, writing results under `output_dir`
    async fn process(&self, locator: &str, output_dir: &Path) -> Result<(), ProcessorError>;
}

/// Runs an external program as `<program> <args...> <locator> <output_dir>`
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    program: String,
    args: Vec<String>,
}

impl CommandProcessor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

#[async_trait]
impl FileProcessor for CommandProcessor {
    async fn process(&self, locator: &str, output_dir: &Path) -> Result<(), ProcessorError> {
        tracing::info!(
            "Running {} on {} -> {}",
            self.program,
            locator,
            output_dir.display()
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(locator)
            .arg(output_dir)
            // An abandoned run (deadline) must not leave the program writing output
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| ProcessorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ProcessorError::ExitStatus {
                program: self.program.clone(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_successful_program() {
        let tmp = TempDir::new().unwrap();
        let processor = CommandProcessor::new("true", vec![]);
        assert!(processor.process("http://example.org/a.csv", tmp.path()).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_program() {
        let tmp = TempDir::new().unwrap();
        let processor = CommandProcessor::new("false", vec![]);
        let result = processor.process("http://example.org/a.csv", tmp.path()).await;
        assert!(matches!(
            result,
            Err(ProcessorError::ExitStatus { code: Some(1), .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let tmp = TempDir::new().unwrap();
        let processor = CommandProcessor::new("no-such-program-state-watch", vec![]);
        let result = processor.process("http://example.org/a.csv", tmp.path()).await;
        assert!(matches!(result, Err(ProcessorError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_arguments_follow_configured_args() {
        let tmp = TempDir::new().unwrap();
        let script = r#"test "$0" = "http://example.org/tx-sl.csv" && test -d "$1""#;
        let processor = CommandProcessor::new("sh", vec!["-c".to_string(), script.to_string()]);

        let result = processor
            .process("http://example.org/tx-sl.csv", tmp.path())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_processing_kills_program() {
        let tmp = TempDir::new().unwrap();
        let script = r#"sleep 2; touch "$1/done""#;
        let processor = CommandProcessor::new("sh", vec!["-c".to_string(), script.to_string()]);

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(300),
            processor.process("http://example.org/tx-sl.csv", tmp.path()),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert!(!tmp.path().join("done").exists());
    }
}
