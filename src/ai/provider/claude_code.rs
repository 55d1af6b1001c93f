//! Claude Code CLI Provider
//!
//! Text provider that shells out to a locally installed `claude` CLI in
//! print mode and returns the `result` field of its JSON envelope.
//!
//! Note: This provider performs single-shot execution only. The child process
//! is killed when the call future is dropped (timeout or cancellation).

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::{GenerationOptions, ProviderConfig, TextProvider};
use crate::types::{ErrorClassifier, ProviderError, ProviderResult};

const DEFAULT_MODEL: &str = "sonnet";
const PROVIDER_NAME: &str = "claude-code";

/// Claude Code CLI Provider
pub struct ClaudeCodeProvider {
    model: String,
    binary: String,
}

impl ClaudeCodeProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            // `api_base` doubles as an override for the CLI binary path
            binary: config
                .api_base
                .clone()
                .unwrap_or_else(|| "claude".to_string()),
        }
    }

    fn command(&self, prompt: &str, options: &GenerationOptions) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json")
            .arg("--model")
            .arg(&self.model)
            .env("CLAUDE_CODE_TEMPERATURE", options.temperature.to_string())
            .env("CLAUDE_CODE_MAX_OUTPUT_TOKENS", options.max_tokens.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Pull the answer text out of the CLI's JSON envelope
fn extract_result(stdout: &str) -> ProviderResult<String> {
    let response: Value = serde_json::from_str(stdout).map_err(|e| {
        ProviderError::invalid_response(format!("Failed to decode Claude Code output: {}", e))
    })?;

    let result = response.get("result").and_then(Value::as_str);

    if response
        .get("is_error")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        let message = result.unwrap_or("Unknown API error");
        return Err(ErrorClassifier::classify(
            &format!("Claude Code API error: {}", message),
            PROVIDER_NAME,
        ));
    }

    result
        .map(str::to_string)
        .ok_or_else(|| ProviderError::invalid_response("No result text in Claude Code response"))
}

#[async_trait]
impl TextProvider for ClaudeCodeProvider {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> ProviderResult<String> {
        debug!(
            model = %self.model,
            temperature = options.temperature,
            "Executing Claude Code CLI"
        );

        let child = self.command(prompt, options).spawn().map_err(|e| {
            ProviderError::unavailable(format!(
                "Failed to spawn Claude Code CLI: {}. Is it installed?",
                e
            ))
        })?;

        let output = child.wait_with_output().await.map_err(|e| {
            ProviderError::unavailable(format!("Claude Code execution failed: {}", e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            // The envelope may still carry a classified API error
            if let Err(err) = extract_result(&stdout)
                && err.kind != crate::types::ProviderErrorKind::InvalidResponse
            {
                return Err(err);
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                "Process exited with non-zero status"
            } else {
                stderr.trim()
            };
            return Err(ErrorClassifier::classify(
                &format!("Claude Code failed: {}", message),
                PROVIDER_NAME,
            ));
        }

        extract_result(&stdout)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> bool {
        match Command::new(&self.binary)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                debug!(
                    "Claude Code CLI available: {}",
                    String::from_utf8_lossy(&output.stdout).trim()
                );
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderErrorKind;

    #[test]
    fn test_extract_result_text() {
        let text = extract_result(r##"{"type":"result","is_error":false,"result":"# Executive Summary\nBakery"}"##)
            .unwrap();
        assert!(text.starts_with("# Executive Summary"));
    }

    #[test]
    fn test_extract_result_rate_limited_error() {
        let err = extract_result(r#"{"is_error":true,"result":"Rate limit exceeded, retry after 30 seconds"}"#)
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(std::time::Duration::from_secs(30)));
    }

    #[test]
    fn test_extract_result_missing_field() {
        let err = extract_result(r#"{"is_error":false}"#).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidResponse);
    }

    #[test]
    fn test_extract_result_not_json() {
        let err = extract_result("plain text").unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let config = ProviderConfig {
            api_base: Some("/nonexistent/claude-binary".to_string()),
            ..ProviderConfig::new("claude-code")
        };
        let provider = ClaudeCodeProvider::new(&config);
        let err = provider
            .generate("hello", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Unavailable);
        assert!(!provider.health_check().await);
    }
}
