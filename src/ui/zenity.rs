//! Modal dialogs via zenity
//!
//! Each call spawns `zenity` and blocks until the user closes the dialog.
//!
//! Requires: zenity package installed

use super::{Ui, PROMPT_TEXT};
use crate::error::PresentError;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const TITLE: &str = "LinWisp";

/// zenity exits with 1 when the user presses Cancel or closes the window
const EXIT_CANCELLED: i32 = 1;

/// Dialog surface backed by the `zenity` binary
#[derive(Debug, Clone)]
pub struct Zenity {
    program: String,
}

impl Default for Zenity {
    fn default() -> Self {
        Self::new()
    }
}

impl Zenity {
    pub fn new() -> Self {
        Self::with_program("zenity")
    }

    /// Use a different zenity-compatible binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn locate(&self) -> Result<PathBuf, PresentError> {
        which::which(&self.program).map_err(|_| PresentError::CommandNotFound(self.program.clone()))
    }

    /// Run zenity with `args`, optionally feeding `stdin`
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<Output, PresentError> {
        let program = self.locate()?;
        tracing::debug!("Running {} {:?}", self.program, args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failed(e.to_string()))?;

        if let (Some(text), Some(mut pipe)) = (stdin, child.stdin.take()) {
            // A closed dialog stops reading, so a broken pipe is not an error
            if let Err(e) = pipe.write_all(text.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(self.failed(e.to_string()));
                }
            }
        }

        child
            .wait_with_output()
            .map_err(|e| self.failed(e.to_string()))
    }

    fn failed(&self, message: String) -> PresentError {
        PresentError::CommandFailed {
            command: self.program.clone(),
            message,
        }
    }

    /// Turn an unexpected exit status into an error
    fn check(&self, output: &Output, allow_cancel: bool) -> Result<bool, PresentError> {
        match output.status.code() {
            Some(0) => Ok(true),
            Some(EXIT_CANCELLED) if allow_cancel => Ok(false),
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(self.failed(format!(
                    "exited with {}: {}",
                    code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                    stderr.trim()
                )))
            }
        }
    }
}

fn arg(flag: &str, value: &str) -> String {
    format!("--{}={}", flag, value)
}

/// Escape text for zenity's Pango markup in `--text`
fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl Ui for Zenity {
    fn ask_prompt(&self) -> Result<Option<String>, PresentError> {
        let args = vec![
            "--entry".to_string(),
            arg("title", TITLE),
            arg("text", PROMPT_TEXT),
        ];
        let output = self.run(&args, None)?;
        if !self.check(&output, true)? {
            tracing::debug!("Prompt dialog cancelled");
            return Ok(Some(String::new()));
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(text))
    }

    fn confirm(&self, question: &str) -> Result<Option<bool>, PresentError> {
        let args = vec![
            "--question".to_string(),
            arg("title", TITLE),
            arg("text", &escape_markup(question)),
        ];
        let output = self.run(&args, None)?;
        Ok(Some(self.check(&output, true)?))
    }

    fn show_text(&self, text: &str) -> Result<(), PresentError> {
        let args = vec![
            "--text-info".to_string(),
            arg("title", TITLE),
            arg("width", "600"),
            arg("height", "400"),
            "--no-wrap".to_string(),
        ];
        let output = self.run(&args, Some(text))?;
        self.check(&output, true)?;
        Ok(())
    }

    fn show_error(&self, message: &str) -> Result<(), PresentError> {
        let args = vec![
            "--error".to_string(),
            arg("title", TITLE),
            arg("text", &escape_markup(message)),
        ];
        let output = self.run(&args, None)?;
        self.check(&output, true)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "zenity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn test_arg_format() {
        assert_eq!(arg("width", "600"), "--width=600");
    }

    #[test]
    fn test_missing_binary() {
        let dialog = Zenity::with_program("linwisp-no-such-dialog-binary");
        let err = dialog.ask_prompt().unwrap_err();
        assert!(matches!(err, PresentError::CommandNotFound(ref name) if name == "linwisp-no-such-dialog-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_yields_empty_prompt() {
        // `false` exits with 1, like a cancelled dialog
        let dialog = Zenity::with_program("false");
        assert_eq!(dialog.ask_prompt().unwrap(), Some(String::new()));
        assert_eq!(dialog.confirm("Sure?").unwrap(), Some(false));
    }

    #[cfg(unix)]
    #[test]
    fn test_success_exit() {
        let dialog = Zenity::with_program("true");
        assert_eq!(dialog.confirm("Sure?").unwrap(), Some(true));
        assert_eq!(dialog.ask_prompt().unwrap(), Some(String::new()));
        dialog.show_text("shown").unwrap();
    }
}
