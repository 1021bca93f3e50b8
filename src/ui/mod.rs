//! User interaction surfaces
//!
//! Both front-ends talk to the user through the same [`Ui`] trait:
//! - [`ConsoleUi`]: stdin/stdout prompts
//! - [`Zenity`]: modal GTK dialogs via the `zenity` binary

mod console;
mod zenity;

pub use console::ConsoleUi;
pub use zenity::Zenity;

use crate::error::PresentError;

/// Text shown when asking for a prompt
pub const PROMPT_TEXT: &str = "Enter your prompt:";

/// Question asked before sending an empty prompt
pub const EMPTY_PROMPT_QUESTION: &str = "Empty prompt. Are you sure?";

/// Trait for interactive surfaces
///
/// `None` from the asking methods means the user interrupted the
/// interaction (end of input on a console).
pub trait Ui: Send + Sync {
    /// Ask for a prompt, trimmed. A cancelled dialog yields an empty string.
    fn ask_prompt(&self) -> Result<Option<String>, PresentError>;

    /// Ask a yes/no question
    fn confirm(&self, question: &str) -> Result<Option<bool>, PresentError>;

    /// Show an answer
    fn show_text(&self, text: &str) -> Result<(), PresentError>;

    /// Report an error
    fn show_error(&self, message: &str) -> Result<(), PresentError>;

    /// Show a one-line status message, such as the recording notice
    fn show_status(&self, _message: &str) -> Result<(), PresentError> {
        Ok(())
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
