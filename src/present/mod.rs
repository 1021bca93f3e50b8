//! Answer presentation
//!
//! Routes the answer to a speech synthesizer and then to either the
//! console or a text dialog.

mod speech;

pub use speech::{Espeak, Speaker};

use crate::error::PresentError;
use crate::ui::Ui;

/// Where an answer goes
pub struct Presenter<'a> {
    console: &'a dyn Ui,
    dialog: &'a dyn Ui,
    speaker: Box<dyn Speaker>,
}

impl<'a> Presenter<'a> {
    pub fn new(console: &'a dyn Ui, dialog: &'a dyn Ui, speaker: Box<dyn Speaker>) -> Self {
        Self {
            console,
            dialog,
            speaker,
        }
    }

    /// Present `text`, speaking it first when asked
    pub fn present(&self, text: &str, via_speech: bool, via_dialog: bool) -> Result<(), PresentError> {
        if via_speech {
            tracing::debug!("Speaking answer via {}", self.speaker.name());
            self.speaker.speak(text)?;
        }

        let surface = if via_dialog { self.dialog } else { self.console };
        tracing::debug!("Showing answer via {}", surface.name());
        surface.show_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Ui for Recorder {
        fn ask_prompt(&self) -> Result<Option<String>, PresentError> {
            Ok(None)
        }

        fn confirm(&self, _question: &str) -> Result<Option<bool>, PresentError> {
            Ok(None)
        }

        fn show_text(&self, text: &str) -> Result<(), PresentError> {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, text));
            Ok(())
        }

        fn show_error(&self, _message: &str) -> Result<(), PresentError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    struct FakeSpeaker {
        log: Log,
        fail: bool,
    }

    impl Speaker for FakeSpeaker {
        fn speak(&self, text: &str) -> Result<(), PresentError> {
            if self.fail {
                return Err(PresentError::CommandNotFound("espeak".to_string()));
            }
            self.log.lock().unwrap().push(format!("speech:{}", text));
            Ok(())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    /// Present `text` and return what each surface saw
    fn present(
        text: &str,
        via_speech: bool,
        via_dialog: bool,
        fail_speech: bool,
    ) -> (Result<(), PresentError>, Vec<String>) {
        let log = Log::default();
        let console = Recorder {
            name: "console",
            log: log.clone(),
        };
        let dialog = Recorder {
            name: "dialog",
            log: log.clone(),
        };
        let speaker = Box::new(FakeSpeaker {
            log: log.clone(),
            fail: fail_speech,
        });
        let result = Presenter::new(&console, &dialog, speaker).present(text, via_speech, via_dialog);
        let seen = log.lock().unwrap().clone();
        (result, seen)
    }

    #[test]
    fn test_console_only() {
        let (result, seen) = present("hi", false, false, false);
        result.unwrap();
        assert_eq!(seen, vec!["console:hi"]);
    }

    #[test]
    fn test_speech_comes_before_dialog() {
        let (result, seen) = present("hi", true, true, false);
        result.unwrap();
        assert_eq!(seen, vec!["speech:hi", "dialog:hi"]);
    }

    #[test]
    fn test_speech_failure_propagates() {
        let (result, seen) = present("hi", true, false, true);
        assert!(matches!(result, Err(PresentError::CommandNotFound(_))));
        assert!(seen.is_empty());
    }
}
