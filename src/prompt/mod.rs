//! Prompt acquisition
//!
//! Gets one prompt per request cycle from the console, an entry dialog, or
//! a spoken utterance, and applies the empty-prompt confirmation.

mod voice;

pub use voice::{VoiceInput, VoicePrompt};

use crate::error::LinwispError;
use crate::ui::{Ui, EMPTY_PROMPT_QUESTION};

/// How the prompt is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// A line typed on the console
    TypedCli,
    /// An entry dialog
    TypedDialog,
    /// A recorded utterance, transcribed locally
    Spoken,
}

/// Result of asking for a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// A prompt to send, possibly empty if the user confirmed that
    Text(String),
    /// The user refused to send an empty prompt
    Declined,
    /// The user closed the console input
    Interrupted,
}

/// Collects prompts through the available surfaces
pub struct PromptAcquirer<'a> {
    console: &'a dyn Ui,
    dialog: &'a dyn Ui,
    voice: &'a mut dyn VoiceInput,
}

impl<'a> PromptAcquirer<'a> {
    pub fn new(console: &'a dyn Ui, dialog: &'a dyn Ui, voice: &'a mut dyn VoiceInput) -> Self {
        Self {
            console,
            dialog,
            voice,
        }
    }

    /// Ask for a prompt
    ///
    /// `via_dialog` selects the surface for the empty-prompt question in
    /// spoken mode; typed modes always use their own surface. Spoken mode
    /// reports its progress on the console.
    pub fn acquire(&mut self, mode: PromptMode, via_dialog: bool) -> Result<Acquired, LinwispError> {
        let ui = match mode {
            PromptMode::TypedCli => self.console,
            PromptMode::TypedDialog => self.dialog,
            PromptMode::Spoken if via_dialog => self.dialog,
            PromptMode::Spoken => self.console,
        };

        let prompt = match mode {
            PromptMode::TypedCli | PromptMode::TypedDialog => match ui.ask_prompt()? {
                Some(text) => text,
                None => return Ok(Acquired::Interrupted),
            },
            PromptMode::Spoken => {
                self.voice.prepare()?;
                self.console.show_status("Listening...")?;
                let text = self.voice.listen()?.trim().to_string();
                self.console
                    .show_status(&format!("Recorded prompt: {}", text))?;
                text
            }
        };

        let prompt = prompt.trim().to_string();
        tracing::debug!("Acquired prompt ({} chars) via {:?}", prompt.len(), mode);

        if prompt.is_empty() {
            match ui.confirm(EMPTY_PROMPT_QUESTION)? {
                Some(true) => {}
                Some(false) => return Ok(Acquired::Declined),
                None => return Ok(Acquired::Interrupted),
            }
        }

        Ok(Acquired::Text(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AudioError, PresentError};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct ScriptedUi {
        prompts: Mutex<VecDeque<Option<String>>>,
        answers: Mutex<VecDeque<Option<bool>>>,
        shown: Mutex<Vec<String>>,
    }

    impl ScriptedUi {
        fn with(prompts: Vec<Option<&str>>, answers: Vec<Option<bool>>) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(prompts.into_iter().map(|p| p.map(String::from)).collect()),
                answers: Mutex::new(answers.into_iter().collect()),
                shown: Mutex::default(),
            })
        }
    }

    impl Ui for ScriptedUi {
        fn ask_prompt(&self) -> Result<Option<String>, PresentError> {
            Ok(self.prompts.lock().unwrap().pop_front().flatten())
        }

        fn confirm(&self, question: &str) -> Result<Option<bool>, PresentError> {
            self.shown.lock().unwrap().push(question.to_string());
            Ok(self.answers.lock().unwrap().pop_front().flatten())
        }

        fn show_text(&self, _text: &str) -> Result<(), PresentError> {
            Ok(())
        }

        fn show_error(&self, _message: &str) -> Result<(), PresentError> {
            Ok(())
        }

        fn show_status(&self, message: &str) -> Result<(), PresentError> {
            self.shown.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct FakeVoice(Option<&'static str>);

    impl VoiceInput for FakeVoice {
        fn listen(&mut self) -> Result<String, LinwispError> {
            match self.0 {
                Some(text) => Ok(text.to_string()),
                None => Err(AudioError::EmptyRecording.into()),
            }
        }
    }

    fn acquire(
        console: &Arc<ScriptedUi>,
        dialog: &Arc<ScriptedUi>,
        voice: Option<&'static str>,
        mode: PromptMode,
        via_dialog: bool,
    ) -> Result<Acquired, LinwispError> {
        let mut voice = FakeVoice(voice);
        PromptAcquirer::new(&**console, &**dialog, &mut voice).acquire(mode, via_dialog)
    }

    #[test]
    fn test_typed_cli_prompt() {
        let console = ScriptedUi::with(vec![Some("  hello ")], vec![]);
        let dialog = ScriptedUi::with(vec![], vec![]);
        assert_eq!(
            acquire(&console, &dialog, None, PromptMode::TypedCli, false).unwrap(),
            Acquired::Text("hello".to_string())
        );
    }

    #[test]
    fn test_typed_cli_eof_interrupts() {
        let console = ScriptedUi::with(vec![None], vec![]);
        let dialog = ScriptedUi::with(vec![], vec![]);
        assert_eq!(
            acquire(&console, &dialog, None, PromptMode::TypedCli, false).unwrap(),
            Acquired::Interrupted
        );
    }

    #[test]
    fn test_empty_prompt_declined() {
        let console = ScriptedUi::with(vec![Some("")], vec![Some(false)]);
        let dialog = ScriptedUi::with(vec![], vec![]);
        assert_eq!(
            acquire(&console, &dialog, None, PromptMode::TypedCli, false).unwrap(),
            Acquired::Declined
        );
        assert_eq!(console.shown.lock().unwrap()[0], EMPTY_PROMPT_QUESTION);
    }

    #[test]
    fn test_empty_prompt_confirmed() {
        let console = ScriptedUi::with(vec![], vec![]);
        let dialog = ScriptedUi::with(vec![Some("   ")], vec![Some(true)]);
        assert_eq!(
            acquire(&console, &dialog, None, PromptMode::TypedDialog, false).unwrap(),
            Acquired::Text(String::new())
        );
        // The dialog asked, not the console
        assert!(console.shown.lock().unwrap().is_empty());
    }

    #[test]
    fn test_spoken_prompt_is_echoed() {
        let console = ScriptedUi::with(vec![], vec![]);
        let dialog = ScriptedUi::with(vec![], vec![]);
        assert_eq!(
            acquire(&console, &dialog, Some(" what time is it "), PromptMode::Spoken, false).unwrap(),
            Acquired::Text("what time is it".to_string())
        );
        let shown = console.shown.lock().unwrap();
        assert_eq!(shown[0], "Listening...");
        assert_eq!(shown[1], "Recorded prompt: what time is it");
    }

    #[test]
    fn test_spoken_empty_asks_dialog_in_tray() {
        let console = ScriptedUi::with(vec![], vec![]);
        let dialog = ScriptedUi::with(vec![], vec![Some(false)]);
        assert_eq!(
            acquire(&console, &dialog, Some(""), PromptMode::Spoken, true).unwrap(),
            Acquired::Declined
        );
        assert_eq!(dialog.shown.lock().unwrap().as_slice(), [EMPTY_PROMPT_QUESTION]);
        // Progress still goes to the console
        assert_eq!(
            console.shown.lock().unwrap().as_slice(),
            ["Listening...", "Recorded prompt: "]
        );
    }

    #[test]
    fn test_voice_failure_propagates() {
        let console = ScriptedUi::with(vec![], vec![]);
        let dialog = ScriptedUi::with(vec![], vec![]);
        let err = acquire(&console, &dialog, None, PromptMode::Spoken, false).unwrap_err();
        assert!(matches!(err, LinwispError::Audio(AudioError::EmptyRecording)));
    }
}
