//! Console prompts on stdin/stdout

use super::{Ui, PROMPT_TEXT};
use crate::error::PresentError;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

type Reader = Box<dyn BufRead + Send>;
type Writer = Box<dyn Write + Send>;

/// Line-oriented console interaction
pub struct ConsoleUi {
    input: Mutex<Reader>,
    output: Mutex<Writer>,
    errors: Mutex<Writer>,
}

impl ConsoleUi {
    pub fn new(input: Reader, output: Writer, errors: Writer) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
            errors: Mutex::new(errors),
        }
    }

    /// Console bound to the process's standard streams
    pub fn stdio() -> Self {
        Self::new(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Print `label` without a newline and read one line
    ///
    /// Returns `None` at end of input.
    fn read_line(&self, label: &str) -> Result<Option<String>, PresentError> {
        {
            let mut out = lock(&self.output);
            write!(out, "{}", label)?;
            out.flush()?;
        }

        let mut line = String::new();
        let read = lock(&self.input).read_line(&mut line)?;
        if read == 0 {
            tracing::debug!("Console input closed");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn write_line(&self, target: &Mutex<Writer>, text: &str) -> Result<(), PresentError> {
        let mut out = lock(target);
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }
}

/// A poisoned lock only means another thread panicked mid-write
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Ui for ConsoleUi {
    fn ask_prompt(&self) -> Result<Option<String>, PresentError> {
        self.read_line(&format!("{} ", PROMPT_TEXT))
    }

    fn confirm(&self, question: &str) -> Result<Option<bool>, PresentError> {
        let answer = self.read_line(&format!("{} (y/n): ", question))?;
        Ok(answer.map(|a| a.eq_ignore_ascii_case("y")))
    }

    fn show_text(&self, text: &str) -> Result<(), PresentError> {
        self.write_line(&self.output, text)
    }

    fn show_error(&self, message: &str) -> Result<(), PresentError> {
        self.write_line(&self.errors, message)
    }

    fn show_status(&self, message: &str) -> Result<(), PresentError> {
        self.write_line(&self.output, message)
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
