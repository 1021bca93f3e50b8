// Command-line interface definitions for linwisp
//
// This module is separate so it can be used by both the binary (main.rs)
// and build.rs for generating man pages.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "linwisp")]
#[command(author, version, about = "A simple AI assistant for the Linux desktop")]
#[command(long_about = "
LinWisp sends a prompt to Gemini and shows the answer.
Type the prompt in the terminal, enter it in a dialog, or speak it.

SETUP:
  1. Get an API key from Google AI Studio
  2. Run: linwisp --apikey <KEY> (stored in your keyring, asked only once)
  3. Install zenity for dialogs and espeak for spoken answers
  4. For --record, put a whisper model (e.g. ggml-base.bin) in the models dir

USAGE:
  linwisp            Type a prompt, get the answer on stdout
  linwisp --gui      Toggle dialog mode (remembered in config.toml)
  linwisp --record   Speak a prompt, hear the answer
  linwisp --tray     Run from the system tray
")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Set and remember the Gemini model (e.g. gemini-2.0-flash)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Toggle dialog mode on or off and remember the choice
    #[arg(long)]
    pub gui: bool,

    /// Store the API key for later runs
    #[arg(long, value_name = "KEY")]
    pub apikey: Option<String>,

    /// Run as a system tray icon
    #[arg(long, conflicts_with = "record")]
    pub tray: bool,

    /// Speak the prompt instead of typing it; the answer is spoken too
    #[arg(long)]
    pub record: bool,
}
