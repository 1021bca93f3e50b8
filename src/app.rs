//! Request cycle shared by the command line and the tray
//!
//! One cycle is: acquire a prompt, ask the completion endpoint, present the
//! answer. Everything blocks; a second cycle cannot start before the first
//! one has finished.

use crate::cli::Cli;
use crate::client::{CompletionClient, Transport, UreqTransport};
use crate::config::{AppPaths, Config, ConfigStore, RequestConfig, SpeechConfig, VoiceConfig};
use crate::error::{LinwispError, Result};
use crate::present::{Espeak, Presenter, Speaker};
use crate::prompt::{Acquired, PromptAcquirer, PromptMode, VoiceInput, VoicePrompt};
use crate::secret::{self, SecretStore};
use crate::ui::{ConsoleUi, Ui, Zenity};

/// Printed when `--apikey` repeats the stored key
pub const APIKEY_HINT: &str =
    "Hint: You don't need to define --apikey every single time you run LinWisp.";

/// Printed when the console user interrupts
pub const GOODBYE: &str = "\nExiting LinWisp. Goodbye!";

/// Builds the HTTP layer from the `[request]` section
pub type TransportFactory = Box<dyn Fn(&RequestConfig) -> Box<dyn Transport>>;

/// Builds the speech synthesizer from the `[speech]` section
pub type SpeakerFactory = Box<dyn Fn(&SpeechConfig) -> Box<dyn Speaker>>;

/// Command-line choices that drive a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Model to set and remember
    pub model: Option<String>,
    /// Flip the persisted `gui` flag
    pub toggle_gui: bool,
    /// API key to store and use
    pub api_key: Option<String>,
    pub tray: bool,
    pub record: bool,
}

impl From<&Cli> for Options {
    fn from(cli: &Cli) -> Self {
        Self {
            model: cli.model.clone(),
            toggle_gui: cli.gui,
            api_key: cli.apikey.clone(),
            tray: cli.tray,
            record: cli.record,
        }
    }
}

impl Options {
    /// Whether Ctrl-C should end the run with the console goodbye
    ///
    /// The tray keeps the default signal disposition.
    pub fn console_interrupts(&self) -> bool {
        !self.tray
    }
}

/// API key and model for one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub model: String,
}

impl Credentials {
    /// Combine overrides with stored values, rejecting empty ones
    pub fn resolve(
        key_override: Option<&str>,
        stored_key: &str,
        model_override: Option<&str>,
        config_model: &str,
    ) -> Result<Self> {
        let api_key = non_empty(key_override).unwrap_or(stored_key).trim();
        if api_key.is_empty() {
            return Err(LinwispError::MissingCredential);
        }

        let model = non_empty(model_override).unwrap_or(config_model).trim();
        if model.is_empty() {
            return Err(LinwispError::MissingModel);
        }

        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// How one cycle talks to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRequest {
    pub mode: PromptMode,
    /// Speak the answer before showing it
    pub speak_reply: bool,
    /// Use dialogs for questions and the answer
    pub dialog: bool,
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The answer was shown
    Presented(String),
    /// The user refused to send an empty prompt
    Declined,
    /// The user closed the console input
    Interrupted,
}

/// Exit status of a front-end run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
        }
    }
}

/// Everything a front-end needs from the outside world
pub struct Services {
    pub store: ConfigStore,
    pub secrets: Box<dyn SecretStore>,
    pub console: Box<dyn Ui>,
    pub dialog: Box<dyn Ui>,
    pub voice: Box<dyn VoiceInput>,
    pub transport: TransportFactory,
    pub speaker: SpeakerFactory,
    pub paths: AppPaths,
}

impl Services {
    /// Real collaborators: config file, keyring, terminal, zenity, espeak,
    /// microphone and HTTP
    pub fn system(paths: AppPaths) -> Self {
        Self {
            store: ConfigStore::new(&paths),
            secrets: secret::open(&paths),
            console: Box::new(ConsoleUi::stdio()),
            dialog: Box::new(Zenity::new()),
            voice: Box::new(VoicePrompt::new(
                VoiceConfig::default(),
                paths.models_dir.clone(),
            )),
            transport: Box::new(|config| Box::new(UreqTransport::new(config))),
            speaker: Box::new(|config| Box::new(Espeak::new(config))),
            paths,
        }
    }

    /// Run one request cycle with settings from `config`
    pub fn run_cycle(
        &mut self,
        config: &Config,
        credentials: &Credentials,
        request: CycleRequest,
    ) -> Result<CycleOutcome> {
        self.voice.reconfigure(&config.voice);

        let prompt = {
            let mut prompts =
                PromptAcquirer::new(self.console.as_ref(), self.dialog.as_ref(), self.voice.as_mut());
            match prompts.acquire(request.mode, request.dialog)? {
                Acquired::Text(prompt) => prompt,
                Acquired::Declined => {
                    tracing::debug!("Empty prompt declined, nothing sent");
                    return Ok(CycleOutcome::Declined);
                }
                Acquired::Interrupted => return Ok(CycleOutcome::Interrupted),
            }
        };

        let client = CompletionClient::new((self.transport)(&config.request), &config.request);
        let answer = client.ask(&prompt, &credentials.api_key, &credentials.model)?;

        let presenter = Presenter::new(
            self.console.as_ref(),
            self.dialog.as_ref(),
            (self.speaker)(&config.speech),
        );
        presenter.present(&answer, request.speak_reply, request.dialog)?;

        Ok(CycleOutcome::Presented(answer))
    }

    /// Report an error on the console, and in a dialog when asked
    pub fn report(&self, message: &str, via_dialog: bool) {
        if let Err(e) = self.console.show_error(message) {
            tracing::warn!("Could not print error: {}", e);
        }
        if via_dialog {
            if let Err(e) = self.dialog.show_error(message) {
                tracing::warn!("Could not show error dialog: {}", e);
            }
        }
    }

    /// Print an informational line on the console
    fn notice(&self, message: &str) -> Result<()> {
        self.console.show_status(message)?;
        Ok(())
    }

    /// Stored key, or the empty string
    pub fn stored_key(&self) -> Result<String> {
        Ok(self.secrets.load_key()?)
    }
}

/// Store `--apikey` and apply `--model` / `--gui` to the config file
///
/// Returns the config as persisted.
pub fn apply_overrides(options: &Options, services: &Services) -> Result<Config> {
    if let Some(key) = non_empty(options.api_key.as_deref()) {
        let already_stored = services.stored_key()? == key.trim();
        services.secrets.save_key(key)?;
        tracing::info!("API key saved to {}", services.secrets.name());
        if already_stored {
            services.notice(APIKEY_HINT)?;
        }
    }

    let mut config = services.store.load()?;
    let mut updated = false;

    if let Some(model) = non_empty(options.model.as_deref()) {
        config.model = model.trim().to_string();
        services.notice(&format!("Model set to {}.", config.model))?;
        updated = true;
    }

    if options.toggle_gui {
        config.gui = !config.gui;
        tracing::info!("Dialog mode {}", if config.gui { "enabled" } else { "disabled" });
        updated = true;
    }

    if updated {
        services.store.save(&config)?;
    }

    Ok(config)
}

/// Run the command-line front-end, or the tray with `--tray`
pub fn run_cli(options: &Options, services: &mut Services) -> RunStatus {
    let mut gui = false;
    match cli_cycle(options, services, &mut gui) {
        Ok(status) => status,
        Err(e @ (LinwispError::MissingCredential | LinwispError::MissingModel)) => {
            services.report(&e.to_string(), gui);
            RunStatus::Failure
        }
        Err(e) => {
            tracing::debug!("Request cycle failed: {:?}", e);
            services.report(&format!("An error occurred: {}", e), gui);
            RunStatus::Failure
        }
    }
}

fn cli_cycle(options: &Options, services: &mut Services, gui: &mut bool) -> Result<RunStatus> {
    // Errors before the config is read are shown in a dialog only if
    // dialog mode is being switched on
    *gui = options.toggle_gui;
    let config = apply_overrides(options, services)?;
    *gui = config.gui;

    if options.tray {
        return Ok(match crate::tray::run(options, services) {
            Ok(status) => status,
            Err(e) => {
                services.report(&format!("Failed to launch tray: {:#}", e), false);
                RunStatus::Failure
            }
        });
    }

    let credentials = Credentials::resolve(
        options.api_key.as_deref(),
        &services.stored_key()?,
        options.model.as_deref(),
        &config.model,
    )?;

    let request = CycleRequest {
        mode: if options.record {
            PromptMode::Spoken
        } else if config.gui {
            PromptMode::TypedDialog
        } else {
            PromptMode::TypedCli
        },
        speak_reply: options.record,
        dialog: config.gui,
    };

    match services.run_cycle(&config, &credentials, request)? {
        CycleOutcome::Interrupted => {
            services.notice(GOODBYE)?;
            Ok(RunStatus::Success)
        }
        CycleOutcome::Presented(_) | CycleOutcome::Declined => Ok(RunStatus::Success),
    }
}

/// Menu entries of the tray icon that start a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Type,
    Record,
}

/// Handle one tray menu activation
///
/// Reloads config and key every time. A failed request is reported and
/// the tray keeps running; `Failure` means the tray must exit.
pub fn tray_activation(options: &Options, services: &mut Services, action: TrayAction) -> RunStatus {
    let loaded = services.store.load().map_err(LinwispError::from).and_then(|config| {
        let credentials = Credentials::resolve(
            options.api_key.as_deref(),
            &services.stored_key()?,
            options.model.as_deref(),
            &config.model,
        )?;
        Ok((config, credentials))
    });

    let (config, credentials) = match loaded {
        Ok(loaded) => loaded,
        Err(e @ (LinwispError::MissingCredential | LinwispError::MissingModel)) => {
            services.report(&e.to_string(), true);
            return RunStatus::Failure;
        }
        Err(e) => {
            services.report(&format!("An error occurred: {}", e), true);
            return RunStatus::Success;
        }
    };

    let request = CycleRequest {
        mode: match action {
            TrayAction::Type => PromptMode::TypedDialog,
            TrayAction::Record => PromptMode::Spoken,
        },
        speak_reply: action == TrayAction::Record,
        dialog: true,
    };

    if let Err(e) = services.run_cycle(&config, &credentials, request) {
        tracing::debug!("Tray cycle failed: {:?}", e);
        services.report(&format!("An error occurred: {}", e), true);
    }
    RunStatus::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_interrupts_except_in_tray() {
        assert!(Options::default().console_interrupts());
        let record = Options {
            record: true,
            ..Default::default()
        };
        assert!(record.console_interrupts());
        let tray = Options {
            tray: true,
            ..Default::default()
        };
        assert!(!tray.console_interrupts());
    }

    #[test]
    fn test_credentials_prefer_overrides() {
        let c = Credentials::resolve(Some("new"), "old", Some("m2"), "m1").unwrap();
        assert_eq!(c.api_key, "new");
        assert_eq!(c.model, "m2");
    }

    #[test]
    fn test_credentials_fall_back_to_stored() {
        let c = Credentials::resolve(None, "stored", None, "gemini-2.0-flash").unwrap();
        assert_eq!(c.api_key, "stored");
        assert_eq!(c.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_blank_override_uses_stored() {
        let c = Credentials::resolve(Some("  "), "stored", Some(""), "m").unwrap();
        assert_eq!(c.api_key, "stored");
        assert_eq!(c.model, "m");
    }

    #[test]
    fn test_missing_key() {
        let err = Credentials::resolve(None, "", None, "m").unwrap_err();
        assert!(matches!(err, LinwispError::MissingCredential));
        assert_eq!(err.to_string(), "API key is required. Set it using --apikey.");
    }

    #[test]
    fn test_missing_model() {
        let err = Credentials::resolve(None, "k", None, " ").unwrap_err();
        assert!(matches!(err, LinwispError::MissingModel));
    }

    #[test]
    fn test_options_from_cli() {
        use clap::Parser;
        let cli = Cli::parse_from(["linwisp", "--record", "--model", "m", "--apikey", "k"]);
        let options = Options::from(&cli);
        assert!(options.record);
        assert!(!options.tray);
        assert_eq!(options.model.as_deref(), Some("m"));
        assert_eq!(options.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_tray_and_record_conflict() {
        use clap::Parser;
        assert!(Cli::try_parse_from(["linwisp", "--tray", "--record"]).is_err());
    }

    #[test]
    fn test_run_status_codes() {
        assert_eq!(RunStatus::Success.code(), 0);
        assert_eq!(RunStatus::Failure.code(), 1);
    }
}
