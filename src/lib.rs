//! LinWisp: a simple AI assistant for the Linux desktop
//!
//! This library provides the core functionality for:
//! - Reading a prompt from the terminal, a zenity dialog, or the microphone
//! - Detecting the end of speech with an energy-based frame classifier
//! - Transcribing speech using whisper.cpp (fast, local, offline)
//! - Sending the prompt to Gemini's `generateContent` endpoint
//! - Cleaning the answer and printing, speaking or showing it
//!
//! # Architecture
//!
//! ```text
//!          ┌──────────────┐                         ┌──────────────┐
//!          │     CLI      │                         │     Tray     │
//!          │    (clap)    │                         │ (tray-icon)  │
//!          └──────────────┘                         └──────────────┘
//!                   │                                        │
//!                   └───────────────────┬────────────────────┘
//!                                       ▼
//!          ┌───────────────────────────────────────────────────────────┐
//!          │                       Request Cycle                       │
//!          │  Config ──▶ API key ──▶ Prompt ──▶ Client ──▶ Presenter   │
//!          └───────────────────────────────────────────────────────────┘
//!                                       │
//!            ┌──────────────────────────┼──────────────────────────┐
//!            ▼                          ▼                          ▼
//!   ┌──────────────┐           ┌──────────────┐           ┌──────────────┐
//!   │    Prompt    │           │    Client    │           │  Presenter   │
//!   │console/zenity│           │    (ureq)    │           │espeak/zenity │
//!   │  /microphone │           └──────────────┘           │   /stdout    │
//!   └──────────────┘                   │                  └──────────────┘
//!            │                         ▼ raw body
//!            ▼ 16 kHz frames   ┌──────────────┐
//!   ┌──────────────┐           │  Extraction  │
//!   │ Audio + VAD  │           │ (serde/regex)│
//!   │    (cpal)    │           └──────────────┘
//!   └──────────────┘
//!            │
//!            ▼ samples
//!   ┌──────────────┐
//!   │   Whisper    │
//!   │ (whisper-rs) │
//!   └──────────────┘
//! ```

pub mod app;
pub mod audio;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod present;
pub mod prompt;
pub mod secret;
pub mod text;
pub mod transcribe;
pub mod tray;
pub mod ui;
pub mod vad;

pub use app::{Credentials, CycleOutcome, CycleRequest, Options, RunStatus, Services};
pub use config::{AppPaths, Config, ConfigStore};
pub use error::{LinwispError, Result};
