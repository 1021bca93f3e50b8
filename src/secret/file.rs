//! Plain-file key storage
//!
//! Used where no platform secret manager is reachable. The key is stored
//! unencrypted; on Unix the file is readable by its owner only.

use super::{normalize_key, SecretStore};
use crate::error::SecretError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key stored in a single text file
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_err(&self, source: std::io::Error) -> SecretError {
        SecretError::File {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SecretStore for FileSecretStore {
    fn load_key(&self) -> Result<String, SecretError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(normalize_key(&contents).to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(self.file_err(e)),
        }
    }

    fn save_key(&self, key: &str) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.file_err(e))?;
            }
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| self.file_err(e))?;
        file.write_all(normalize_key(key).as_bytes())
            .map_err(|e| self.file_err(e))?;

        tracing::debug!("Stored API key in {:?}", self.path);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
