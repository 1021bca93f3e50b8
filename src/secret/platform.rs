//! Platform secret manager storage (Secret Service, Keychain, Credential Manager)

use super::{normalize_key, SecretStore, ACCOUNT_NAME, SERVICE_NAME};
use crate::error::SecretError;

/// Key stored in the OS keyring under a fixed service/account pair
pub struct KeyringSecretStore {
    entry: keyring::Entry,
}

impl KeyringSecretStore {
    pub fn new() -> Result<Self, SecretError> {
        let entry = keyring::Entry::new(SERVICE_NAME, ACCOUNT_NAME)?;
        Ok(Self { entry })
    }
}

impl SecretStore for KeyringSecretStore {
    fn load_key(&self) -> Result<String, SecretError> {
        match self.entry.get_password() {
            Ok(key) => Ok(normalize_key(&key).to_string()),
            Err(keyring::Error::NoEntry) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save_key(&self, key: &str) -> Result<(), SecretError> {
        self.entry.set_password(normalize_key(key))?;
        tracing::debug!("Stored API key in keyring ({}/{})", SERVICE_NAME, ACCOUNT_NAME);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}
