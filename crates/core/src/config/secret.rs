use std::fmt;

use super::ConfigError;

/// Environment variable holding the archive passphrase.
pub const SECRET_ENV_VAR: &str = "DB_SECRET";

/// The passphrase the archive key is derived from.
///
/// `Debug` never prints the value.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(value))
    }

    /// Read the secret from `DB_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(SECRET_ENV_VAR) {
            Ok(value) => Self::new(value),
            Err(_) => Err(ConfigError::MissingSecret),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}
