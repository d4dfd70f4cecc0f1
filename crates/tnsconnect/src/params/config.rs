//! Structured configuration objects (JSON or TOML).

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConnectParamsError;
use crate::Result;

/// Connection configuration as delivered by a configuration provider.
///
/// ```json
/// {
///   "connect_descriptor": "dbhost:1521/orclpdb",
///   "user": "scott",
///   "password": { "type": "text", "value": "tiger" },
///   "pyo": { "stmtcachesize": 40 }
/// }
/// ```
#[derive(Clone, Default, Deserialize, PartialEq)]
pub struct CloudConfig {
    pub connect_descriptor: Option<String>,
    pub user: Option<String>,
    pub password: Option<PasswordSource>,
    /// Driver parameters by name.
    #[serde(default)]
    pub pyo: BTreeMap<String, Value>,
}

impl CloudConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ConnectParamsError::config(format!("invalid JSON configuration: {e}")))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| ConnectParamsError::config(format!("invalid TOML configuration: {e}")))
    }

    /// Load a configuration file; `.toml` files are read as TOML, anything
    /// else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConnectParamsError::io(path, e))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        config.map_err(|e| ConnectParamsError::config(format!("{}: {e}", path.display())))
    }
}

impl fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudConfig")
            .field("connect_descriptor", &self.connect_descriptor)
            .field("user", &self.user)
            .field("pyo", &self.pyo.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Where the password comes from.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PasswordSource {
    /// The password itself.
    Plain(String),
    /// A typed reference resolved by a [`SecretResolver`].
    Reference {
        #[serde(rename = "type")]
        kind: String,
        value: String,
    },
}

impl PasswordSource {
    pub fn resolve(&self, resolver: &dyn SecretResolver) -> Result<String> {
        match self {
            Self::Plain(password) => Ok(password.clone()),
            Self::Reference { kind, value } => resolver.resolve(kind, value),
        }
    }
}

impl fmt::Debug for PasswordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.debug_tuple("Plain").finish_non_exhaustive(),
            Self::Reference { kind, .. } => f
                .debug_struct("Reference")
                .field("kind", kind)
                .finish_non_exhaustive(),
        }
    }
}

/// Turns a typed password reference into the password.
///
/// Vault and key-store lookups live outside this crate; implement this trait
/// to plug them in.
pub trait SecretResolver {
    fn resolve(&self, kind: &str, value: &str) -> Result<String>;
}

/// Resolver for inline passwords (`"type": "text"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSecretResolver;

impl SecretResolver for TextSecretResolver {
    fn resolve(&self, kind: &str, value: &str) -> Result<String> {
        if kind.eq_ignore_ascii_case("text") {
            Ok(value.to_string())
        } else {
            Err(ConnectParamsError::config(format!(
                "unsupported password type \"{kind}\""
            )))
        }
    }
}
