//! Error hierarchy for tnsconnect.
//!
//! Follows the canonical error struct pattern: a single public error type with
//! a private kind and `is_xxx()` predicates for classification.

use std::path::PathBuf;

use thiserror::Error;

/// Root error type for connect parameter resolution.
///
/// Every error names the token, alias or field that caused it so that the
/// caller can correct the connect string or the offending parameter.
///
/// # Example
///
/// ```rust
/// use tnsconnect::{ConnectParams, Defaults, ParamsUpdate};
///
/// let mut params = ConnectParams::new(Defaults::default());
/// let err = params
///     .set(ParamsUpdate::new().edition("E1").cclass("C1"))
///     .unwrap_err();
/// assert!(err.is_config_conflict());
/// ```
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct ConnectParamsError {
    kind: ErrorKind,
}

/// Internal error classification.
#[derive(Error, Debug)]
#[non_exhaustive]
pub(crate) enum ErrorKind {
    /// Malformed Easy Connect, descriptor or credential syntax.
    #[error("cannot parse connect string at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Alias file missing or alias not defined in it.
    #[error("{} not found in {location}", describe_alias(alias.as_deref()))]
    AliasNotFound {
        alias: Option<String>,
        location: String,
    },

    /// Two mutually exclusive fields are both set.
    #[error("parameters \"{first}\" and \"{second}\" cannot be used together")]
    ConfigConflict {
        first: &'static str,
        second: &'static str,
    },

    /// A value outside the domain of its field.
    #[error("invalid value \"{value}\" for parameter \"{field}\": {reason}")]
    InvalidFieldValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Reading an alias or configuration file failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured configuration that cannot be applied.
    #[error("configuration error: {0}")]
    Config(String),
}

fn describe_alias(alias: Option<&str>) -> String {
    alias.map_or_else(|| "alias file".to_string(), |a| format!("alias \"{a}\""))
}

impl ConnectParamsError {
    // ═══════════════════════════════════════════════════════════════════════
    // Constructors
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a parse error at the given byte offset of the input.
    #[must_use]
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse {
                position,
                message: message.into(),
            },
        }
    }

    /// Create an alias-not-found error.
    #[must_use]
    pub fn alias_not_found(alias: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::AliasNotFound {
                alias: Some(alias.into()),
                location: location.into(),
            },
        }
    }

    /// Create an error for a configuration directory without an alias file.
    #[must_use]
    pub fn alias_file_not_found(location: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::AliasNotFound {
                alias: None,
                location: location.into(),
            },
        }
    }

    /// Create a conflict error for two mutually exclusive fields.
    #[must_use]
    pub const fn config_conflict(first: &'static str, second: &'static str) -> Self {
        Self {
            kind: ErrorKind::ConfigConflict { first, second },
        }
    }

    /// Create an invalid field value error.
    #[must_use]
    pub fn invalid_field_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::InvalidFieldValue {
                field: field.into(),
                value: value.into(),
                reason: reason.into(),
            },
        }
    }

    /// Create an I/O error for the given path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io {
                path: path.into(),
                source,
            },
        }
    }

    /// Create a structured configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Config(message.into()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Predicate Methods (is_xxx)
    // ═══════════════════════════════════════════════════════════════════════

    /// Returns true if this is a connect string parse error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self.kind, ErrorKind::Parse { .. })
    }

    /// Returns true if an alias (or the alias file) could not be found.
    #[must_use]
    pub const fn is_alias_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::AliasNotFound { .. })
    }

    /// Returns true if mutually exclusive parameters were combined.
    #[must_use]
    pub const fn is_config_conflict(&self) -> bool {
        matches!(self.kind, ErrorKind::ConfigConflict { .. })
    }

    /// Returns true if a parameter value is outside its domain.
    #[must_use]
    pub const fn is_invalid_field_value(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidFieldValue { .. })
    }

    /// Returns true if reading a file failed.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io { .. })
    }

    /// Returns true if a structured configuration could not be applied.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self.kind, ErrorKind::Config(_))
    }

    /// Name of the offending field, for field-level errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::InvalidFieldValue { field, .. } => Some(field),
            ErrorKind::ConfigConflict { second, .. } => Some(second),
            _ => None,
        }
    }

    /// Byte offset into the connect string, for parse errors.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match &self.kind {
            ErrorKind::Parse { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Shift the position of a parse error by `offset` bytes.
    ///
    /// Used when a sub-string was parsed in isolation.
    #[must_use]
    pub(crate) fn offset_by(mut self, offset: usize) -> Self {
        if let ErrorKind::Parse { position, .. } = &mut self.kind {
            *position += offset;
        }
        self
    }
}

/// Result type alias for connect parameter operations.
pub type Result<T> = std::result::Result<T, ConnectParamsError>;
