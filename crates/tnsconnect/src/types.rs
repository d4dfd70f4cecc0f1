//! Enumerated parameter values.
//!
//! Each type parses case-insensitively from the spellings used in connect
//! strings and configuration, and renders back to the canonical descriptor
//! spelling through [`Display`](std::fmt::Display).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConnectParamsError;

/// Generates `as_str`, `Display` and a `FromStr` that reports the field name.
macro_rules! descriptor_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $canonical:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Canonical descriptor spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $canonical),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConnectParamsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_ascii_lowercase();
                $(
                    if lowered.eq_ignore_ascii_case($canonical) $(|| lowered == $alias)* {
                        return Ok(Self::$variant);
                    }
                )+
                Err(ConnectParamsError::invalid_field_value(
                    $field,
                    s,
                    concat!("expected one of: " $(, $canonical, " ")+),
                ))
            }
        }
    };
}

descriptor_enum! {
    /// Network protocol of an address.
    Protocol, "protocol" {
        /// Plain TCP.
        Tcp => "tcp",
        /// TCP with TLS.
        Tcps => "tcps",
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::Tcp
    }
}

descriptor_enum! {
    /// Kind of server process requested for the session.
    ServerType, "server_type" {
        /// Dedicated server process.
        Dedicated => "dedicated",
        /// Shared server.
        Shared => "shared",
        /// Database resident connection pool.
        Pooled => "pooled",
    }
}

descriptor_enum! {
    /// DRCP boundary at which a pooled server may be released.
    PoolBoundary, "pool_boundary" {
        /// Released after each statement.
        Statement => "statement",
        /// Released at transaction end.
        Transaction => "transaction",
    }
}

descriptor_enum! {
    /// Session reuse policy for connection classes.
    Purity, "purity" {
        /// Let the pool decide.
        Default => "default",
        /// Always a fresh session.
        New => "new" | "purity_new",
        /// Reuse a previously used session.
        #[serde(rename = "self")]
        SelfPurity => "self" | "purity_self",
    }
}

impl Default for Purity {
    fn default() -> Self {
        Self::Default
    }
}

impl Purity {
    /// Numeric value used by client APIs.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::New => 1,
            Self::SelfPurity => 2,
        }
    }
}

descriptor_enum! {
    /// Requested TLS protocol version.
    SslVersion, "ssl_version" {
        /// TLS 1.2.
        #[serde(rename = "tlsv1.2")]
        Tls12 => "tlsv1.2" | "1.2" | "tlsv1_2",
        /// TLS 1.3.
        #[serde(rename = "tlsv1.3")]
        Tls13 => "tlsv1.3" | "1.3" | "tlsv1_3",
    }
}

descriptor_enum! {
    /// Administrative privilege requested at logon.
    AuthMode, "mode" {
        /// No special privilege.
        Default => "default",
        /// SYSDBA.
        SysDba => "sysdba",
        /// SYSOPER.
        SysOper => "sysoper",
        /// SYSASM.
        SysAsm => "sysasm",
        /// SYSBACKUP.
        SysBkp => "sysbkp" | "sysbackup",
        /// SYSDG.
        SysDgd => "sysdgd" | "sysdg",
        /// SYSKM.
        SysKmt => "syskmt" | "syskm",
        /// SYSRAC.
        SysRac => "sysrac",
        /// Preliminary authentication.
        Prelim => "prelim",
    }
}

impl Default for AuthMode {
    fn default() -> Self {
        Self::Default
    }
}

/// Which client implementation consumes the parameters.
///
/// Some parameters are only honored by one of the two modes; see
/// [`ParamName::is_supported_in`](crate::ParamName::is_supported_in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriverMode {
    /// Pure implementation of the network protocol.
    #[default]
    Thin,
    /// Implementation backed by the native client library.
    Thick,
}

/// Parse a descriptor boolean (`on/off`, `yes/no`, `true/false`).
pub(crate) fn parse_bool(field: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(ConnectParamsError::invalid_field_value(
            field,
            value,
            "expected on/off, yes/no or true/false",
        )),
    }
}

/// Parse a non-negative integer.
pub(crate) fn parse_u32(field: &str, value: &str) -> crate::Result<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        ConnectParamsError::invalid_field_value(field, value, "expected a non-negative integer")
    })
}

/// Parse a port number.
pub(crate) fn parse_port(field: &str, value: &str) -> crate::Result<u16> {
    value.trim().parse::<u16>().map_err(|_| {
        ConnectParamsError::invalid_field_value(field, value, "expected an integer in 0..=65535")
    })
}

/// Reject text that a descriptor cannot carry, even quoted.
pub(crate) fn validate_text(field: &str, value: &str) -> crate::Result<()> {
    if value.contains('"') {
        Err(ConnectParamsError::invalid_field_value(
            field,
            value,
            "must not contain double quotes",
        ))
    } else {
        Ok(())
    }
}

/// Parse a timeout in seconds, honoring an optional `ms`, `sec` or `min` unit.
pub(crate) fn parse_timeout(field: &str, value: &str) -> crate::Result<f64> {
    let trimmed = value.trim().to_ascii_lowercase();
    let (number, scale) = if let Some(n) = trimmed.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = trimmed.strip_suffix("sec") {
        (n, 1.0)
    } else if let Some(n) = trimmed.strip_suffix("min") {
        (n, 60.0)
    } else {
        (trimmed.as_str(), 1.0)
    };
    let seconds = number
        .trim()
        .parse::<f64>()
        .map_err(|_| ConnectParamsError::invalid_field_value(field, value, "expected a number"))?
        * scale;
    validate_timeout(field, seconds)
}

/// Reject timeouts that are not finite and strictly positive.
pub(crate) fn validate_timeout(field: &str, seconds: f64) -> crate::Result<f64> {
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(ConnectParamsError::invalid_field_value(
            field,
            seconds.to_string(),
            "must be greater than zero",
        ))
    }
}
