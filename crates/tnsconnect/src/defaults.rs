//! Process-wide defaults injected into [`ConnectParams`](crate::ConnectParams).

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::constants::{DEFAULT_DRIVER_NAME, DEFAULT_STMTCACHESIZE, ORACLE_HOME_NETWORK_ADMIN};

/// Environment variable names
mod vars {
    pub const TNS_ADMIN: &str = "TNS_ADMIN";
    pub const ORACLE_HOME: &str = "ORACLE_HOME";
    pub const USER: &str = "USER";
    pub const USERNAME: &str = "USERNAME";
    pub const HOSTNAME: &str = "HOSTNAME";
    pub const COMPUTERNAME: &str = "COMPUTERNAME";
}

const UNKNOWN_TERMINAL: &str = "unknown";

/// Values every new parameter set starts from.
///
/// `Defaults::default()` is fully deterministic; [`Defaults::from_env`] fills
/// in the configuration directory and the session identification fields from
/// the environment. The engine itself never reads the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Directory holding `tnsnames.ora`.
    pub config_dir: Option<PathBuf>,
    pub stmtcachesize: u32,
    pub program: String,
    pub machine: String,
    pub terminal: String,
    pub osuser: String,
    pub driver_name: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            config_dir: None,
            stmtcachesize: DEFAULT_STMTCACHESIZE,
            program: String::new(),
            machine: String::new(),
            terminal: UNKNOWN_TERMINAL.to_string(),
            osuser: String::new(),
            driver_name: DEFAULT_DRIVER_NAME.to_string(),
        }
    }
}

impl Defaults {
    /// Read defaults from the process environment.
    ///
    /// The configuration directory is `TNS_ADMIN`, falling back to
    /// `$ORACLE_HOME/network/admin`.
    #[must_use]
    pub fn from_env() -> Self {
        let program = env::current_exe()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();
        Self {
            program,
            ..Self::from_lookup(|name| env::var(name).ok())
        }
    }

    /// Build defaults from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let config_dir = non_empty(vars::TNS_ADMIN).map(PathBuf::from).or_else(|| {
            non_empty(vars::ORACLE_HOME)
                .map(|home| PathBuf::from(home).join(ORACLE_HOME_NETWORK_ADMIN))
        });
        if let Some(dir) = &config_dir {
            debug!(config_dir = %dir.display(), "discovered configuration directory");
        }

        Self {
            config_dir,
            machine: non_empty(vars::HOSTNAME)
                .or_else(|| non_empty(vars::COMPUTERNAME))
                .unwrap_or_default(),
            osuser: non_empty(vars::USER)
                .or_else(|| non_empty(vars::USERNAME))
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn with_stmtcachesize(mut self, size: u32) -> Self {
        self.stmtcachesize = size;
        self
    }
}
