//! Library defaults and fixed names

/// Default listener port
pub const DEFAULT_PORT: u16 = 1521;

/// Default requested session data unit size, in bytes
pub const DEFAULT_SDU: u32 = 8192;

/// Smallest session data unit size that is stored
pub const MIN_SDU: u32 = 512;

/// Largest session data unit size that is stored
pub const MAX_SDU: u32 = 2_097_152;

/// Default number of seconds between connection attempts
pub const DEFAULT_RETRY_DELAY: u32 = 1;

/// Default TCP connect timeout, in seconds
pub const DEFAULT_TCP_CONNECT_TIMEOUT: f64 = 20.0;

/// Default statement cache size
pub const DEFAULT_STMTCACHESIZE: u32 = 20;

/// Driver name reported to the database by default
pub const DEFAULT_DRIVER_NAME: &str = concat!("tnsconnect : ", env!("CARGO_PKG_VERSION"));

/// Name of the alias file searched in the configuration directory
pub const TNSNAMES_FILE_NAME: &str = "tnsnames.ora";

/// Sub-directory of `ORACLE_HOME` holding network configuration
pub const ORACLE_HOME_NETWORK_ADMIN: &str = "network/admin";

/// Maximum nesting of alias substitutions before a cycle is assumed
pub const MAX_ALIAS_DEPTH: usize = 16;

/// Maximum nesting of `(KEY=...)` groups in a descriptor
pub const MAX_DESCRIPTOR_DEPTH: usize = 64;

/// Prefix of Easy Connect query keys that address top-level driver fields
pub const PYO_PREFIX: &str = "pyo.";
