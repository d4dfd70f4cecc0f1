//! Connect parameter resolution for Oracle Database clients.
//!
//! This crate turns the many ways a database endpoint can be named into one
//! resolved parameter set:
//!
//! - Easy Connect strings (`[proto://]host[:port][/service][?key=value&...]`)
//! - name-value connect descriptors (`(DESCRIPTION=(ADDRESS=...)...)`)
//! - aliases defined in `tnsnames.ora`
//! - structured configuration objects and keyword parameters
//!
//! Sources are merged by [`ConnectParams`] with a fixed precedence, and the
//! result can be rendered back into a canonical descriptor.
//!
//! # Example
//!
//! ```rust
//! use tnsconnect::{ConnectParams, Defaults, OneOrMany, ParamsUpdate};
//!
//! let mut params = ConnectParams::new(Defaults::default());
//! params.parse_connect_string("scott/tiger@tcps://dbhost:2484/sales?retry_count=3")?;
//! params.set(ParamsUpdate::new().stmtcachesize(40))?;
//!
//! assert_eq!(params.user(), Some("scott"));
//! assert_eq!(params.retry_count(), OneOrMany::Scalar(3));
//! assert!(params.get_connect_string().contains("(PROTOCOL=tcps)"));
//! # Ok::<(), tnsconnect::ConnectParamsError>(())
//! ```

pub mod alias;
pub mod constants;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod params;
pub mod parser;
pub mod serialize;
pub mod types;

pub use alias::{AliasSource, ConfigDirAliases, TnsNames, network_service_names};
pub use defaults::Defaults;
pub use descriptor::{Address, Description, DescriptionList};
pub use error::{ConnectParamsError, Result};
pub use params::{
    AccessToken, AppContext, CloudConfig, ConnectParams, OneOrMany, ParamName, ParamScope,
    ParamsUpdate, PasswordSource, Secret, SecretResolver, ShardingValue, Sources, SslContext,
    TextSecretResolver,
};
pub use parser::parse_dsn_with_credentials;
pub use serialize::to_connect_string;
pub use types::{AuthMode, DriverMode, PoolBoundary, Protocol, Purity, ServerType, SslVersion};
