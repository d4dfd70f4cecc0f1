//! Closed set of parameter names.

use std::fmt;
use std::str::FromStr;

use crate::error::ConnectParamsError;
use crate::types::DriverMode;

/// Which part of the resolved state a parameter lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamScope {
    /// Top-level session field.
    Session,
    /// Copied to every description.
    Description,
    /// Copied to every address.
    Address,
}

macro_rules! param_names {
    ($($variant:ident => $name:literal, $scope:ident);+ $(;)?) => {
        /// Every parameter that can be set by name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ParamName {
            $($variant),+
        }

        impl ParamName {
            /// All names, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Keyword spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }

            #[must_use]
            pub const fn scope(self) -> ParamScope {
                match self {
                    $(Self::$variant => ParamScope::$scope),+
                }
            }
        }

        impl FromStr for ParamName {
            type Err = ConnectParamsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(ConnectParamsError::invalid_field_value(
                        "name",
                        s,
                        "unknown parameter name",
                    )),
                }
            }
        }
    };
}

param_names! {
    User => "user", Session;
    ProxyUser => "proxy_user", Session;
    Password => "password", Session;
    Newpassword => "newpassword", Session;
    WalletPassword => "wallet_password", Session;
    AccessToken => "access_token", Session;
    Externalauth => "externalauth", Session;
    Mode => "mode", Session;
    Stmtcachesize => "stmtcachesize", Session;
    Tag => "tag", Session;
    Matchanytag => "matchanytag", Session;
    ConfigDir => "config_dir", Session;
    Appcontext => "appcontext", Session;
    Shardingkey => "shardingkey", Session;
    Supershardingkey => "supershardingkey", Session;
    DebugJdwp => "debug_jdwp", Session;
    Program => "program", Session;
    Machine => "machine", Session;
    Terminal => "terminal", Session;
    Osuser => "osuser", Session;
    DriverName => "driver_name", Session;
    Handle => "handle", Session;
    SslContext => "ssl_context", Session;
    Edition => "edition", Session;
    Events => "events", Session;
    DisableOob => "disable_oob", Session;
    ServiceName => "service_name", Description;
    Sid => "sid", Description;
    ServerType => "server_type", Description;
    Cclass => "cclass", Description;
    Purity => "purity", Description;
    Sdu => "sdu", Description;
    RetryCount => "retry_count", Description;
    RetryDelay => "retry_delay", Description;
    TcpConnectTimeout => "tcp_connect_timeout", Description;
    SslServerDnMatch => "ssl_server_dn_match", Description;
    SslServerCertDn => "ssl_server_cert_dn", Description;
    SslVersion => "ssl_version", Description;
    WalletLocation => "wallet_location", Description;
    PoolBoundary => "pool_boundary", Description;
    ExpireTime => "expire_time", Description;
    UseTcpFastOpen => "use_tcp_fast_open", Description;
    ConnectionIdPrefix => "connection_id_prefix", Description;
    Protocol => "protocol", Address;
    Host => "host", Address;
    Port => "port", Address;
    HttpsProxy => "https_proxy", Address;
    HttpsProxyPort => "https_proxy_port", Address;
}

impl ParamName {
    /// Whether a client running in `mode` honors this parameter.
    #[must_use]
    pub const fn is_supported_in(self, mode: DriverMode) -> bool {
        match self {
            Self::WalletPassword
            | Self::DisableOob
            | Self::ConfigDir
            | Self::DebugJdwp
            | Self::SslContext
            | Self::UseTcpFastOpen
            | Self::SslVersion
            | Self::Program
            | Self::Machine
            | Self::Terminal
            | Self::Osuser => matches!(mode, DriverMode::Thin),
            Self::Events
            | Self::Tag
            | Self::Matchanytag
            | Self::Appcontext
            | Self::Shardingkey
            | Self::Supershardingkey
            | Self::Handle => matches!(mode, DriverMode::Thick),
            _ => true,
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
