//! Typed keyword parameters.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

use super::names::ParamName;
use super::values::{AccessToken, AppContext, Secret, ShardingValue, SslContext};
use crate::descriptor::{Address, Description};
use crate::error::ConnectParamsError;
use crate::types::{
    AuthMode, PoolBoundary, Protocol, Purity, ServerType, SslVersion, parse_bool, parse_port,
    parse_timeout, parse_u32, validate_text, validate_timeout,
};
use crate::Result;

macro_rules! params_update {
    (@setter into $field:ident ($ty:ty) $(#[$doc:meta])*) => {
        $(#[$doc])*
        #[must_use]
        pub fn $field(mut self, value: impl Into<$ty>) -> Self {
            self.$field = Some(value.into());
            self
        }
    };
    (@setter value $field:ident ($ty:ty) $(#[$doc:meta])*) => {
        $(#[$doc])*
        #[must_use]
        pub const fn $field(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
    ($($(#[$doc:meta])* $field:ident: $kind:ident $ty:ty => $name:ident),+ $(,)?) => {
        /// A set of parameter values to apply with
        /// [`ConnectParams::set`](crate::ConnectParams::set).
        ///
        /// Only the fields given are applied; everything else keeps its
        /// current value.
        ///
        /// ```rust
        /// use tnsconnect::{ParamsUpdate, ParamName};
        ///
        /// let update = ParamsUpdate::new()
        ///     .user("scott")
        ///     .service_name("orclpdb")
        ///     .retry_count(3);
        /// assert_eq!(
        ///     update.names(),
        ///     [ParamName::User, ParamName::ServiceName, ParamName::RetryCount]
        /// );
        /// ```
        #[derive(Clone, Default, PartialEq)]
        pub struct ParamsUpdate {
            $(pub(crate) $field: Option<$ty>,)+
        }

        impl ParamsUpdate {
            $(params_update!(@setter $kind $field ($ty) $(#[$doc])*);)+

            /// Names of the parameters this update sets, in declaration order.
            #[must_use]
            pub fn names(&self) -> Vec<ParamName> {
                let mut names = Vec::new();
                $(
                    if self.$field.is_some() {
                        names.push(ParamName::$name);
                    }
                )+
                names
            }
        }
    };
}

params_update! {
    /// Database user. `name[proxy]` also sets the proxy user.
    user: into String => User,
    proxy_user: into String => ProxyUser,
    password: into Secret => Password,
    /// New password to set during logon.
    newpassword: into Secret => Newpassword,
    /// Password of an encrypted wallet.
    wallet_password: into Secret => WalletPassword,
    access_token: into AccessToken => AccessToken,
    /// Authenticate with external credentials.
    externalauth: value bool => Externalauth,
    mode: value AuthMode => Mode,
    stmtcachesize: value u32 => Stmtcachesize,
    tag: into String => Tag,
    matchanytag: value bool => Matchanytag,
    /// Directory holding `tnsnames.ora`.
    config_dir: into PathBuf => ConfigDir,
    appcontext: into Vec<AppContext> => Appcontext,
    shardingkey: into Vec<ShardingValue> => Shardingkey,
    supershardingkey: into Vec<ShardingValue> => Supershardingkey,
    debug_jdwp: into String => DebugJdwp,
    program: into String => Program,
    machine: into String => Machine,
    terminal: into String => Terminal,
    osuser: into String => Osuser,
    driver_name: into String => DriverName,
    /// Native connection handle to wrap.
    handle: value u64 => Handle,
    ssl_context: into SslContext => SslContext,
    edition: into String => Edition,
    events: value bool => Events,
    disable_oob: value bool => DisableOob,
    service_name: into String => ServiceName,
    sid: into String => Sid,
    server_type: value ServerType => ServerType,
    /// DRCP connection class.
    cclass: into String => Cclass,
    purity: value Purity => Purity,
    /// Session data unit; clamped to the supported range when applied.
    sdu: value u32 => Sdu,
    retry_count: value u32 => RetryCount,
    retry_delay: value u32 => RetryDelay,
    /// Seconds.
    tcp_connect_timeout: value f64 => TcpConnectTimeout,
    ssl_server_dn_match: value bool => SslServerDnMatch,
    ssl_server_cert_dn: into String => SslServerCertDn,
    ssl_version: value SslVersion => SslVersion,
    wallet_location: into String => WalletLocation,
    pool_boundary: value PoolBoundary => PoolBoundary,
    /// Minutes between keepalive probes.
    expire_time: value u32 => ExpireTime,
    use_tcp_fast_open: value bool => UseTcpFastOpen,
    connection_id_prefix: into String => ConnectionIdPrefix,
    protocol: value Protocol => Protocol,
    host: into String => Host,
    port: value u16 => Port,
    https_proxy: into String => HttpsProxy,
    https_proxy_port: value u16 => HttpsProxyPort,
}

impl ParamsUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    /// Set a parameter from its text form.
    ///
    /// Structured parameters (`appcontext`, `shardingkey`,
    /// `supershardingkey`, `ssl_context`) have no text form and are rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFieldValue` if `value` is outside the parameter's
    /// domain.
    pub fn with_text(mut self, name: ParamName, value: &str) -> Result<Self> {
        use ParamName as P;

        let field = name.as_str();
        let text = || Some(value.to_string());
        match name {
            P::User => self.user = text(),
            P::ProxyUser => self.proxy_user = text(),
            P::Password => self.password = Some(Secret::new(value)),
            P::Newpassword => self.newpassword = Some(Secret::new(value)),
            P::WalletPassword => self.wallet_password = Some(Secret::new(value)),
            P::AccessToken => self.access_token = Some(AccessToken::OAuth(value.to_string())),
            P::Externalauth => self.externalauth = Some(parse_bool(field, value)?),
            P::Mode => self.mode = Some(value.parse()?),
            P::Stmtcachesize => self.stmtcachesize = Some(parse_u32(field, value)?),
            P::Tag => self.tag = text(),
            P::Matchanytag => self.matchanytag = Some(parse_bool(field, value)?),
            P::ConfigDir => self.config_dir = Some(PathBuf::from(value)),
            P::DebugJdwp => self.debug_jdwp = text(),
            P::Program => self.program = text(),
            P::Machine => self.machine = text(),
            P::Terminal => self.terminal = text(),
            P::Osuser => self.osuser = text(),
            P::DriverName => self.driver_name = text(),
            P::Handle => {
                self.handle = Some(value.trim().parse().map_err(|_| {
                    ConnectParamsError::invalid_field_value(
                        field,
                        value,
                        "expected a non-negative integer",
                    )
                })?);
            }
            P::Edition => self.edition = text(),
            P::Events => self.events = Some(parse_bool(field, value)?),
            P::DisableOob => self.disable_oob = Some(parse_bool(field, value)?),
            P::ServiceName => self.service_name = text(),
            P::Sid => self.sid = text(),
            P::ServerType => self.server_type = Some(value.parse()?),
            P::Cclass => self.cclass = text(),
            P::Purity => self.purity = Some(value.parse()?),
            P::Sdu => self.sdu = Some(parse_u32(field, value)?),
            P::RetryCount => self.retry_count = Some(parse_u32(field, value)?),
            P::RetryDelay => self.retry_delay = Some(parse_u32(field, value)?),
            P::TcpConnectTimeout => {
                self.tcp_connect_timeout = Some(parse_timeout(field, value)?);
            }
            P::SslServerDnMatch => self.ssl_server_dn_match = Some(parse_bool(field, value)?),
            P::SslServerCertDn => self.ssl_server_cert_dn = text(),
            P::SslVersion => self.ssl_version = Some(value.parse()?),
            P::WalletLocation => self.wallet_location = text(),
            P::PoolBoundary => self.pool_boundary = Some(value.parse()?),
            P::ExpireTime => self.expire_time = Some(parse_u32(field, value)?),
            P::UseTcpFastOpen => self.use_tcp_fast_open = Some(parse_bool(field, value)?),
            P::ConnectionIdPrefix => self.connection_id_prefix = text(),
            P::Protocol => self.protocol = Some(value.parse()?),
            P::Host => self.host = text(),
            P::Port => self.port = Some(parse_port(field, value)?),
            P::HttpsProxy => self.https_proxy = text(),
            P::HttpsProxyPort => self.https_proxy_port = Some(parse_port(field, value)?),
            P::Appcontext | P::Shardingkey | P::Supershardingkey | P::SslContext => {
                return Err(ConnectParamsError::invalid_field_value(
                    field,
                    value,
                    "has no text form",
                ));
            }
        }
        Ok(self)
    }

    /// Set a parameter from a JSON value, as found in configuration files.
    ///
    /// Strings, numbers and booleans go through [`with_text`](Self::with_text).
    /// `appcontext` takes an array of `[namespace, name, value]` triples and
    /// the sharding keys take arrays of strings and numbers.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFieldValue` for values of the wrong shape.
    pub fn with_json(mut self, name: ParamName, value: &Value) -> Result<Self> {
        match (name, value) {
            (ParamName::Appcontext, Value::Array(items)) => {
                self.appcontext = Some(
                    items
                        .iter()
                        .map(app_context_from_json)
                        .collect::<Result<_>>()?,
                );
                Ok(self)
            }
            (ParamName::Shardingkey | ParamName::Supershardingkey, Value::Array(items)) => {
                let key = items
                    .iter()
                    .map(|item| sharding_value_from_json(name, item))
                    .collect::<Result<Vec<_>>>()?;
                if name == ParamName::Shardingkey {
                    self.shardingkey = Some(key);
                } else {
                    self.supershardingkey = Some(key);
                }
                Ok(self)
            }
            (_, Value::String(text)) => self.with_text(name, text),
            (_, Value::Number(_) | Value::Bool(_)) => self.with_text(name, &value.to_string()),
            _ => Err(ConnectParamsError::invalid_field_value(
                name.as_str(),
                value.to_string(),
                "unsupported value type",
            )),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.tcp_connect_timeout {
            validate_timeout(ParamName::TcpConnectTimeout.as_str(), timeout)?;
        }
        let descriptor_text = [
            (ParamName::ServiceName, &self.service_name),
            (ParamName::Sid, &self.sid),
            (ParamName::Cclass, &self.cclass),
            (ParamName::SslServerCertDn, &self.ssl_server_cert_dn),
            (ParamName::WalletLocation, &self.wallet_location),
            (ParamName::ConnectionIdPrefix, &self.connection_id_prefix),
            (ParamName::Host, &self.host),
            (ParamName::HttpsProxy, &self.https_proxy),
        ];
        for (name, value) in descriptor_text {
            if let Some(value) = value {
                validate_text(name.as_str(), value)?;
            }
        }
        Ok(())
    }

    pub(crate) const fn has_description_fields(&self) -> bool {
        self.service_name.is_some()
            || self.sid.is_some()
            || self.server_type.is_some()
            || self.cclass.is_some()
            || self.purity.is_some()
            || self.sdu.is_some()
            || self.retry_count.is_some()
            || self.retry_delay.is_some()
            || self.tcp_connect_timeout.is_some()
            || self.ssl_server_dn_match.is_some()
            || self.ssl_server_cert_dn.is_some()
            || self.ssl_version.is_some()
            || self.wallet_location.is_some()
            || self.pool_boundary.is_some()
            || self.expire_time.is_some()
            || self.use_tcp_fast_open.is_some()
            || self.connection_id_prefix.is_some()
    }

    pub(crate) const fn has_address_fields(&self) -> bool {
        self.protocol.is_some()
            || self.host.is_some()
            || self.port.is_some()
            || self.https_proxy.is_some()
            || self.https_proxy_port.is_some()
    }

    /// Copy the description-level fields onto `description`.
    pub(crate) fn apply_to_description(&self, description: &mut Description) {
        copy_some(&self.service_name, &mut description.service_name);
        copy_some(&self.sid, &mut description.sid);
        copy_some(&self.server_type, &mut description.server_type);
        copy_some(&self.cclass, &mut description.cclass);
        copy_some(&self.ssl_server_cert_dn, &mut description.ssl_server_cert_dn);
        copy_some(&self.ssl_version, &mut description.ssl_version);
        copy_some(&self.wallet_location, &mut description.wallet_location);
        copy_some(&self.pool_boundary, &mut description.pool_boundary);
        copy_some(&self.connection_id_prefix, &mut description.connection_id_prefix);
        if let Some(purity) = self.purity {
            description.purity = purity;
        }
        if let Some(sdu) = self.sdu {
            description.set_sdu(sdu);
        }
        if let Some(count) = self.retry_count {
            description.retry_count = count;
        }
        if let Some(delay) = self.retry_delay {
            description.retry_delay = delay;
        }
        if let Some(timeout) = self.tcp_connect_timeout {
            description.tcp_connect_timeout = timeout;
        }
        if let Some(dn_match) = self.ssl_server_dn_match {
            description.ssl_server_dn_match = dn_match;
        }
        if let Some(expire_time) = self.expire_time {
            description.expire_time = expire_time;
        }
        if let Some(fast_open) = self.use_tcp_fast_open {
            description.use_tcp_fast_open = fast_open;
        }
    }

    /// Copy the address-level fields onto `address`.
    pub(crate) fn apply_to_address(&self, address: &mut Address) {
        if let Some(protocol) = self.protocol {
            address.protocol = protocol;
        }
        if let Some(host) = &self.host {
            address.host.clone_from(host);
        }
        if let Some(port) = self.port {
            address.port = port;
        }
        copy_some(&self.https_proxy, &mut address.https_proxy);
        if let Some(port) = self.https_proxy_port {
            address.https_proxy_port = port;
        }
    }
}

// Secrets are left out; only the names of the fields set are shown.
impl fmt::Debug for ParamsUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamsUpdate")
            .field("names", &self.names())
            .finish_non_exhaustive()
    }
}

fn copy_some<T: Clone>(source: &Option<T>, target: &mut Option<T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}

fn app_context_from_json(item: &Value) -> Result<AppContext> {
    let parts = item
        .as_array()
        .filter(|parts| parts.len() == 3)
        .and_then(|parts| {
            parts
                .iter()
                .map(|p| p.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        });
    match parts.as_deref() {
        Some([namespace, name, value]) => Ok(AppContext::new(namespace, name, value)),
        _ => Err(ConnectParamsError::invalid_field_value(
            ParamName::Appcontext.as_str(),
            item.to_string(),
            "expected [namespace, name, value]",
        )),
    }
}

fn sharding_value_from_json(name: ParamName, item: &Value) -> Result<ShardingValue> {
    match item {
        Value::String(text) => Ok(ShardingValue::Text(text.clone())),
        Value::Number(number) => number
            .as_i64()
            .map(ShardingValue::Integer)
            .or_else(|| number.as_f64().map(ShardingValue::Float))
            .ok_or_else(|| {
                ConnectParamsError::invalid_field_value(
                    name.as_str(),
                    number.to_string(),
                    "number out of range",
                )
            }),
        _ => Err(ConnectParamsError::invalid_field_value(
            name.as_str(),
            item.to_string(),
            "expected a string or a number",
        )),
    }
}
