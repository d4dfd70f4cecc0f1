//! Field keys shared by the Easy Connect and descriptor grammars

use crate::descriptor::{Address, Description, DescriptionList};
use crate::types::{parse_bool, parse_port, parse_timeout, parse_u32, validate_text};
use crate::Result;

/// A description-level field addressable from a connect string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DescriptionField {
    ServiceName,
    Sid,
    ServerType,
    Cclass,
    Purity,
    PoolBoundary,
    ConnectionIdPrefix,
    Sdu,
    RetryCount,
    RetryDelay,
    TcpConnectTimeout,
    ExpireTime,
    UseTcpFastOpen,
    LoadBalance,
    SourceRoute,
    SslServerDnMatch,
    SslServerCertDn,
    SslVersion,
    WalletLocation,
}

impl DescriptionField {
    /// Keys valid directly inside `(DESCRIPTION=...)`.
    pub(crate) fn from_description_key(key: &str) -> Option<Self> {
        Some(match key {
            "SDU" => Self::Sdu,
            "RETRY_COUNT" => Self::RetryCount,
            "RETRY_DELAY" => Self::RetryDelay,
            "TRANSPORT_CONNECT_TIMEOUT" | "CONNECT_TIMEOUT" => Self::TcpConnectTimeout,
            "EXPIRE_TIME" => Self::ExpireTime,
            "USE_TCP_FAST_OPEN" => Self::UseTcpFastOpen,
            "LOAD_BALANCE" => Self::LoadBalance,
            "SOURCE_ROUTE" => Self::SourceRoute,
            "CONNECTION_ID_PREFIX" => Self::ConnectionIdPrefix,
            _ => return None,
        })
    }

    /// Keys valid inside `(CONNECT_DATA=...)`.
    pub(crate) fn from_connect_data_key(key: &str) -> Option<Self> {
        Some(match key {
            "SERVICE_NAME" => Self::ServiceName,
            "SID" => Self::Sid,
            "SERVER" => Self::ServerType,
            "POOL_CONNECTION_CLASS" => Self::Cclass,
            "POOL_PURITY" => Self::Purity,
            "POOL_BOUNDARY" => Self::PoolBoundary,
            "CONNECTION_ID_PREFIX" => Self::ConnectionIdPrefix,
            _ => return None,
        })
    }

    /// Keys valid inside `(SECURITY=...)`.
    pub(crate) fn from_security_key(key: &str) -> Option<Self> {
        Some(match key {
            "SSL_SERVER_DN_MATCH" => Self::SslServerDnMatch,
            "SSL_SERVER_CERT_DN" => Self::SslServerCertDn,
            "SSL_VERSION" => Self::SslVersion,
            "MY_WALLET_DIRECTORY" | "WALLET_LOCATION" => Self::WalletLocation,
            _ => return None,
        })
    }

    /// Parameter name reported in errors.
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::ServiceName => "service_name",
            Self::Sid => "sid",
            Self::ServerType => "server_type",
            Self::Cclass => "cclass",
            Self::Purity => "purity",
            Self::PoolBoundary => "pool_boundary",
            Self::ConnectionIdPrefix => "connection_id_prefix",
            Self::Sdu => "sdu",
            Self::RetryCount => "retry_count",
            Self::RetryDelay => "retry_delay",
            Self::TcpConnectTimeout => "tcp_connect_timeout",
            Self::ExpireTime => "expire_time",
            Self::UseTcpFastOpen => "use_tcp_fast_open",
            Self::LoadBalance => "load_balance",
            Self::SourceRoute => "source_route",
            Self::SslServerDnMatch => "ssl_server_dn_match",
            Self::SslServerCertDn => "ssl_server_cert_dn",
            Self::SslVersion => "ssl_version",
            Self::WalletLocation => "wallet_location",
        }
    }

    pub(crate) fn apply(self, description: &mut Description, value: &str) -> Result<()> {
        let name = self.name();
        match self {
            Self::ServiceName => description.service_name = text(name, value)?,
            Self::Sid => description.sid = text(name, value)?,
            Self::ServerType => description.server_type = Some(value.parse()?),
            Self::Cclass => description.cclass = text(name, value)?,
            Self::Purity => description.purity = value.parse()?,
            Self::PoolBoundary => description.pool_boundary = Some(value.parse()?),
            Self::ConnectionIdPrefix => description.connection_id_prefix = text(name, value)?,
            Self::Sdu => description.set_sdu(parse_u32(name, value)?),
            Self::RetryCount => description.retry_count = parse_u32(name, value)?,
            Self::RetryDelay => description.retry_delay = parse_u32(name, value)?,
            Self::TcpConnectTimeout => {
                description.tcp_connect_timeout = parse_timeout(name, value)?;
            }
            Self::ExpireTime => description.expire_time = parse_u32(name, value)?,
            Self::UseTcpFastOpen => description.use_tcp_fast_open = parse_bool(name, value)?,
            Self::LoadBalance => description.load_balance = parse_bool(name, value)?,
            Self::SourceRoute => description.source_route = parse_bool(name, value)?,
            Self::SslServerDnMatch => description.ssl_server_dn_match = parse_bool(name, value)?,
            Self::SslServerCertDn => description.ssl_server_cert_dn = text(name, value)?,
            Self::SslVersion => description.ssl_version = Some(value.parse()?),
            Self::WalletLocation => description.wallet_location = text(name, value)?,
        }
        Ok(())
    }
}

/// An address-level field addressable from a connect string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddressField {
    Protocol,
    Host,
    Port,
    HttpsProxy,
    HttpsProxyPort,
}

impl AddressField {
    /// Keys valid inside `(ADDRESS=...)`.
    pub(crate) fn from_address_key(key: &str) -> Option<Self> {
        Some(match key {
            "PROTOCOL" => Self::Protocol,
            "HOST" => Self::Host,
            "PORT" => Self::Port,
            "HTTPS_PROXY" => Self::HttpsProxy,
            "HTTPS_PROXY_PORT" => Self::HttpsProxyPort,
            _ => return None,
        })
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Protocol => "protocol",
            Self::Host => "host",
            Self::Port => "port",
            Self::HttpsProxy => "https_proxy",
            Self::HttpsProxyPort => "https_proxy_port",
        }
    }

    pub(crate) fn apply(self, address: &mut Address, value: &str) -> Result<()> {
        match self {
            Self::Protocol => address.protocol = value.parse()?,
            Self::Host => {
                validate_text(self.name(), value)?;
                address.host = value.trim().to_string();
            }
            Self::Port => address.port = parse_port(self.name(), value)?,
            Self::HttpsProxy => address.https_proxy = text(self.name(), value)?,
            Self::HttpsProxyPort => address.https_proxy_port = parse_port(self.name(), value)?,
        }
        Ok(())
    }
}

/// A flag of the description list itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListField {
    LoadBalance,
    Failover,
    SourceRoute,
}

impl ListField {
    /// Keys valid directly inside `(DESCRIPTION_LIST=...)`.
    pub(crate) fn from_list_key(key: &str) -> Option<Self> {
        Some(match key {
            "LOAD_BALANCE" => Self::LoadBalance,
            "FAILOVER" => Self::Failover,
            "SOURCE_ROUTE" => Self::SourceRoute,
            _ => return None,
        })
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::LoadBalance => "load_balance",
            Self::Failover => "failover",
            Self::SourceRoute => "source_route",
        }
    }

    pub(crate) fn apply(self, list: &mut DescriptionList, value: &str) -> Result<()> {
        let flag = parse_bool(self.name(), value)?;
        match self {
            Self::LoadBalance => list.load_balance = flag,
            Self::Failover => list.failover = flag,
            Self::SourceRoute => list.source_route = flag,
        }
        Ok(())
    }
}

/// Where an Easy Connect query key lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EasyConnectKey {
    Description(DescriptionField),
    Address(AddressField),
    List(ListField),
}

impl EasyConnectKey {
    /// Look up a lower-cased Easy Connect query key.
    pub(crate) fn lookup(key: &str) -> Option<Self> {
        use DescriptionField as D;

        let description = match key {
            "expire_time" => D::ExpireTime,
            "retry_count" => D::RetryCount,
            "retry_delay" => D::RetryDelay,
            "sdu" => D::Sdu,
            "transport_connect_timeout" | "tcp_connect_timeout" | "connect_timeout" => {
                D::TcpConnectTimeout
            }
            "ssl_server_dn_match" => D::SslServerDnMatch,
            "ssl_server_cert_dn" => D::SslServerCertDn,
            "ssl_version" => D::SslVersion,
            "wallet_location" | "my_wallet_directory" => D::WalletLocation,
            "pool_connection_class" => D::Cclass,
            "pool_purity" => D::Purity,
            "pool_boundary" => D::PoolBoundary,
            "connection_id_prefix" => D::ConnectionIdPrefix,
            "use_tcp_fast_open" => D::UseTcpFastOpen,
            "load_balance" => D::LoadBalance,
            "source_route" => D::SourceRoute,
            "server_type" | "server" => D::ServerType,
            "service_name" => D::ServiceName,
            "sid" => D::Sid,
            "https_proxy" => return Some(Self::Address(AddressField::HttpsProxy)),
            "https_proxy_port" => return Some(Self::Address(AddressField::HttpsProxyPort)),
            "failover" => return Some(Self::List(ListField::Failover)),
            _ => return None,
        };
        Some(Self::Description(description))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn text(field: &str, value: &str) -> Result<Option<String>> {
    validate_text(field, value)?;
    Ok(non_empty(value))
}
