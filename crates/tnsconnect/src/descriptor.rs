//! Connect descriptor data model.
//!
//! A [`DescriptionList`] owns one or more [`Description`]s, each of which owns
//! one or more [`Address`]es. Order is significant at both levels: it is the
//! order in which the transport layer tries endpoints unless load balancing
//! shuffles them at connect time.

use serde::Serialize;

use crate::constants::{
    DEFAULT_PORT, DEFAULT_RETRY_DELAY, DEFAULT_SDU, DEFAULT_TCP_CONNECT_TIMEOUT, MAX_SDU, MIN_SDU,
};
use crate::types::{PoolBoundary, Protocol, Purity, ServerType, SslVersion};

/// A single network endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub https_proxy: Option<String>,
    /// Only meaningful when `https_proxy` is set.
    pub https_proxy_port: u16,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            protocol: Protocol::Tcp,
            host: String::new(),
            port: DEFAULT_PORT,
            https_proxy: None,
            https_proxy_port: 0,
        }
    }
}

impl Address {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }
}

/// Service-level settings and the addresses that reach the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Description {
    pub addresses: Vec<Address>,
    pub service_name: Option<String>,
    pub sid: Option<String>,
    pub server_type: Option<ServerType>,
    /// DRCP connection class.
    pub cclass: Option<String>,
    /// Inert unless `cclass` is set.
    pub purity: Purity,
    sdu: u32,
    pub retry_count: u32,
    pub retry_delay: u32,
    /// Seconds.
    pub tcp_connect_timeout: f64,
    pub ssl_server_dn_match: bool,
    pub ssl_server_cert_dn: Option<String>,
    pub ssl_version: Option<SslVersion>,
    pub wallet_location: Option<String>,
    pub pool_boundary: Option<PoolBoundary>,
    /// Minutes between keepalive probes, zero disables them.
    pub expire_time: u32,
    pub use_tcp_fast_open: bool,
    pub connection_id_prefix: Option<String>,
    /// Shuffle `addresses` at connect time.
    pub load_balance: bool,
    pub source_route: bool,
}

impl Default for Description {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            service_name: None,
            sid: None,
            server_type: None,
            cclass: None,
            purity: Purity::Default,
            sdu: DEFAULT_SDU,
            retry_count: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            tcp_connect_timeout: DEFAULT_TCP_CONNECT_TIMEOUT,
            ssl_server_dn_match: true,
            ssl_server_cert_dn: None,
            ssl_version: None,
            wallet_location: None,
            pool_boundary: None,
            expire_time: 0,
            use_tcp_fast_open: false,
            connection_id_prefix: None,
            load_balance: false,
            source_route: false,
        }
    }
}

impl Description {
    /// Requested session data unit size.
    #[must_use]
    pub const fn sdu(&self) -> u32 {
        self.sdu
    }

    /// Store the requested SDU, clamped to the supported range.
    pub fn set_sdu(&mut self, sdu: u32) {
        self.sdu = sdu.clamp(MIN_SDU, MAX_SDU);
    }

    /// Template copy without addresses, used to seed parsed descriptions.
    #[must_use]
    pub(crate) fn template(&self) -> Self {
        Self {
            addresses: Vec::new(),
            ..self.clone()
        }
    }
}

/// Ordered failover/load-balancing group of descriptions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionList {
    pub descriptions: Vec<Description>,
    /// Shuffle `descriptions` at connect time.
    pub load_balance: bool,
    /// Try the next description when one fails.
    pub failover: bool,
    pub source_route: bool,
}

impl Default for DescriptionList {
    fn default() -> Self {
        Self {
            descriptions: Vec::new(),
            load_balance: false,
            failover: true,
            source_route: false,
        }
    }
}

impl DescriptionList {
    /// List holding a single description.
    #[must_use]
    pub fn single(description: Description) -> Self {
        Self {
            descriptions: vec![description],
            ..Self::default()
        }
    }

    /// All addresses across all descriptions, in try order.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.descriptions.iter().flat_map(|d| d.addresses.iter())
    }

    pub(crate) fn addresses_mut(&mut self) -> impl Iterator<Item = &mut Address> {
        self.descriptions
            .iter_mut()
            .flat_map(|d| d.addresses.iter_mut())
    }

    /// Total number of addresses across all descriptions.
    #[must_use]
    pub fn address_count(&self) -> usize {
        self.descriptions.iter().map(|d| d.addresses.len()).sum()
    }

    /// Whether any list-level flag differs from its default.
    #[must_use]
    pub(crate) const fn has_list_options(&self) -> bool {
        self.load_balance || !self.failover || self.source_route
    }
}
