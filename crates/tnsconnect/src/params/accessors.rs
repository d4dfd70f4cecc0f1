//! Read access to the resolved parameters.
//!
//! Session fields are returned as stored. Description- and address-level
//! fields are flattened into a [`OneOrMany`].

use std::path::Path;

use super::{
    AccessToken, AppContext, ConnectParams, OneOrMany, Secret, ShardingValue, SslContext,
};
use crate::descriptor::{Address, Description, DescriptionList};
use crate::types::{AuthMode, PoolBoundary, Protocol, Purity, ServerType, SslVersion};

macro_rules! description_accessors {
    ($($(#[$doc:meta])* $field:ident: $ty:ty => |$d:ident| $read:expr;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $field(&self) -> OneOrMany<$ty> {
                self.per_description(|$d| $read)
            }
        )+
    };
}

macro_rules! address_accessors {
    ($($field:ident: $ty:ty => |$a:ident| $read:expr;)+) => {
        $(
            #[must_use]
            pub fn $field(&self) -> OneOrMany<$ty> {
                self.per_address(|$a| $read)
            }
        )+
    };
}

impl ConnectParams {
    #[must_use]
    pub const fn description_list(&self) -> &DescriptionList {
        &self.description_list
    }

    fn per_description<T>(&self, read: impl Fn(&Description) -> T) -> OneOrMany<T> {
        OneOrMany::from_vec(self.description_list.descriptions.iter().map(read).collect())
    }

    fn per_address<T>(&self, read: impl Fn(&Address) -> T) -> OneOrMany<T> {
        OneOrMany::from_vec(self.description_list.addresses().map(read).collect())
    }

    description_accessors! {
        service_name: Option<String> => |d| d.service_name.clone();
        sid: Option<String> => |d| d.sid.clone();
        server_type: Option<ServerType> => |d| d.server_type;
        /// DRCP connection class.
        cclass: Option<String> => |d| d.cclass.clone();
        purity: Purity => |d| d.purity;
        sdu: u32 => |d| d.sdu();
        retry_count: u32 => |d| d.retry_count;
        retry_delay: u32 => |d| d.retry_delay;
        /// Seconds.
        tcp_connect_timeout: f64 => |d| d.tcp_connect_timeout;
        ssl_server_dn_match: bool => |d| d.ssl_server_dn_match;
        ssl_server_cert_dn: Option<String> => |d| d.ssl_server_cert_dn.clone();
        ssl_version: Option<SslVersion> => |d| d.ssl_version;
        wallet_location: Option<String> => |d| d.wallet_location.clone();
        pool_boundary: Option<PoolBoundary> => |d| d.pool_boundary;
        expire_time: u32 => |d| d.expire_time;
        use_tcp_fast_open: bool => |d| d.use_tcp_fast_open;
        connection_id_prefix: Option<String> => |d| d.connection_id_prefix.clone();
    }

    address_accessors! {
        protocol: Protocol => |a| a.protocol;
        host: String => |a| a.host.clone();
        port: u16 => |a| a.port;
        https_proxy: Option<String> => |a| a.https_proxy.clone();
        https_proxy_port: u16 => |a| a.https_proxy_port;
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    #[must_use]
    pub fn proxy_user(&self) -> Option<&str> {
        self.proxy_user.as_deref()
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(Secret::expose)
    }

    #[must_use]
    pub fn newpassword(&self) -> Option<&str> {
        self.newpassword.as_ref().map(Secret::expose)
    }

    #[must_use]
    pub fn wallet_password(&self) -> Option<&str> {
        self.wallet_password.as_ref().map(Secret::expose)
    }

    #[must_use]
    pub const fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    #[must_use]
    pub const fn externalauth(&self) -> bool {
        self.externalauth
    }

    /// Administrative privilege requested at logon.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    #[must_use]
    pub const fn stmtcachesize(&self) -> u32 {
        self.stmtcachesize
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub const fn matchanytag(&self) -> bool {
        self.matchanytag
    }

    #[must_use]
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    #[must_use]
    pub fn appcontext(&self) -> &[AppContext] {
        &self.appcontext
    }

    #[must_use]
    pub fn shardingkey(&self) -> &[ShardingValue] {
        &self.shardingkey
    }

    #[must_use]
    pub fn supershardingkey(&self) -> &[ShardingValue] {
        &self.supershardingkey
    }

    #[must_use]
    pub fn debug_jdwp(&self) -> Option<&str> {
        self.debug_jdwp.as_deref()
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn machine(&self) -> &str {
        &self.machine
    }

    #[must_use]
    pub fn terminal(&self) -> &str {
        &self.terminal
    }

    #[must_use]
    pub fn osuser(&self) -> &str {
        &self.osuser
    }

    #[must_use]
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// Native connection handle, zero when unset.
    #[must_use]
    pub const fn handle(&self) -> u64 {
        self.handle
    }

    #[must_use]
    pub const fn ssl_context(&self) -> Option<&SslContext> {
        self.ssl_context.as_ref()
    }

    #[must_use]
    pub fn edition(&self) -> Option<&str> {
        self.edition.as_deref()
    }

    #[must_use]
    pub const fn events(&self) -> bool {
        self.events
    }

    #[must_use]
    pub const fn disable_oob(&self) -> bool {
        self.disable_oob
    }
}
