//! Canonical connect descriptor output.

use std::fmt::Write;

use crate::descriptor::{Address, Description, DescriptionList};
use crate::types::Purity;

/// Render a description list as a name-value connect descriptor.
///
/// The `DESCRIPTION_LIST` wrapper appears only for several descriptions or
/// non-default list flags. Description fields equal to their defaults are
/// left out; protocol, host and port are always written. Values with spaces,
/// parentheses or `=` are double-quoted. The grammar has no escape for `"`
/// itself, so [`ConnectParams`](crate::ConnectParams) rejects values holding
/// one.
///
/// # Example
///
/// ```rust
/// use tnsconnect::{Address, Description, DescriptionList, to_connect_string};
///
/// let mut description = Description::default();
/// description.addresses.push(Address::new("dbhost", 1521));
/// description.service_name = Some("orclpdb".into());
///
/// assert_eq!(
///     to_connect_string(&DescriptionList::single(description)),
///     "(DESCRIPTION=(ADDRESS_LIST=(ADDRESS=(PROTOCOL=tcp)(HOST=dbhost)(PORT=1521)))\
///      (CONNECT_DATA=(SERVICE_NAME=orclpdb)))"
/// );
/// ```
#[must_use]
pub fn to_connect_string(list: &DescriptionList) -> String {
    let mut out = String::new();
    let wrap = list.descriptions.len() > 1 || list.has_list_options();

    if wrap {
        out.push_str("(DESCRIPTION_LIST=");
        if list.load_balance {
            out.push_str("(LOAD_BALANCE=ON)");
        }
        if !list.failover {
            out.push_str("(FAILOVER=OFF)");
        }
        if list.source_route {
            out.push_str("(SOURCE_ROUTE=ON)");
        }
    }
    for description in &list.descriptions {
        write_description(&mut out, description);
    }
    if wrap {
        out.push(')');
    }
    out
}

fn write_description(out: &mut String, description: &Description) {
    let defaults = Description::default();

    out.push_str("(DESCRIPTION=");
    if description.load_balance {
        out.push_str("(LOAD_BALANCE=ON)");
    }
    if description.source_route {
        out.push_str("(SOURCE_ROUTE=ON)");
    }
    if description.retry_count != defaults.retry_count {
        push_pair(out, "RETRY_COUNT", &description.retry_count.to_string());
    }
    if description.retry_delay != defaults.retry_delay {
        push_pair(out, "RETRY_DELAY", &description.retry_delay.to_string());
    }
    if description.sdu() != defaults.sdu() {
        push_pair(out, "SDU", &description.sdu().to_string());
    }
    if description
        .tcp_connect_timeout
        .total_cmp(&defaults.tcp_connect_timeout)
        .is_ne()
    {
        push_pair(
            out,
            "TRANSPORT_CONNECT_TIMEOUT",
            &description.tcp_connect_timeout.to_string(),
        );
    }
    if description.expire_time != defaults.expire_time {
        push_pair(out, "EXPIRE_TIME", &description.expire_time.to_string());
    }
    if description.use_tcp_fast_open {
        out.push_str("(USE_TCP_FAST_OPEN=ON)");
    }

    out.push_str("(ADDRESS_LIST=");
    for address in &description.addresses {
        write_address(out, address);
    }
    out.push(')');

    write_group(out, "CONNECT_DATA", &connect_data(description));
    write_group(out, "SECURITY", &security(description));
    out.push(')');
}

fn write_address(out: &mut String, address: &Address) {
    out.push_str("(ADDRESS=");
    push_pair(out, "PROTOCOL", address.protocol.as_str());
    push_pair(out, "HOST", &address.host);
    push_pair(out, "PORT", &address.port.to_string());
    if let Some(proxy) = &address.https_proxy {
        push_pair(out, "HTTPS_PROXY", proxy);
    }
    if address.https_proxy_port != 0 {
        push_pair(out, "HTTPS_PROXY_PORT", &address.https_proxy_port.to_string());
    }
    out.push(')');
}

fn connect_data(description: &Description) -> Vec<(&'static str, String)> {
    let mut items = Vec::new();
    if let Some(service_name) = &description.service_name {
        items.push(("SERVICE_NAME", service_name.clone()));
    }
    if let Some(sid) = &description.sid {
        items.push(("SID", sid.clone()));
    }
    if let Some(server_type) = description.server_type {
        items.push(("SERVER", server_type.as_str().to_ascii_uppercase()));
    }
    if let Some(cclass) = &description.cclass {
        items.push(("POOL_CONNECTION_CLASS", cclass.clone()));
    }
    if description.purity != Purity::Default {
        items.push(("POOL_PURITY", description.purity.as_str().to_ascii_uppercase()));
    }
    if let Some(boundary) = description.pool_boundary {
        items.push(("POOL_BOUNDARY", boundary.as_str().to_ascii_uppercase()));
    }
    if let Some(prefix) = &description.connection_id_prefix {
        items.push(("CONNECTION_ID_PREFIX", prefix.clone()));
    }
    items
}

fn security(description: &Description) -> Vec<(&'static str, String)> {
    let mut items = Vec::new();
    if !description.ssl_server_dn_match {
        items.push(("SSL_SERVER_DN_MATCH", "OFF".to_string()));
    }
    if let Some(dn) = &description.ssl_server_cert_dn {
        items.push(("SSL_SERVER_CERT_DN", dn.clone()));
    }
    if let Some(version) = description.ssl_version {
        items.push(("SSL_VERSION", version.as_str().to_string()));
    }
    if let Some(location) = &description.wallet_location {
        items.push(("MY_WALLET_DIRECTORY", location.clone()));
    }
    items
}

fn write_group(out: &mut String, name: &str, items: &[(&'static str, String)]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "({name}=");
    for (key, value) in items {
        push_pair(out, key, value);
    }
    out.push(')');
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    if needs_quotes(value) {
        let _ = write!(out, "({key}=\"{value}\")");
    } else {
        let _ = write!(out, "({key}={value})");
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty() || value.contains(|c: char| c.is_whitespace() || "()=".contains(c))
}
