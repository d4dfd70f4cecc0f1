//! Easy Connect grammar.
//!
//! ```text
//! [protocol://]host[:port][,host[:port]...][/service_name][:server_type][?key=value[&key=value...]]
//! ```
//!
//! A bare leading `//` is accepted. IPv6 hosts are written in brackets. Hosts
//! without a port take the next port given to their right, or the template
//! port when none follows.

use super::ParseContext;
use super::credentials::unquote;
use super::fields::{DescriptionField, EasyConnectKey};
use crate::constants::PYO_PREFIX;
use crate::descriptor::{Address, DescriptionList};
use crate::error::ConnectParamsError;
use crate::params::ParamName;
use crate::types::{Protocol, parse_port};
use crate::Result;

/// Result of parsing an Easy Connect string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EasyConnect {
    pub description_list: DescriptionList,
    /// `pyo.<name>=value` query entries, in input order.
    pub driver_options: Vec<(ParamName, String)>,
}

pub(crate) fn parse(input: &str, ctx: &ParseContext<'_>) -> Result<EasyConnect> {
    let (main, query) = match input.find('?') {
        Some(pos) => (&input[..pos], Some((pos + 1, &input[pos + 1..]))),
        None => (input, None),
    };

    let (protocol, mut offset) = match main.find("://") {
        Some(pos) => (Some(main[..pos].parse::<Protocol>()?), pos + 3),
        None if main.starts_with("//") => (None, 2),
        None => (None, 0),
    };

    let rest = &main[offset..];
    let (host_spec, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };

    let mut description = ctx.description_template.template();
    description.addresses = parse_hosts(host_spec, offset, ctx.address_template)?;
    if let Some(protocol) = protocol {
        for address in &mut description.addresses {
            address.protocol = protocol;
        }
    }
    offset += host_spec.len() + 1;

    if let Some(path) = path {
        if let Some(pos) = path.find('/') {
            return Err(ConnectParamsError::parse(
                offset + pos,
                "unexpected \"/\" after the service name",
            ));
        }
        let (service, server_type) = match path.split_once(':') {
            Some((service, server_type)) => (service, Some(server_type)),
            None => (path, None),
        };
        DescriptionField::ServiceName.apply(&mut description, service)?;
        if let Some(server_type) = server_type {
            DescriptionField::ServerType.apply(&mut description, server_type)?;
        }
    }

    let mut list = DescriptionList::single(description);
    let mut driver_options = Vec::new();
    if let Some((start, query)) = query {
        apply_query(query, start, &mut list, &mut driver_options)?;
    }

    Ok(EasyConnect {
        description_list: list,
        driver_options,
    })
}

fn parse_hosts(spec: &str, offset: usize, template: &Address) -> Result<Vec<Address>> {
    let mut entries: Vec<(String, Option<u16>)> = Vec::new();
    let mut position = offset;

    for entry in spec.split(',') {
        let (host, port) = split_host_port(entry, position)?;
        if host.is_empty() {
            return Err(ConnectParamsError::parse(position, "missing host name"));
        }
        if let Some(bad) = host.find(|c: char| c.is_whitespace() || "()@=\"".contains(c)) {
            return Err(ConnectParamsError::parse(
                position + bad,
                format!("invalid character in host name \"{host}\""),
            ));
        }
        entries.push((host.to_string(), port));
        position += entry.len() + 1;
    }

    let mut next_port = template.port;
    let mut addresses: Vec<Address> = entries
        .into_iter()
        .rev()
        .map(|(host, port)| {
            if let Some(port) = port {
                next_port = port;
            }
            Address {
                host,
                port: next_port,
                ..template.clone()
            }
        })
        .collect();
    addresses.reverse();
    Ok(addresses)
}

fn split_host_port(entry: &str, position: usize) -> Result<(&str, Option<u16>)> {
    let entry = entry.trim();
    let (host, port) = if let Some(bracketed) = entry.strip_prefix('[') {
        let close = bracketed
            .find(']')
            .ok_or_else(|| ConnectParamsError::parse(position, "unterminated \"[\" in host"))?;
        let after = &bracketed[close + 1..];
        let port = match after.strip_prefix(':') {
            Some(port) => Some(port),
            None if after.is_empty() => None,
            None => {
                return Err(ConnectParamsError::parse(
                    position + close + 2,
                    "expected \":\" after \"]\"",
                ));
            }
        };
        (&bracketed[..close], port)
    } else {
        match entry.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (entry, None),
        }
    };

    let port = port.map(|p| parse_port("port", p)).transpose()?;
    Ok((host, port))
}

fn apply_query(
    query: &str,
    start: usize,
    list: &mut DescriptionList,
    driver_options: &mut Vec<(ParamName, String)>,
) -> Result<()> {
    let mut position = start;
    for pair in query.split('&') {
        if pair.trim().is_empty() {
            position += pair.len() + 1;
            continue;
        }
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            ConnectParamsError::parse(position, format!("missing \"=\" in \"{pair}\""))
        })?;
        let key = key.trim().to_ascii_lowercase();
        let value = unquote(value);

        if let Some(name) = key.strip_prefix(PYO_PREFIX) {
            let name = name.parse::<ParamName>().map_err(|_| {
                ConnectParamsError::parse(position, format!("unknown parameter \"{key}\""))
            })?;
            driver_options.push((name, value.to_string()));
        } else {
            match EasyConnectKey::lookup(&key) {
                Some(EasyConnectKey::Description(field)) => {
                    for description in &mut list.descriptions {
                        field.apply(description, value)?;
                    }
                }
                Some(EasyConnectKey::Address(field)) => {
                    for address in list.addresses_mut() {
                        field.apply(address, value)?;
                    }
                }
                Some(EasyConnectKey::List(field)) => field.apply(list, value)?,
                None => {
                    return Err(ConnectParamsError::parse(
                        position,
                        format!("unknown Easy Connect parameter \"{key}\""),
                    ));
                }
            }
        }
        position += pair.len() + 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Description;
    use crate::types::ServerType;

    fn parse_default(input: &str) -> Result<EasyConnect> {
        let description = Description::default();
        let address = Address::default();
        parse(input, &ParseContext::new(&description, &address))
    }

    #[test]
    fn test_host_port_service() {
        let parsed = parse_default("dbhost:1522/orclpdb").unwrap();
        let description = &parsed.description_list.descriptions[0];
        assert_eq!(description.addresses.len(), 1);
        assert_eq!(description.addresses[0].host, "dbhost");
        assert_eq!(description.addresses[0].port, 1522);
        assert_eq!(description.service_name.as_deref(), Some("orclpdb"));
    }

    #[test]
    fn test_host_only_uses_default_port() {
        let parsed = parse_default("dbhost").unwrap();
        let description = &parsed.description_list.descriptions[0];
        assert_eq!(description.addresses[0].port, 1521);
        assert!(description.service_name.is_none());
    }

    #[test]
    fn test_protocol_and_query() {
        let parsed =
            parse_default("tcps://dbhost:2484/orcl.example.com?expire_time=2&SDU=16384").unwrap();
        let description = &parsed.description_list.descriptions[0];
        assert_eq!(description.addresses[0].protocol, Protocol::Tcps);
        assert_eq!(description.expire_time, 2);
        assert_eq!(description.sdu(), 16384);
    }

    #[test]
    fn test_leading_double_slash() {
        let parsed = parse_default("//dbhost/svc").unwrap();
        assert_eq!(parsed.description_list.descriptions[0].addresses[0].host, "dbhost");
    }

    #[test]
    fn test_server_type_suffix() {
        let parsed = parse_default("dbhost/svc:pooled").unwrap();
        let description = &parsed.description_list.descriptions[0];
        assert_eq!(description.service_name.as_deref(), Some("svc"));
        assert_eq!(description.server_type, Some(ServerType::Pooled));
    }

    #[test]
    fn test_multiple_hosts_share_following_port() {
        let parsed = parse_default("h1,h2:1600,h3/svc").unwrap();
        let ports: Vec<(&str, u16)> = parsed.description_list.descriptions[0]
            .addresses
            .iter()
            .map(|a| (a.host.as_str(), a.port))
            .collect();
        assert_eq!(ports, [("h1", 1600), ("h2", 1600), ("h3", 1521)]);
    }

    #[test]
    fn test_ipv6_host() {
        let parsed = parse_default("[::1]:1530/svc").unwrap();
        let address = &parsed.description_list.descriptions[0].addresses[0];
        assert_eq!(address.host, "::1");
        assert_eq!(address.port, 1530);
    }

    #[test]
    fn test_unknown_query_key() {
        let err = parse_default("dbhost/svc?colour=blue").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.position(), Some(11));
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_query_key_without_value() {
        let err = parse_default("dbhost/svc?retry_count").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_invalid_protocol() {
        let err = parse_default("udp://dbhost/svc").unwrap_err();
        assert!(err.is_invalid_field_value());
        assert_eq!(err.field(), Some("protocol"));
    }

    #[test]
    fn test_invalid_port() {
        let err = parse_default("dbhost:abc/svc").unwrap_err();
        assert_eq!(err.field(), Some("port"));
    }

    #[test]
    fn test_missing_host() {
        let err = parse_default(":1521/svc").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn test_driver_options() {
        let parsed = parse_default("dbhost/svc?pyo.stmtcachesize=50&pyo.program=etl").unwrap();
        assert_eq!(
            parsed.driver_options,
            [
                (ParamName::Stmtcachesize, "50".to_string()),
                (ParamName::Program, "etl".to_string())
            ]
        );
    }

    #[test]
    fn test_unknown_driver_option() {
        let err = parse_default("dbhost/svc?pyo.colour=1").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_proxy_and_failover_keys() {
        let parsed =
            parse_default("tcps://h1,h2/svc?https_proxy=proxy&https_proxy_port=80&failover=off")
                .unwrap();
        let list = &parsed.description_list;
        assert!(!list.failover);
        for address in list.addresses() {
            assert_eq!(address.https_proxy.as_deref(), Some("proxy"));
            assert_eq!(address.https_proxy_port, 80);
            assert_eq!(address.protocol, Protocol::Tcps);
        }
    }

    #[test]
    fn test_quoted_query_value() {
        let parsed = parse_default("dbhost/svc?ssl_server_cert_dn=\"CN=db,O=Example\"").unwrap();
        let description = &parsed.description_list.descriptions[0];
        assert_eq!(
            description.ssl_server_cert_dn.as_deref(),
            Some("CN=db,O=Example")
        );
    }

    #[test]
    fn test_embedded_quote_rejected() {
        let err = parse_default("dbhost/svc?ssl_server_cert_dn=CN=\"db\"").unwrap_err();
        assert!(err.is_invalid_field_value());
        assert_eq!(err.field(), Some("ssl_server_cert_dn"));
    }
}
