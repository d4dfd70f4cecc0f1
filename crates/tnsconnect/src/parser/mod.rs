//! Connect string parsing.
//!
//! A connect string is, after an optional `user/password@` prefix, one of:
//!
//! - a name-value descriptor, when it starts with `(`
//! - an alias, when it is a bare word defined in the alias table
//! - an Easy Connect string otherwise
//!
//! Aliases expand to descriptor text which is parsed again, up to
//! [`MAX_ALIAS_DEPTH`] levels.

mod credentials;
mod easy_connect;
mod fields;
mod name_value;

pub use credentials::parse_dsn_with_credentials;
pub(crate) use credentials::{Credentials, split_proxy_user};

use tracing::debug;

use crate::alias::{AliasSource, is_alias_candidate};
use crate::constants::MAX_ALIAS_DEPTH;
use crate::descriptor::{Address, Description, DescriptionList};
use crate::error::ConnectParamsError;
use crate::params::ParamName;
use crate::Result;

/// Templates and collaborators a parse runs against.
#[derive(Clone, Copy)]
pub(crate) struct ParseContext<'a> {
    pub description_template: &'a Description,
    pub address_template: &'a Address,
    pub aliases: Option<&'a dyn AliasSource>,
}

impl<'a> ParseContext<'a> {
    pub(crate) const fn new(
        description_template: &'a Description,
        address_template: &'a Address,
    ) -> Self {
        Self {
            description_template,
            address_template,
            aliases: None,
        }
    }

    #[must_use]
    pub(crate) const fn with_aliases(mut self, aliases: &'a dyn AliasSource) -> Self {
        self.aliases = Some(aliases);
        self
    }
}

impl std::fmt::Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("description_template", self.description_template)
            .field("address_template", self.address_template)
            .field("aliases", &self.aliases.is_some())
            .finish()
    }
}

/// Everything a connect string contributes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedConnectString {
    pub description_list: DescriptionList,
    pub credentials: Credentials,
    /// `pyo.<name>` Easy Connect options, in input order.
    pub driver_options: Vec<(ParamName, String)>,
}

pub(crate) fn parse_connect_string(
    input: &str,
    ctx: &ParseContext<'_>,
) -> Result<ParsedConnectString> {
    let leading = input.len() - input.trim_start().len();
    let (credentials, rest, offset) = credentials::split_credentials(input.trim())?;
    let (description_list, driver_options) = dispatch(rest, offset + leading, ctx, 0)?;

    Ok(ParsedConnectString {
        description_list,
        credentials,
        driver_options,
    })
}

fn dispatch(
    input: &str,
    offset: usize,
    ctx: &ParseContext<'_>,
    depth: usize,
) -> Result<(DescriptionList, Vec<(ParamName, String)>)> {
    let trimmed = input.trim();
    let offset = offset + (input.len() - input.trim_start().len());

    if trimmed.is_empty() {
        return Err(ConnectParamsError::parse(offset, "empty connect string"));
    }

    if is_alias_candidate(trimmed)
        && let Some(aliases) = ctx.aliases
        && let Some(descriptor) = aliases.descriptor(trimmed)?
    {
        if depth >= MAX_ALIAS_DEPTH {
            return Err(ConnectParamsError::parse(
                offset,
                format!(
                    "alias \"{trimmed}\" nests deeper than {MAX_ALIAS_DEPTH} levels, \
                     probably an alias cycle"
                ),
            ));
        }
        debug!(alias = trimmed, depth, "expanding alias");
        return dispatch(&descriptor, 0, ctx, depth + 1);
    }

    if trimmed.starts_with('(') {
        debug!("parsing name-value descriptor");
        let list = name_value::parse(trimmed, ctx).map_err(|e| e.offset_by(offset))?;
        Ok((list, Vec::new()))
    } else {
        debug!("parsing Easy Connect string");
        let parsed = easy_connect::parse(trimmed, ctx).map_err(|e| e.offset_by(offset))?;
        Ok((parsed.description_list, parsed.driver_options))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::Protocol;

    struct MapAliases(HashMap<String, String>);

    impl MapAliases {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_ascii_uppercase(), (*v).to_string()))
                    .collect(),
            )
        }
    }

    impl AliasSource for MapAliases {
        fn descriptor(&self, alias: &str) -> Result<Option<String>> {
            Ok(self.0.get(&alias.to_ascii_uppercase()).cloned())
        }
    }

    fn parse_with(input: &str, aliases: &MapAliases) -> Result<ParsedConnectString> {
        let description = Description::default();
        let address = Address::default();
        let ctx = ParseContext::new(&description, &address).with_aliases(aliases);
        parse_connect_string(input, &ctx)
    }

    #[test]
    fn test_dispatch_easy_connect() {
        let parsed = parse_with("dbhost:1521/svc", &MapAliases::new(&[])).unwrap();
        assert_eq!(parsed.description_list.descriptions.len(), 1);
        assert!(parsed.credentials.is_empty());
    }

    #[test]
    fn test_dispatch_descriptor_with_credentials() {
        let parsed = parse_with(
            "scott/tiger@(DESCRIPTION=(ADDRESS=(PROTOCOL=TCPS)(HOST=h)(PORT=2484)))",
            &MapAliases::new(&[]),
        )
        .unwrap();
        assert_eq!(parsed.credentials.user.as_deref(), Some("scott"));
        let address = parsed.description_list.addresses().next().unwrap();
        assert_eq!(address.protocol, Protocol::Tcps);
    }

    #[test]
    fn test_alias_expansion() {
        let aliases = MapAliases::new(&[("sales", "(DESCRIPTION=(ADDRESS=(HOST=s)(PORT=1)))")]);
        let parsed = parse_with("Sales", &aliases).unwrap();
        assert_eq!(parsed.description_list.addresses().next().unwrap().host, "s");
    }

    #[test]
    fn test_nested_alias() {
        let aliases = MapAliases::new(&[("outer", "inner"), ("inner", "dbhost/svc")]);
        let parsed = parse_with("outer", &aliases).unwrap();
        let description = &parsed.description_list.descriptions[0];
        assert_eq!(description.service_name.as_deref(), Some("svc"));
    }

    #[test]
    fn test_alias_cycle() {
        let aliases = MapAliases::new(&[("a", "b"), ("b", "a")]);
        let err = parse_with("a", &aliases).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_unknown_bare_word_is_host() {
        let parsed = parse_with("dbhost", &MapAliases::new(&[])).unwrap();
        assert_eq!(parsed.description_list.addresses().next().unwrap().host, "dbhost");
    }

    #[test]
    fn test_error_position_includes_credentials() {
        let err = parse_with("u/p@dbhost/svc?bogus=1", &MapAliases::new(&[])).unwrap_err();
        assert_eq!(err.position(), Some(15));
    }

    #[test]
    fn test_empty_connect_string() {
        let err = parse_with("scott/tiger@", &MapAliases::new(&[])).unwrap_err();
        assert!(err.is_parse());
    }
}
