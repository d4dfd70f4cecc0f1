//! Merge and precedence engine.
//!
//! [`ConnectParams`] holds the resolved parameter set. Sources are applied in
//! increasing precedence:
//!
//! 1. [`Defaults`]
//! 2. alias descriptors and connect strings ([`ConnectParams::parse_connect_string`])
//! 3. configuration objects ([`ConnectParams::set_from_config`])
//! 4. keyword parameters ([`ConnectParams::set`])
//!
//! Each stage overwrites only the fields it specifies. Every mutating call is
//! all-or-nothing: on error the instance is left exactly as it was.

mod accessors;
mod config;
mod names;
mod one_or_many;
mod update;
mod values;

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

pub use config::{CloudConfig, PasswordSource, SecretResolver, TextSecretResolver};
pub use names::{ParamName, ParamScope};
pub use one_or_many::OneOrMany;
pub use update::ParamsUpdate;
pub use values::{AccessToken, AppContext, Secret, ShardingValue, SslContext};

use crate::alias::{self, ConfigDirAliases};
use crate::defaults::Defaults;
use crate::descriptor::{Address, Description, DescriptionList};
use crate::error::ConnectParamsError;
use crate::parser::{self, ParseContext, split_proxy_user};
use crate::serialize::to_connect_string;
use crate::types::{AuthMode, DriverMode};
use crate::Result;

/// Inputs for [`ConnectParams::resolve`], applied in field order.
#[derive(Debug, Clone, Default)]
pub struct Sources<'a> {
    pub connect_string: Option<&'a str>,
    pub config: Option<&'a CloudConfig>,
    pub update: Option<ParamsUpdate>,
}

/// Resolved connect parameters.
///
/// A new instance holds one description with one address, both built from
/// library defaults. Values given to [`set`](Self::set) are also stored in a
/// description template and an address template, so descriptions and
/// addresses created by a later parse start from them.
///
/// # Example
///
/// ```rust
/// use tnsconnect::{ConnectParams, Defaults, OneOrMany, ParamsUpdate};
///
/// let mut params = ConnectParams::new(Defaults::default());
/// params.parse_connect_string("dbhost:1522/orclpdb")?;
/// params.set(ParamsUpdate::new().user("scott").retry_count(2))?;
///
/// assert_eq!(params.host(), OneOrMany::Scalar("dbhost".to_string()));
/// assert_eq!(params.port(), OneOrMany::Scalar(1522));
/// assert_eq!(params.retry_count(), OneOrMany::Scalar(2));
/// assert_eq!(params.user(), Some("scott"));
/// # Ok::<(), tnsconnect::ConnectParamsError>(())
/// ```
#[derive(Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ConnectParams {
    defaults: Defaults,
    user: Option<String>,
    proxy_user: Option<String>,
    password: Option<Secret>,
    newpassword: Option<Secret>,
    wallet_password: Option<Secret>,
    access_token: Option<AccessToken>,
    externalauth: bool,
    mode: AuthMode,
    stmtcachesize: u32,
    tag: Option<String>,
    matchanytag: bool,
    config_dir: Option<PathBuf>,
    appcontext: Vec<AppContext>,
    shardingkey: Vec<ShardingValue>,
    supershardingkey: Vec<ShardingValue>,
    debug_jdwp: Option<String>,
    program: String,
    machine: String,
    terminal: String,
    osuser: String,
    driver_name: String,
    handle: u64,
    ssl_context: Option<SslContext>,
    edition: Option<String>,
    events: bool,
    disable_oob: bool,
    default_description: Description,
    default_address: Address,
    description_list: DescriptionList,
}

impl ConnectParams {
    #[must_use]
    pub fn new(defaults: Defaults) -> Self {
        let default_description = Description::default();
        let default_address = Address::default();
        let mut description = default_description.clone();
        description.addresses.push(default_address.clone());

        Self {
            user: None,
            proxy_user: None,
            password: None,
            newpassword: None,
            wallet_password: None,
            access_token: None,
            externalauth: false,
            mode: AuthMode::Default,
            stmtcachesize: defaults.stmtcachesize,
            tag: None,
            matchanytag: false,
            config_dir: defaults.config_dir.clone(),
            appcontext: Vec::new(),
            shardingkey: Vec::new(),
            supershardingkey: Vec::new(),
            debug_jdwp: None,
            program: defaults.program.clone(),
            machine: defaults.machine.clone(),
            terminal: defaults.terminal.clone(),
            osuser: defaults.osuser.clone(),
            driver_name: defaults.driver_name.clone(),
            handle: 0,
            ssl_context: None,
            edition: None,
            events: false,
            disable_oob: false,
            default_description,
            default_address,
            description_list: DescriptionList::single(description),
            defaults,
        }
    }

    /// Build a parameter set from all sources in precedence order.
    ///
    /// A `config_dir` in the update is applied first so that it governs
    /// alias lookup for the connect string and configuration.
    pub fn resolve(defaults: Defaults, sources: Sources<'_>) -> Result<Self> {
        let mut params = Self::new(defaults);
        if let Some(dir) = sources.update.as_ref().and_then(|u| u.config_dir.clone()) {
            params.config_dir = Some(dir);
        }
        if let Some(connect_string) = sources.connect_string {
            params.parse_connect_string(connect_string)?;
        }
        if let Some(config) = sources.config {
            params.set_from_config(config)?;
        }
        if let Some(update) = sources.update {
            params.set(update)?;
        }
        Ok(params)
    }

    /// Apply keyword parameters.
    ///
    /// Description-level values reach every description and the description
    /// template; address-level values every address and the address template.
    ///
    /// # Errors
    ///
    /// Returns `ConfigConflict` when `edition` and `cclass` would both be set,
    /// and `InvalidFieldValue` for out-of-domain values. The instance is left
    /// unchanged on error.
    pub fn set(&mut self, update: ParamsUpdate) -> Result<()> {
        self.transact(|params| params.apply_update(update))
    }

    /// Apply one parameter given by name and text value.
    pub fn set_named(&mut self, name: &str, value: &str) -> Result<()> {
        let name: ParamName = name.parse()?;
        self.set(ParamsUpdate::new().with_text(name, value)?)
    }

    /// Parse a connect string and replace the description list with it.
    ///
    /// Credentials in a `user/password@` prefix are applied as well. Bare
    /// words defined in `tnsnames.ora` of the configured directory are
    /// expanded.
    pub fn parse_connect_string(&mut self, connect_string: &str) -> Result<()> {
        self.transact(|params| params.apply_connect_string(connect_string))
    }

    /// Split `user/password@connect_string` and apply each part present.
    pub fn parse_dsn_with_credentials(&mut self, dsn: &str) -> Result<()> {
        let (user, password, connect_string) = parser::parse_dsn_with_credentials(dsn);
        self.transact(|params| {
            if let Some(user) = user {
                params.apply_user(&user, None)?;
            }
            if let Some(password) = password {
                params.password = Some(Secret::new(password));
            }
            match connect_string {
                Some(connect_string) => params.apply_connect_string(&connect_string),
                None => Ok(()),
            }
        })
    }

    /// Apply a configuration object with inline passwords only.
    pub fn set_from_config(&mut self, config: &CloudConfig) -> Result<()> {
        self.set_from_config_with(config, &TextSecretResolver)
    }

    /// Apply a configuration object, resolving password references through
    /// `resolver`.
    ///
    /// `user` and `password` are taken only when not already set. Unknown
    /// `pyo` keys are skipped.
    pub fn set_from_config_with(
        &mut self,
        config: &CloudConfig,
        resolver: &dyn SecretResolver,
    ) -> Result<()> {
        self.transact(|params| {
            if let Some(descriptor) = &config.connect_descriptor {
                params.apply_connect_string(descriptor)?;
            }
            if params.user.is_none()
                && let Some(user) = &config.user
            {
                params.apply_user(user, None)?;
            }
            if params.password.is_none()
                && let Some(source) = &config.password
            {
                params.password = Some(Secret::new(source.resolve(resolver)?));
            }

            let mut update = ParamsUpdate::new();
            for (key, value) in &config.pyo {
                match key.parse::<ParamName>() {
                    Ok(name) => update = update.with_json(name, value)?,
                    Err(_) => debug!(key = %key, "ignoring unknown configuration parameter"),
                }
            }
            params.apply_update(update)
        })
    }

    /// Independent deep copy.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Canonical connect descriptor for the current description list.
    #[must_use]
    pub fn get_connect_string(&self) -> String {
        to_connect_string(&self.description_list)
    }

    /// All alias names in `tnsnames.ora` of the configured directory.
    ///
    /// # Errors
    ///
    /// Returns `AliasNotFound` when there is no configuration directory or it
    /// holds no alias file.
    pub fn get_network_service_names(&self) -> Result<Vec<String>> {
        alias::network_service_names(self.config_dir.as_deref())
    }

    /// Parameters holding a non-default value that a client in `mode` ignores.
    #[must_use]
    pub fn ignored_fields(&self, mode: DriverMode) -> Vec<ParamName> {
        ParamName::ALL
            .iter()
            .copied()
            .filter(|name| !name.is_supported_in(mode) && self.is_customized(*name))
            .collect()
    }

    fn is_customized(&self, name: ParamName) -> bool {
        let descriptions = || {
            std::iter::once(&self.default_description).chain(&self.description_list.descriptions)
        };
        match name {
            ParamName::WalletPassword => self.wallet_password.is_some(),
            ParamName::DisableOob => self.disable_oob,
            ParamName::ConfigDir => self.config_dir != self.defaults.config_dir,
            ParamName::DebugJdwp => self.debug_jdwp.is_some(),
            ParamName::SslContext => self.ssl_context.is_some(),
            ParamName::UseTcpFastOpen => descriptions().any(|d| d.use_tcp_fast_open),
            ParamName::SslVersion => descriptions().any(|d| d.ssl_version.is_some()),
            ParamName::Program => self.program != self.defaults.program,
            ParamName::Machine => self.machine != self.defaults.machine,
            ParamName::Terminal => self.terminal != self.defaults.terminal,
            ParamName::Osuser => self.osuser != self.defaults.osuser,
            ParamName::Events => self.events,
            ParamName::Tag => self.tag.is_some(),
            ParamName::Matchanytag => self.matchanytag,
            ParamName::Appcontext => !self.appcontext.is_empty(),
            ParamName::Shardingkey => !self.shardingkey.is_empty(),
            ParamName::Supershardingkey => !self.supershardingkey.is_empty(),
            ParamName::Handle => self.handle != 0,
            // honored by both modes
            _ => false,
        }
    }

    fn transact(&mut self, change: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let mut next = self.clone();
        change(&mut next)?;
        next.check_conflicts()?;
        *self = next;
        Ok(())
    }

    fn check_conflicts(&self) -> Result<()> {
        let has_cclass = self.default_description.cclass.is_some()
            || self
                .description_list
                .descriptions
                .iter()
                .any(|d| d.cclass.is_some());
        if self.edition.is_some() && has_cclass {
            return Err(ConnectParamsError::config_conflict("edition", "cclass"));
        }
        Ok(())
    }

    fn apply_user(&mut self, user: &str, proxy_user: Option<&str>) -> Result<()> {
        let (user, embedded_proxy) = split_proxy_user(user)?;
        self.user = user;
        if proxy_user.is_none() && embedded_proxy.is_some() {
            self.proxy_user = embedded_proxy;
        }
        Ok(())
    }

    fn apply_connect_string(&mut self, connect_string: &str) -> Result<()> {
        let aliases = ConfigDirAliases::new(self.config_dir.as_deref());
        let ctx = ParseContext::new(&self.default_description, &self.default_address)
            .with_aliases(&aliases);
        let parsed = parser::parse_connect_string(connect_string, &ctx)?;
        debug!(
            descriptions = parsed.description_list.descriptions.len(),
            addresses = parsed.description_list.address_count(),
            "parsed connect string"
        );

        self.description_list = parsed.description_list;
        let credentials = parsed.credentials;
        if let Some(user) = credentials.user {
            self.user = Some(user);
        }
        if credentials.proxy_user.is_some() {
            self.proxy_user = credentials.proxy_user;
        }
        if let Some(password) = credentials.password {
            self.password = Some(Secret::new(password));
        }

        let mut update = ParamsUpdate::new();
        for (name, value) in &parsed.driver_options {
            update = update.with_text(*name, value)?;
        }
        self.apply_update(update)
    }

    fn apply_update(&mut self, update: ParamsUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        update.validate()?;
        debug!(names = ?update.names(), "applying parameters");

        if update.has_description_fields() {
            update.apply_to_description(&mut self.default_description);
            for description in &mut self.description_list.descriptions {
                update.apply_to_description(description);
            }
        }
        if update.has_address_fields() {
            update.apply_to_address(&mut self.default_address);
            for address in self.description_list.addresses_mut() {
                update.apply_to_address(address);
            }
        }

        if let Some(user) = &update.user {
            self.apply_user(user, update.proxy_user.as_deref())?;
        }
        let ParamsUpdate {
            proxy_user,
            password,
            newpassword,
            wallet_password,
            access_token,
            externalauth,
            mode,
            stmtcachesize,
            tag,
            matchanytag,
            config_dir,
            appcontext,
            shardingkey,
            supershardingkey,
            debug_jdwp,
            program,
            machine,
            terminal,
            osuser,
            driver_name,
            handle,
            ssl_context,
            edition,
            events,
            disable_oob,
            ..
        } = update;

        replace_some(&mut self.proxy_user, proxy_user);
        replace_some(&mut self.password, password);
        replace_some(&mut self.newpassword, newpassword);
        replace_some(&mut self.wallet_password, wallet_password);
        replace_some(&mut self.access_token, access_token);
        replace_some(&mut self.tag, tag);
        replace_some(&mut self.config_dir, config_dir);
        replace_some(&mut self.debug_jdwp, debug_jdwp);
        replace_some(&mut self.ssl_context, ssl_context);
        replace_some(&mut self.edition, edition);
        assign(&mut self.externalauth, externalauth);
        assign(&mut self.mode, mode);
        assign(&mut self.stmtcachesize, stmtcachesize);
        assign(&mut self.matchanytag, matchanytag);
        assign(&mut self.appcontext, appcontext);
        assign(&mut self.shardingkey, shardingkey);
        assign(&mut self.supershardingkey, supershardingkey);
        assign(&mut self.program, program);
        assign(&mut self.machine, machine);
        assign(&mut self.terminal, terminal);
        assign(&mut self.osuser, osuser);
        assign(&mut self.driver_name, driver_name);
        assign(&mut self.handle, handle);
        assign(&mut self.events, events);
        assign(&mut self.disable_oob, disable_oob);
        Ok(())
    }
}

fn replace_some<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

fn assign<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

// Password material is never printed.
impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("user", &self.user)
            .field("proxy_user", &self.proxy_user)
            .field("mode", &self.mode)
            .field("config_dir", &self.config_dir)
            .field("edition", &self.edition)
            .field("description_list", &self.description_list)
            .finish_non_exhaustive()
    }
}
