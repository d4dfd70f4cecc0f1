//! Network service name (alias) resolution.
//!
//! Aliases live in `tnsnames.ora` inside the configuration directory. The
//! parser consults an [`AliasSource`] whenever a connect string is a bare
//! word; [`ConfigDirAliases`] loads the file on first use.

mod tnsnames;

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

pub use tnsnames::TnsNames;

use crate::error::ConnectParamsError;
use crate::Result;

/// Anything that maps alias names to descriptor text.
pub trait AliasSource {
    /// Descriptor text for `alias`, or `Ok(None)` when it is not defined.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying alias table cannot be read.
    fn descriptor(&self, alias: &str) -> Result<Option<String>>;
}

impl AliasSource for TnsNames {
    fn descriptor(&self, alias: &str) -> Result<Option<String>> {
        Ok(self.get(alias).map(str::to_string))
    }
}

/// Aliases from the `tnsnames.ora` of a configuration directory, loaded at
/// most once.
#[derive(Debug, Default)]
pub struct ConfigDirAliases {
    dir: Option<PathBuf>,
    table: OnceCell<Option<TnsNames>>,
}

impl ConfigDirAliases {
    #[must_use]
    pub fn new(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf),
            table: OnceCell::new(),
        }
    }

    /// The loaded table, `None` without a directory or alias file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the alias file cannot be read.
    pub fn table(&self) -> Result<Option<&TnsNames>> {
        if self.table.get().is_none() {
            let loaded = match &self.dir {
                Some(dir) => TnsNames::load_from_dir(dir)?,
                None => None,
            };
            let _ = self.table.set(loaded);
        }
        Ok(self.table.get().and_then(Option::as_ref))
    }
}

impl AliasSource for ConfigDirAliases {
    fn descriptor(&self, alias: &str) -> Result<Option<String>> {
        Ok(self
            .table()?
            .and_then(|table| table.get(alias))
            .map(str::to_string))
    }
}

/// All alias names defined in `config_dir`, upper-cased, in file order.
///
/// # Errors
///
/// Returns `AliasNotFound` when there is no directory or no alias file in it,
/// and an I/O error if the file cannot be read.
pub fn network_service_names(config_dir: Option<&Path>) -> Result<Vec<String>> {
    let dir = config_dir
        .ok_or_else(|| ConnectParamsError::alias_file_not_found("(no configuration directory)"))?;
    let table = TnsNames::load_from_dir(dir)?
        .ok_or_else(|| ConnectParamsError::alias_file_not_found(dir.display().to_string()))?;
    Ok(table.names().to_vec())
}

/// Whether a connect string is shaped like an alias.
pub(crate) fn is_alias_candidate(input: &str) -> bool {
    !input.is_empty() && !input.contains(['(', ':', '/', '?', ','])
}
