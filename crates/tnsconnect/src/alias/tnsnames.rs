//! `tnsnames.ora` reader.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::TNSNAMES_FILE_NAME;
use crate::error::ConnectParamsError;
use crate::Result;

const INCLUDE_KEY: &str = "IFILE";

/// Parsed alias file: upper-cased network service names mapped to their
/// descriptor text.
///
/// Entries may span several lines until their parentheses balance. One entry
/// can declare several comma-separated names, and a later definition of a name
/// replaces an earlier one while keeping its original position.
///
/// ```text
/// # primary
/// SALES, SALES_RO =
///   (DESCRIPTION=
///     (ADDRESS=(PROTOCOL=TCP)(HOST=sales-db)(PORT=1521))
///     (CONNECT_DATA=(SERVICE_NAME=sales)))
/// IFILE = common.ora
/// ```
#[derive(Debug, Clone, Default)]
pub struct TnsNames {
    path: Option<PathBuf>,
    names: Vec<String>,
    entries: HashMap<String, String>,
}

impl TnsNames {
    /// Load an alias file and everything it includes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file or one of its includes cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut names = Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        };
        names.include(path, &mut HashSet::new())?;
        Ok(names)
    }

    /// Load `tnsnames.ora` from a configuration directory.
    ///
    /// Returns `Ok(None)` when the directory holds no alias file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = dir.as_ref().join(TNSNAMES_FILE_NAME);
        let exists = path
            .try_exists()
            .map_err(|e| ConnectParamsError::io(&path, e))?;
        if !exists {
            debug!(path = %path.display(), "no alias file");
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Parse alias file text. Includes are resolved against the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an included file cannot be read.
    pub fn parse(text: &str) -> Result<Self> {
        let mut names = Self::default();
        names.parse_entries(text, None, &mut HashSet::new())?;
        Ok(names)
    }

    /// Descriptor text for `alias`, matched case-insensitively.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries
            .get(&alias.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Like [`get`](Self::get), but reports a missing alias as an error.
    ///
    /// # Errors
    ///
    /// Returns `AliasNotFound` naming the alias and the file.
    pub fn lookup(&self, alias: &str) -> Result<&str> {
        self.get(alias)
            .ok_or_else(|| ConnectParamsError::alias_not_found(alias, self.location()))
    }

    /// All names in file order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// File this table was loaded from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn location(&self) -> String {
        self.path.as_ref().map_or_else(
            || "alias table".to_string(),
            |p| p.display().to_string(),
        )
    }

    fn include(&mut self, path: &Path, visited: &mut HashSet<PathBuf>) -> Result<()> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !visited.insert(key) {
            debug!(path = %path.display(), "skipping alias file already included");
            return Ok(());
        }

        let text = fs::read_to_string(path).map_err(|e| ConnectParamsError::io(path, e))?;
        debug!(path = %path.display(), "loading alias file");
        self.parse_entries(&text, path.parent(), visited)
    }

    fn parse_entries(
        &mut self,
        text: &str,
        base: Option<&Path>,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let mut pending = String::new();
        let mut depth: i64 = 0;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !pending.is_empty() {
                pending.push(' ');
            }
            pending.push_str(line);
            depth += paren_balance(line);

            if depth < 0 {
                warn!(entry = %pending, "skipping alias entry with unbalanced parentheses");
                pending.clear();
                depth = 0;
            } else if depth == 0 && has_value(&pending) {
                let entry = std::mem::take(&mut pending);
                self.add_entry(&entry, base, visited)?;
            }
        }

        if !pending.is_empty() {
            warn!(entry = %pending, "skipping unterminated alias entry");
        }
        Ok(())
    }

    fn add_entry(
        &mut self,
        entry: &str,
        base: Option<&Path>,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let Some((names, value)) = entry.split_once('=') else {
            return Ok(());
        };
        let value = value.trim();
        let names: Vec<String> = names
            .split(',')
            .map(|n| n.trim().to_ascii_uppercase())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() || names.iter().any(|n| n.contains(['(', ')'])) {
            warn!(entry = %entry, "skipping malformed alias entry");
            return Ok(());
        }

        if names.len() == 1 && names[0] == INCLUDE_KEY {
            let target = Path::new(value.trim_matches('"'));
            let target = match base {
                Some(base) if target.is_relative() => base.join(target),
                _ => target.to_path_buf(),
            };
            return self.include(&target, visited);
        }

        for name in names {
            if self.entries.insert(name.clone(), value.to_string()).is_none() {
                self.names.push(name);
            }
        }
        Ok(())
    }
}

fn paren_balance(line: &str) -> i64 {
    line.bytes().fold(0, |acc, b| match b {
        b'(' => acc + 1,
        b')' => acc - 1,
        _ => acc,
    })
}

fn has_value(entry: &str) -> bool {
    entry
        .split_once('=')
        .is_some_and(|(_, value)| !value.trim().is_empty())
}
