use std::collections::{BTreeMap, HashMap};
use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Variable that carries extra flags to the Node runtime behind `npm`.
pub const LEGACY_OPENSSL_VAR: &str = "NODE_OPTIONS";

/// Lets Node's OpenSSL 3 build accept the legacy algorithms an outdated
/// dependency of the `www` project still relies on. Drop once it is upgraded.
pub const LEGACY_OPENSSL_VALUE: &str = "--openssl-legacy-provider";

/// Environment handed to the delegated task.
///
/// The environment contains:
/// - `inherited`: a snapshot of the launcher's own variables, taken once.
/// - `overlay`: variables set for the child only; they win over `inherited`.
/// - `current_dir`: the working directory for the child.
///
/// Nothing here touches the launcher's own process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Variables inherited from the launcher process.
    pub inherited: HashMap<OsString, OsString>,
    /// Variables added or overridden for the child.
    pub overlay: BTreeMap<OsString, OsString>,
    /// Working directory for the child.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Snapshot the current process state.
    ///
    /// Variables are read with `vars_os`, so non UTF-8 entries survive. The
    /// working directory is the caller's, and is only a placeholder until the
    /// launcher points it at the target directory.
    pub fn capture() -> Self {
        let inherited = stdenv::vars_os().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            inherited,
            overlay: BTreeMap::new(),
            current_dir,
        }
    }

    /// Get the value the child will see for `key`.
    ///
    /// Names compare case-insensitively on Windows, where `PATH` is usually
    /// stored as `Path`.
    pub fn get_var(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.overlay
            .iter()
            .find(|(k, _)| same_key(k, key))
            .or_else(|| self.inherited.iter().find(|(k, _)| same_key(k, key)))
            .map(|(_, v)| v.as_os_str())
    }

    /// Set or override a variable for the child only.
    pub fn set_var(&mut self, key: impl Into<OsString>, val: impl Into<OsString>) {
        let key = key.into();
        self.overlay.retain(|k, _| !same_key(k, &key));
        self.overlay.insert(key, val.into());
    }

    /// Add the legacy OpenSSL provider flag to the overlay.
    pub fn enable_legacy_openssl(&mut self) {
        self.set_var(LEGACY_OPENSSL_VAR, LEGACY_OPENSSL_VALUE);
    }

    /// The complete variable set for the child, overlay applied.
    pub fn merged(&self) -> BTreeMap<OsString, OsString> {
        let mut vars: BTreeMap<OsString, OsString> = self
            .inherited
            .iter()
            .filter(|(k, _)| !self.overlay.keys().any(|o| same_key(k, o)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.extend(self.overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars
    }
}

#[cfg(windows)]
fn same_key(a: &OsStr, b: &OsStr) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(not(windows))]
fn same_key(a: &OsStr, b: &OsStr) -> bool {
    a == b
}
