//! Config file loading for app catalogs and network settings.
//!
//! All config files are JSON objects. Keys starting with `_` are metadata or
//! comments and are ignored. A missing file is reported as `ConfigNotFound`
//! so callers can fall back to the built-in defaults; malformed content is a
//! `ConfigParse` error.

use crate::catalog::{AppCatalog, AppEntry};
use crate::console::Console;
use crate::error::{BootstrapError, Result};
use crate::network::{NetworkField, NetworkSettings};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI app catalog file name
pub const SCOOP_APPS_FILE: &str = "scoop-apps.json";
/// GUI app catalog file name
pub const WINGET_APPS_FILE: &str = "winget-apps.json";
/// Network settings file name
pub const NETWORK_CONFIG_FILE: &str = "network-config.json";
/// Profile setup script name
pub const PROFILE_SCRIPT_FILE: &str = "profile-setup.ps1";

/// Locations of the config files inside a config directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scoop_apps(&self) -> PathBuf {
        self.dir.join(SCOOP_APPS_FILE)
    }

    pub fn winget_apps(&self) -> PathBuf {
        self.dir.join(WINGET_APPS_FILE)
    }

    pub fn network(&self) -> PathBuf {
        self.dir.join(NETWORK_CONFIG_FILE)
    }

    pub fn profile_script(&self) -> PathBuf {
        self.dir.join(PROFILE_SCRIPT_FILE)
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new("config")
    }
}

/// Network settings loaded from file, with the fields that were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkLoad {
    pub settings: NetworkSettings,
    /// One message per ignored key or dropped field
    pub warnings: Vec<String>,
}

/// Read a config file and parse it as a JSON object
fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BootstrapError::config_not_found(path),
        _ => BootstrapError::Io(e),
    })?;

    let value: Value = serde_json::from_str(&content)
        .map_err(|e| BootstrapError::config_parse(path, e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(BootstrapError::config_parse(
            path,
            "top-level value must be a JSON object",
        )),
    }
}

fn is_metadata_key(key: &str) -> bool {
    key.starts_with('_')
}

/// Load an app catalog.
///
/// Each non-metadata key is a category; its value must be an array of
/// strings or `{id, name}` records. Category order follows the file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<AppCatalog> {
    let path = path.as_ref();
    let object = read_object(path)?;

    let mut catalog = AppCatalog::new();
    for (category, value) in object {
        if is_metadata_key(&category) {
            debug!("Skipping metadata key {} in {}", category, path.display());
            continue;
        }
        let entries: Vec<AppEntry> = serde_json::from_value(value).map_err(|e| {
            BootstrapError::config_parse(
                path,
                format!(
                    "category '{}' must be a list of names or {{id, name}} objects ({})",
                    category, e
                ),
            )
        })?;
        catalog.insert(category, entries);
    }

    debug!(
        "Loaded {} categories ({} apps) from {}",
        catalog.len(),
        catalog.total_entries(),
        path.display()
    );
    Ok(catalog)
}

/// Load an app catalog, falling back to `default` when it is unusable.
///
/// A missing file is reported at INFO, a malformed one at WARNING.
pub fn load_catalog_or_default(
    path: impl AsRef<Path>,
    default: impl FnOnce() -> AppCatalog,
    console: &mut Console,
) -> AppCatalog {
    let path = path.as_ref();
    match load_catalog(path) {
        Ok(catalog) => {
            console.info(format!(
                "Loaded {} categories from {}",
                catalog.len(),
                path.display()
            ));
            catalog
        }
        Err(e) if e.is_not_found() => {
            console.info(format!("{} not found, using built-in app list", path.display()));
            default()
        }
        Err(e) => {
            console.warning(format!("{}; using built-in app list", e));
            default()
        }
    }
}

/// Load network settings.
///
/// Problems are returned in `NetworkLoad::warnings`, not logged; the caller
/// reports them. Every recognized field is validated; an invalid or non-string value is
/// dropped with a warning and left for the prompts to fill in. Empty strings
/// count as unset. Unknown keys are ignored with a warning.
pub fn load_network(path: impl AsRef<Path>) -> Result<NetworkLoad> {
    let path = path.as_ref();
    let object = read_object(path)?;

    let mut load = NetworkLoad::default();
    for (key, value) in object {
        if is_metadata_key(&key) {
            continue;
        }
        let Ok(field) = key.parse::<NetworkField>() else {
            load.warnings
                .push(format!("Ignoring unknown key '{}' in {}", key, path.display()));
            continue;
        };
        match value {
            Value::String(s) if s.is_empty() => {}
            Value::Null => {}
            Value::String(s) => *load.settings.slot_mut(field) = Some(s),
            other => load.warnings.push(format!(
                "Ignoring {}: expected a string, found {}",
                field, other
            )),
        }
    }
    load.warnings.extend(load.settings.drop_invalid());
    Ok(load)
}

/// Load network settings, treating a missing or malformed file as empty.
///
/// Warnings for dropped fields are printed to the console.
pub fn load_network_or_default(path: impl AsRef<Path>, console: &mut Console) -> NetworkSettings {
    let path = path.as_ref();
    match load_network(path) {
        Ok(load) => {
            for message in &load.warnings {
                console.warning(message);
            }
            load.settings
        }
        Err(e) if e.is_not_found() => {
            console.info(format!("{} not found, no preset network settings", path.display()));
            NetworkSettings::default()
        }
        Err(e) => {
            console.warning(format!("{}; ignoring network config", e));
            NetworkSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_config_paths() {
        let paths = ConfigPaths::new("cfg");
        assert_eq!(paths.scoop_apps(), PathBuf::from("cfg").join("scoop-apps.json"));
        assert_eq!(paths.winget_apps(), PathBuf::from("cfg").join("winget-apps.json"));
        assert_eq!(paths.network(), PathBuf::from("cfg").join("network-config.json"));
        assert_eq!(ConfigPaths::default().dir(), Path::new("config"));
    }

    #[test]
    fn test_load_catalog_preserves_order() {
        let file = write_temp(
            r#"{"zeta": ["a"], "_comment": "ignored", "alpha": ["b", "c"], "mid": []}"#,
        );
        let catalog = load_catalog(file.path()).unwrap();
        let names: Vec<&str> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(catalog.total_entries(), 3);
    }

    #[test]
    fn test_load_catalog_gui_form() {
        let file = write_temp(
            r#"{"browsers": [{"id": "Mozilla.Firefox", "name": "Firefox"}]}"#,
        );
        let catalog = load_catalog(file.path()).unwrap();
        let entry = &catalog.get("browsers").unwrap().entries[0];
        assert_eq!(entry.display_name(), "Firefox");
        assert_eq!(entry.install_id(), "Mozilla.Firefox");
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_catalog_malformed_json() {
        let file = write_temp(r#"{"essential": ["git""#);
        let err = load_catalog(file.path()).unwrap_err();
        assert!(matches!(err, BootstrapError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_catalog_wrong_shapes() {
        let file = write_temp(r#"["git", "curl"]"#);
        assert!(matches!(
            load_catalog(file.path()).unwrap_err(),
            BootstrapError::ConfigParse { .. }
        ));

        let file = write_temp(r#"{"essential": "git"}"#);
        let err = load_catalog(file.path()).unwrap_err();
        assert!(err.to_string().contains("essential"));

        let file = write_temp(r#"{"essential": [{"id": "Git.Git"}]}"#);
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_load_catalog_or_default_falls_back() {
        let (mut console, out) = Console::scripted(&[]);
        let dir = tempfile::tempdir().unwrap();
        let catalog =
            load_catalog_or_default(dir.path().join("missing.json"), AppCatalog::scoop_defaults, &mut console);
        assert_eq!(catalog, AppCatalog::scoop_defaults());
        assert!(out.contents().contains("[INFO]"));
        assert_eq!(console.warnings(), 0);

        let file = write_temp("not json");
        let catalog = load_catalog_or_default(file.path(), AppCatalog::winget_defaults, &mut console);
        assert_eq!(catalog, AppCatalog::winget_defaults());
        assert_eq!(console.warnings(), 1);
    }

    #[test]
    fn test_load_network_drops_invalid_gateway_only() {
        let file = write_temp(
            r#"{
                "_comment": "lab machine",
                "hostname": "web-01",
                "ipAddress": "192.168.1.50",
                "subnetMask": "255.255.255.0",
                "gateway": "192.168.1.300",
                "dnsServer": "1.1.1.1"
            }"#,
        );
        let load = load_network(file.path()).unwrap();
        assert_eq!(load.warnings.len(), 1);
        assert!(load.warnings[0].contains("gateway"));
        assert!(load.settings.gateway.is_none());
        assert_eq!(load.settings.hostname.as_deref(), Some("web-01"));
        assert_eq!(load.settings.ip_address.as_deref(), Some("192.168.1.50"));
        assert_eq!(load.settings.subnet_mask.as_deref(), Some("255.255.255.0"));
        assert_eq!(load.settings.dns_server.as_deref(), Some("1.1.1.1"));
    }

    #[test]
    fn test_load_network_unknown_and_non_string_values() {
        let file = write_temp(r#"{"hostname": 42, "ntpServer": "pool.ntp.org", "gateway": ""}"#);
        let load = load_network(file.path()).unwrap();
        assert_eq!(load.warnings.len(), 2);
        assert!(load.settings.is_empty());
    }

    #[test]
    fn test_load_network_or_default_reports_warnings() {
        let file = write_temp(r#"{"hostname": "-bad-"}"#);
        let (mut console, out) = Console::scripted(&[]);
        let settings = load_network_or_default(file.path(), &mut console);
        assert!(settings.hostname.is_none());
        assert_eq!(console.warnings(), 1);
        assert!(out.contents().contains("[WARNING]"));
    }

    #[test]
    fn test_dropped_field_is_logged_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network-config.json");
        fs::write(&path, r#"{"hostname": "web-01", "gateway": "192.168.1.300"}"#).unwrap();

        let transcript = crate::transcript::Transcript::open(dir.path().join("logs")).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(transcript.clone())
            .with_ansi(false)
            .finish();
        let (mut console, _) = Console::scripted(&[]);
        let settings = tracing::subscriber::with_default(subscriber, || {
            load_network_or_default(&path, &mut console)
        });
        transcript.close("done").unwrap();

        assert_eq!(settings.hostname.as_deref(), Some("web-01"));
        assert_eq!(console.warnings(), 1);
        let text = fs::read_to_string(transcript.path()).unwrap();
        let warn_lines: Vec<&str> = text.lines().filter(|l| l.contains(" WARN ")).collect();
        assert_eq!(warn_lines.len(), 1);
        assert!(warn_lines[0].contains("Ignoring gateway"));
    }
}
