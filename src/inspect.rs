//! Read-only commands: `list` and `validate`.

use crate::catalog::AppCatalog;
use crate::config_file::{load_catalog, load_catalog_or_default, load_network, ConfigPaths};
use crate::console::Console;
use crate::network::{NetworkField, NetworkSettings};
use crate::package_manager::ManagerKind;
use strum::IntoEnumIterator;

/// Print both catalogs numbered the way the selection menu numbers them
pub fn list_catalogs(paths: &ConfigPaths, console: &mut Console) {
    for kind in ManagerKind::iter() {
        let catalog = load_catalog_or_default(
            kind.catalog_path(paths),
            || kind.default_catalog(),
            console,
        );
        console.heading(format!("{} ({})", kind.catalog_label(), kind.label()));
        print_catalog(&catalog, console);
    }
}

fn print_catalog(catalog: &AppCatalog, console: &mut Console) {
    if catalog.is_empty() {
        console.line("  (no categories)");
        return;
    }
    for (i, category) in catalog.categories().iter().enumerate() {
        console.line(format!("{}. {}", i + 1, category.name));
        for (j, entry) in category.entries.iter().enumerate() {
            console.line(format!("     {}. {}", j + 1, entry));
        }
    }
}

/// Load every config file and report what would happen at run time.
///
/// Returns the process exit code: 1 if any file exists but cannot be parsed.
pub fn validate_config(paths: &ConfigPaths, console: &mut Console) -> i32 {
    let mut broken = 0;

    for kind in ManagerKind::iter() {
        let path = kind.catalog_path(paths);
        match load_catalog(&path) {
            Ok(catalog) => console.success(format!(
                "{}: {} categories, {} apps",
                path.display(),
                catalog.len(),
                catalog.total_entries()
            )),
            Err(e) if e.is_not_found() => console.info(format!(
                "{} not found; the built-in {} list will be used",
                path.display(),
                kind.catalog_label()
            )),
            Err(e) => {
                console.error(e.to_string());
                broken += 1;
            }
        }
    }

    let path = paths.network();
    match load_network(&path) {
        Ok(load) => {
            for message in &load.warnings {
                console.warning(message);
            }
            console.success(format!(
                "{}: {} usable network settings",
                path.display(),
                count_fields(&load.settings)
            ));
            if let Err(e) = load.settings.static_ip() {
                console.warning(e.to_string());
            }
        }
        Err(e) if e.is_not_found() => {
            console.info(format!("{} not found; no preset network settings", path.display()));
        }
        Err(e) => {
            console.error(e.to_string());
            broken += 1;
        }
    }

    let script = paths.profile_script();
    if script.is_file() {
        console.success(format!("Profile script found at {}", script.display()));
    } else {
        console.info(format!("No profile script at {}", script.display()));
    }

    if broken > 0 {
        console.error(format!("{} config file(s) could not be parsed", broken));
        1
    } else {
        0
    }
}

fn count_fields(settings: &NetworkSettings) -> usize {
    NetworkField::iter()
        .filter(|f| settings.get(*f).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_validate_empty_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (mut console, out) = Console::scripted(&[]);
        assert_eq!(validate_config(&ConfigPaths::new(dir.path()), &mut console), 0);
        assert!(out.contents().contains("built-in CLI apps list"));
    }

    #[test]
    fn test_validate_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("winget-apps.json"), "{ nope").unwrap();
        fs::write(
            dir.path().join("network-config.json"),
            r#"{"ipAddress": "10.0.0.5", "gateway": "10.0.0.300"}"#,
        )
        .unwrap();
        let (mut console, _) = Console::scripted(&[]);
        assert_eq!(validate_config(&ConfigPaths::new(dir.path()), &mut console), 1);
        // Invalid gateway, then the incomplete static IP
        assert_eq!(console.warnings(), 2);
    }

    #[test]
    fn test_list_numbers_categories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("scoop-apps.json"),
            r#"{"essential": ["git", "curl"]}"#,
        )
        .unwrap();
        let (mut console, out) = Console::scripted(&[]);
        list_catalogs(&ConfigPaths::new(dir.path()), &mut console);
        let text = out.contents();
        assert!(text.contains("1. essential"));
        assert!(text.contains("     2. curl"));
        assert!(text.contains("GUI apps (WinGet)"));
    }
}
