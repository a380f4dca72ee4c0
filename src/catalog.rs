//! App catalog model
//!
//! An `AppCatalog` is the ordered category → entries mapping loaded from a
//! config file (or the built-in defaults). A `Selection` is the subset of a
//! catalog that will actually be installed. Selections can only be derived
//! from a catalog, so every selected entry exists in the source list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One installable app.
///
/// CLI catalogs list plain package names; GUI catalogs list records with a
/// package id and a friendly name. Both shapes are accepted everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppEntry {
    /// Plain package name, e.g. `"git"` or `"extras/vscode"`
    Simple(String),
    /// Package id with a display name, e.g. `{"id": "Git.Git", "name": "Git"}`
    Identified { id: String, name: String },
}

impl AppEntry {
    /// Create a plain entry
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple(name.into())
    }

    /// Create an id + display name entry
    pub fn identified(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Identified {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Name shown in menus and logs
    pub fn display_name(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Identified { name, .. } => name,
        }
    }

    /// Identifier handed to the package manager
    pub fn install_id(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Identified { id, .. } => id,
        }
    }
}

impl fmt::Display for AppEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(name) => write!(f, "{}", name),
            Self::Identified { id, name } => write!(f, "{} ({})", name, id),
        }
    }
}

/// A named, ordered group of entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub entries: Vec<AppEntry>,
}

impl Category {
    pub fn new(name: impl Into<String>, entries: Vec<AppEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// Ordered category → entries mapping with unique category names
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppCatalog {
    categories: Vec<Category>,
}

impl AppCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category at the end, or replace the entries of an existing one
    /// in place (keeping its original position).
    pub fn insert(&mut self, name: impl Into<String>, entries: Vec<AppEntry>) {
        let name = name.into();
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.entries = entries,
            None => self.categories.push(Category::new(name, entries)),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a category by exact name
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Look up a category ignoring ASCII case
    pub fn find_ignore_case(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Total number of entries across all categories
    pub fn total_entries(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    /// Built-in CLI catalog used when `scoop-apps.json` is missing
    pub fn scoop_defaults() -> Self {
        let mut catalog = Self::new();
        for (category, apps) in DEFAULT_SCOOP_APPS {
            catalog.insert(*category, apps.iter().map(|a| AppEntry::simple(*a)).collect());
        }
        catalog
    }

    /// Built-in GUI catalog used when `winget-apps.json` is missing
    pub fn winget_defaults() -> Self {
        let mut catalog = Self::new();
        for (category, apps) in DEFAULT_WINGET_APPS {
            catalog.insert(
                *category,
                apps.iter()
                    .map(|(id, name)| AppEntry::identified(*id, *name))
                    .collect(),
            );
        }
        catalog
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<AppEntry>)> for AppCatalog {
    fn from_iter<I: IntoIterator<Item = (S, Vec<AppEntry>)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (name, entries) in iter {
            catalog.insert(name, entries);
        }
        catalog
    }
}

const DEFAULT_SCOOP_APPS: &[(&str, &[&str])] = &[
    ("essential", &["git", "7zip", "curl", "wget", "sudo"]),
    ("development", &["nodejs-lts", "python", "go", "rustup", "gh"]),
    ("utilities", &["ripgrep", "fd", "fzf", "bat", "jq", "less"]),
    ("shell", &["starship", "extras/terminal-icons"]),
];

const DEFAULT_WINGET_APPS: &[(&str, &[(&str, &str)])] = &[
    (
        "browsers",
        &[
            ("Mozilla.Firefox", "Firefox"),
            ("Google.Chrome", "Google Chrome"),
        ],
    ),
    (
        "development",
        &[
            ("Microsoft.VisualStudioCode", "Visual Studio Code"),
            ("Microsoft.WindowsTerminal", "Windows Terminal"),
            ("Docker.DockerDesktop", "Docker Desktop"),
        ],
    ),
    (
        "utilities",
        &[
            ("7zip.7zip", "7-Zip"),
            ("voidtools.Everything", "Everything"),
            ("Microsoft.PowerToys", "PowerToys"),
        ],
    ),
    (
        "communication",
        &[("SlackTechnologies.Slack", "Slack"), ("Zoom.Zoom", "Zoom")],
    ),
];

/// The subset of a catalog chosen for installation.
///
/// Categories keep catalog order; categories with no entries are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    categories: Vec<Category>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select every entry of every category
    pub fn all(catalog: &AppCatalog) -> Self {
        let mut selection = Self::new();
        for category in catalog.categories() {
            selection.push(category.clone());
        }
        selection
    }

    /// Select whole categories by name (case-insensitive).
    ///
    /// Returns the selection in catalog order and the names that matched no
    /// category. Unknown names are never turned into entries.
    pub fn from_overrides<S: AsRef<str>>(catalog: &AppCatalog, names: &[S]) -> (Self, Vec<String>) {
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if catalog.find_ignore_case(name).is_none() {
                unknown.push(name.to_string());
            }
        }

        let mut selection = Self::new();
        for category in catalog.categories() {
            let wanted = names
                .iter()
                .any(|n| n.as_ref().trim().eq_ignore_ascii_case(&category.name));
            if wanted {
                selection.push(category.clone());
            }
        }
        (selection, unknown)
    }

    /// Append a category; empty categories are dropped
    pub(crate) fn push(&mut self, category: Category) {
        if !category.entries.is_empty() {
            self.categories.push(category);
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Entries selected for a category, if it was selected at all
    pub fn get(&self, name: &str) -> Option<&[AppEntry]> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.entries.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of selected entries
    pub fn total_entries(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    /// Iterate `(category name, entry)` pairs in install order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AppEntry)> {
        self.categories
            .iter()
            .flat_map(|c| c.entries.iter().map(move |e| (c.name.as_str(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> AppCatalog {
        AppCatalog::from_iter([
            ("essential", vec![AppEntry::simple("git"), AppEntry::simple("curl")]),
            ("dev", vec![AppEntry::simple("docker")]),
            ("empty", vec![]),
        ])
    }

    #[test]
    fn test_entry_display_name_is_uniform() {
        let plain = AppEntry::simple("git");
        let record = AppEntry::identified("Git.Git", "Git");
        assert_eq!(plain.display_name(), "git");
        assert_eq!(record.display_name(), "Git");
        assert_eq!(plain.install_id(), "git");
        assert_eq!(record.install_id(), "Git.Git");
        assert_eq!(record.to_string(), "Git (Git.Git)");
    }

    #[test]
    fn test_entry_deserializes_both_shapes() {
        let entries: Vec<AppEntry> =
            serde_json::from_str(r#"["git", {"id": "Git.Git", "name": "Git"}]"#).unwrap();
        assert_eq!(entries[0], AppEntry::simple("git"));
        assert_eq!(entries[1], AppEntry::identified("Git.Git", "Git"));
    }

    #[test]
    fn test_catalog_insert_keeps_position_and_uniqueness() {
        let mut catalog = sample_catalog();
        catalog.insert("essential", vec![AppEntry::simple("wget")]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.categories()[0].name, "essential");
        assert_eq!(catalog.categories()[0].entries, vec![AppEntry::simple("wget")]);
    }

    #[test]
    fn test_defaults_are_populated() {
        let scoop = AppCatalog::scoop_defaults();
        assert_eq!(scoop.categories()[0].name, "essential");
        assert!(scoop.get("essential").unwrap().entries.contains(&AppEntry::simple("git")));

        let winget = AppCatalog::winget_defaults();
        assert!(winget.total_entries() > 0);
        assert!(winget
            .categories()
            .iter()
            .flat_map(|c| &c.entries)
            .all(|e| matches!(e, AppEntry::Identified { .. })));
    }

    #[test]
    fn test_selection_all_omits_empty_categories() {
        let selection = Selection::all(&sample_catalog());
        assert_eq!(selection.categories().len(), 2);
        assert!(selection.get("empty").is_none());
        assert_eq!(selection.total_entries(), 3);
    }

    #[test]
    fn test_selection_from_overrides() {
        let catalog = sample_catalog();
        let (selection, unknown) = Selection::from_overrides(&catalog, &["DEV", "essential", "games"]);
        let names: Vec<&str> = selection.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["essential", "dev"]);
        assert_eq!(unknown, vec!["games".to_string()]);
    }

    #[test]
    fn test_selection_iter_in_install_order() {
        let selection = Selection::all(&sample_catalog());
        let ids: Vec<&str> = selection.iter().map(|(_, e)| e.install_id()).collect();
        assert_eq!(ids, vec!["git", "curl", "docker"]);
    }
}
