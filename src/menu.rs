//! Interactive selection menus.
//!
//! Two-level app selection (categories, then exclusions within each chosen
//! category) and the network settings prompts. Input parsing lives in pure
//! functions so it can be tested without a console; the interactive wrappers
//! reprompt through `prompt_validated` until the input parses.

use crate::catalog::{AppCatalog, AppEntry, Category, Selection};
use crate::console::{prompt_validated, Console};
use crate::error::{BootstrapError, Result};
use crate::network::{NetworkField, NetworkSettings};

/// What to do with the entries of one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemChoice {
    /// Install every entry
    KeepAll,
    /// Drop the whole category
    Skip,
    /// Install everything except these 0-based positions
    Exclude(Vec<usize>),
}

/// Parse comma-separated 1-based indices into sorted, distinct 0-based ones.
fn parse_indices(input: &str, count: usize) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for token in input.split(',').map(str::trim) {
        if token.is_empty() {
            return Err(BootstrapError::validation(
                "Empty entry in list; use numbers separated by commas",
            ));
        }
        let n: usize = token
            .parse()
            .map_err(|_| BootstrapError::validation(format!("'{}' is not a number", token)))?;
        if n == 0 || n > count {
            return Err(BootstrapError::validation(format!(
                "{} is out of range (1-{})",
                n, count
            )));
        }
        indices.push(n - 1);
    }
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

/// Parse a category selection against a catalog of `count` categories.
///
/// Returns distinct 0-based indices in catalog order. `0` alone means
/// "skip all" and yields an empty list. Any bad token rejects the input.
pub fn parse_category_choice(input: &str, count: usize) -> Result<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(BootstrapError::validation(
            "Enter one or more category numbers, or 0 to skip all",
        ));
    }
    let tokens: Vec<&str> = input.split(',').map(str::trim).collect();
    if tokens.contains(&"0") {
        if tokens.len() == 1 {
            return Ok(Vec::new());
        }
        return Err(BootstrapError::validation(
            "0 (skip all) cannot be combined with other categories",
        ));
    }
    parse_indices(input, count)
}

/// Parse the per-category refinement input for a category of `count` items.
///
/// Empty or `all` keeps everything, `skip` drops the category, and a list of
/// numbers excludes those items.
pub fn parse_item_choice(input: &str, count: usize) -> Result<ItemChoice> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "" | "all" => Ok(ItemChoice::KeepAll),
        "skip" => Ok(ItemChoice::Skip),
        _ => parse_indices(input, count).map(ItemChoice::Exclude),
    }
}

/// Entries left after applying `choice`, in original order
pub fn apply_item_choice(entries: &[AppEntry], choice: &ItemChoice) -> Vec<AppEntry> {
    match choice {
        ItemChoice::KeepAll => entries.to_vec(),
        ItemChoice::Skip => Vec::new(),
        ItemChoice::Exclude(excluded) => entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(_, e)| e.clone())
            .collect(),
    }
}

/// Show the categories and ask which to process
pub fn select_categories(console: &mut Console, catalog: &AppCatalog) -> Result<Vec<usize>> {
    if catalog.is_empty() {
        console.info("No categories available");
        return Ok(Vec::new());
    }

    console.line("Available categories:");
    for (i, category) in catalog.categories().iter().enumerate() {
        let count = category.entries.len();
        let noun = if count == 1 { "app" } else { "apps" };
        console.line(format!("  {}. {} ({} {})", i + 1, category.name, count, noun));
    }
    console.line("  0. Skip all");

    let count = catalog.len();
    let chosen = prompt_validated(
        console,
        "Select categories (comma-separated, e.g. 1,3):",
        false,
        |input| parse_category_choice(input, count),
    )?;
    Ok(chosen.unwrap_or_default())
}

/// List a category's entries and ask which to exclude
pub fn refine_category(console: &mut Console, category: &Category) -> Result<Vec<AppEntry>> {
    console.line("");
    console.line(format!("{}:", category.name));
    for (i, entry) in category.entries.iter().enumerate() {
        console.line(format!("  {}. {}", i + 1, entry.display_name()));
    }

    let count = category.entries.len();
    let choice = prompt_validated(
        console,
        "Enter to install all, 'skip' to skip this category, or numbers to exclude (e.g. 2,4):",
        false,
        |input| parse_item_choice(input, count),
    )?
    .unwrap_or(ItemChoice::KeepAll);

    Ok(apply_item_choice(&category.entries, &choice))
}

/// Run the full two-level selection over `catalog`
pub fn interactive_selection(console: &mut Console, catalog: &AppCatalog) -> Result<Selection> {
    let chosen = select_categories(console, catalog)?;
    let mut selection = Selection::new();
    for index in chosen {
        let category = &catalog.categories()[index];
        let entries = refine_category(console, category)?;
        if entries.is_empty() {
            console.info(format!("Skipping {}", category.name));
        }
        selection.push(Category::new(category.name.clone(), entries));
    }
    Ok(selection)
}

/// Use `preselected` if given, otherwise ask interactively
pub fn resolve_selection(
    console: &mut Console,
    catalog: &AppCatalog,
    preselected: Option<Selection>,
) -> Result<Selection> {
    match preselected {
        Some(selection) => Ok(selection),
        None => interactive_selection(console, catalog),
    }
}

/// Ask for one network field.
///
/// With a current value, Enter keeps it. Without one, Enter skips the field
/// unless it is `required`, in which case the question repeats.
fn prompt_field(
    console: &mut Console,
    field: NetworkField,
    current: Option<&str>,
    required: bool,
) -> Result<Option<String>> {
    let question = match (current, required) {
        (Some(value), _) => format!("{} [{}]:", field.label(), value),
        (None, true) => format!("{} (required):", field.label()),
        (None, false) => format!("{} (Enter to skip):", field.label()),
    };
    let allow_skip = current.is_some() || !required;
    let answer = prompt_validated(console, &question, allow_skip, |input| {
        if input.is_empty() {
            return Err(BootstrapError::validation(format!(
                "{} is required when an IP address is set",
                field.label()
            )));
        }
        field.validate(input).map(|_| input.to_string())
    })?;
    Ok(answer.or_else(|| current.map(String::from)))
}

/// Prompt for every network setting, starting from `current`.
///
/// Order: hostname, IP address, subnet mask, gateway, DNS server. Subnet mask
/// and gateway are only asked for when an IP address is set; the gateway is
/// then required. `machine_name` is the computer's name right now, shown
/// before the hostname question.
pub fn prompt_network_settings(
    console: &mut Console,
    current: &NetworkSettings,
    machine_name: Option<&str>,
) -> Result<NetworkSettings> {
    if let Some(name) = machine_name {
        console.info(format!("Current computer name: {}", name));
    }
    let mut settings = NetworkSettings {
        hostname: prompt_field(console, NetworkField::Hostname, current.hostname.as_deref(), false)?,
        ..Default::default()
    };

    settings.ip_address =
        prompt_field(console, NetworkField::IpAddress, current.ip_address.as_deref(), false)?;
    if settings.ip_address.is_some() {
        settings.subnet_mask = prompt_field(
            console,
            NetworkField::SubnetMask,
            Some(current.subnet_mask_or_default()),
            true,
        )?;
        settings.gateway =
            prompt_field(console, NetworkField::Gateway, current.gateway.as_deref(), true)?;
    } else {
        console.info("No static IP address entered, keeping DHCP");
    }

    settings.dns_server =
        prompt_field(console, NetworkField::DnsServer, current.dns_server.as_deref(), false)?;
    Ok(settings)
}
