//! Distribution metadata extraction.
//!
//! Turns the core-metadata headers of an installed distribution into the
//! normalized [`DistMeta`] the administration surfaces display. Missing
//! fields resolve to empty strings; extraction never fails.

use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, MetadataMap};

/// Project-Url labels accepted as the plugin's home page, after
/// normalization.
const URL_LABELS: [&str; 4] = ["homepage", "source", "sourcecode", "repository"];

/// Normalized descriptor of the distribution a plugin ships in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistMeta {
    /// Canonical plugin name assigned at load.
    pub name: String,
    /// Installed distribution name.
    pub package_name: String,
    /// Declared version.
    pub version: String,
    /// One-line summary.
    pub summary: String,
    /// Maintainer or author display names.
    pub author: String,
    /// License expression or a pointer to the license file.
    pub license: String,
    /// Home page or source repository.
    pub url: String,
}

impl DistMeta {
    /// Extracts the descriptor for a plugin loaded under `name`.
    pub fn from_distribution(name: &str, dist: &Distribution) -> Self {
        let meta = &dist.metadata;
        Self {
            name: name.to_string(),
            package_name: dist.name.clone(),
            version: dist.version.clone(),
            summary: meta.get("Summary").unwrap_or_default().trim().to_string(),
            author: resolve_author(meta),
            license: resolve_license(meta),
            url: resolve_url(meta),
        }
    }
}

fn resolve_author(meta: &MetadataMap) -> String {
    non_empty(meta.get("Maintainer"))
        .or_else(|| email_display_names(&meta.get_all("Maintainer-Email")))
        .or_else(|| non_empty(meta.get("Author")))
        .or_else(|| email_display_names(&meta.get_all("Author-Email")))
        .unwrap_or_default()
}

fn resolve_license(meta: &MetadataMap) -> String {
    if let Some(expression) = non_empty(meta.get("License-Expression")) {
        return expression;
    }
    match non_empty(meta.get("License-File")) {
        Some(file) => format!("See the provided {file}"),
        None => String::new(),
    }
}

fn resolve_url(meta: &MetadataMap) -> String {
    let mut entries = meta.get_all("Project-Url");
    entries.sort_unstable();

    entries
        .into_iter()
        .filter_map(|entry| entry.split_once(','))
        .find(|(label, _)| URL_LABELS.contains(&normalize_label(label).as_str()))
        .map(|(_, url)| url.trim().to_string())
        .unwrap_or_default()
}

/// Lowercases a Project-Url label and strips punctuation and whitespace.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Joins the display names of an address list header.
///
/// `"Jane Doe" <jane@example.org>, John <john@example.org>` yields
/// `Jane Doe, John`. Returns `None` when no entry carries a name.
fn email_display_names(values: &[&str]) -> Option<String> {
    let names: Vec<String> = values
        .iter()
        .flat_map(|value| split_addresses(value))
        .map(|entry| {
            let display = entry.split('<').next().unwrap_or_default();
            display.trim().trim_matches('"').trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .collect();

    (!names.is_empty()).then(|| names.join(", "))
}

/// Splits an address list on commas outside double quotes.
fn split_addresses(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
