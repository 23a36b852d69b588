//! Filesystem discovery of installed distributions.
//!
//! Scans a directory for `*.dist-info` (and legacy `*.egg-info`) folders and
//! reads their core metadata and entry points.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::distribution::{Distribution, DistributionSource, EntryPoint, MetadataMap};
use crate::error::{PluginError, PluginResult};

/// Distributions installed under one directory.
#[derive(Debug, Clone)]
pub struct DistInfoDirectory {
    root: PathBuf,
}

impl DistInfoDirectory {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The scanned directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn metadata_dirs(&self) -> Vec<(PathBuf, &'static str)> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    path = %self.root.display(),
                    error = %e,
                    "Plugin directory not readable"
                );
                return Vec::new();
            }
        };

        let mut dirs: Vec<(PathBuf, &'static str)> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                if name.ends_with(".dist-info") {
                    Some((path, "METADATA"))
                } else if name.ends_with(".egg-info") {
                    Some((path, "PKG-INFO"))
                } else {
                    None
                }
            })
            .collect();
        dirs.sort();
        dirs
    }
}

impl DistributionSource for DistInfoDirectory {
    fn distributions(&self) -> Vec<Arc<Distribution>> {
        self.metadata_dirs()
            .into_iter()
            .filter_map(|(path, metadata_file)| match read_distribution(&path, metadata_file) {
                Ok(dist) => {
                    debug!(
                        path = %path.display(),
                        distribution = %dist.name,
                        version = %dist.version,
                        "Distribution found"
                    );
                    Some(Arc::new(dist))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping distribution");
                    None
                }
            })
            .collect()
    }
}

/// Reads one metadata folder.
pub fn read_distribution(dir: &Path, metadata_file: &str) -> PluginResult<Distribution> {
    let metadata_path = dir.join(metadata_file);
    let text = fs::read_to_string(&metadata_path).map_err(|e| PluginError::Metadata {
        path: metadata_path.display().to_string(),
        reason: e.to_string(),
    })?;
    let metadata = parse_metadata(&text);

    let entry_points_path = dir.join("entry_points.txt");
    let entry_points = match fs::read_to_string(&entry_points_path) {
        Ok(text) => parse_entry_points(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            return Err(PluginError::Metadata {
                path: entry_points_path.display().to_string(),
                reason: e.to_string(),
            });
        }
    };

    Distribution::from_metadata(metadata, entry_points).ok_or_else(|| PluginError::Metadata {
        path: metadata_path.display().to_string(),
        reason: "missing Name or Version header".to_string(),
    })
}

/// Parses core-metadata headers.
///
/// Headers end at the first blank line; the message body (the long
/// description) is ignored. Lines starting with whitespace continue the
/// previous header.
pub fn parse_metadata(text: &str) -> MetadataMap {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push('\n');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let mut metadata = MetadataMap::new();
    for (key, value) in &headers {
        metadata.insert(key, value);
    }
    metadata
}

/// Parses an `entry_points.txt` file.
pub fn parse_entry_points(text: &str) -> Vec<EntryPoint> {
    let mut group: Option<&str> = None;
    let mut entry_points = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            group = Some(section.trim());
            continue;
        }
        let (Some(group), Some((name, value))) = (group, line.split_once('=')) else {
            continue;
        };
        entry_points.push(EntryPoint::new(group, name.trim(), value.trim()));
    }
    entry_points
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = "Metadata-Version: 2.1
Name: flaskbb-plugin-portal
Version: 1.1.3
Summary: A Portal Plugin for FlaskBB
Author-email: Peter Justin <peter.justin@outlook.com>
License-Expression: BSD-3-Clause
Project-URL: Source Code, https://github.com/flaskbb/flaskbb-plugin-portal
Description: first line
        second line

# Portal

Long description: not a header.
";

    const ENTRY_POINTS: &str = "[console_scripts]
portal-admin = portal.cli:main

; comment
[flaskbb_plugins]
portal = portal
# another comment
";

    #[test]
    fn test_parse_metadata_headers_only() {
        let meta = parse_metadata(METADATA);
        assert_eq!(meta.get("Name"), Some("flaskbb-plugin-portal"));
        assert_eq!(meta.get("Author-Email"), Some("Peter Justin <peter.justin@outlook.com>"));
        assert_eq!(meta.get("Description"), Some("first line\nsecond line"));
        assert!(!meta.contains("Long description"));
    }

    #[test]
    fn test_parse_entry_points_groups() {
        let eps = parse_entry_points(ENTRY_POINTS);
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[0], EntryPoint::new("console_scripts", "portal-admin", "portal.cli:main"));
        assert_eq!(eps[1], EntryPoint::new("flaskbb_plugins", "portal", "portal"));
    }

    #[test]
    fn test_directory_scan() {
        let root = tempfile::tempdir().unwrap();
        let good = root.path().join("flaskbb_plugin_portal-1.1.3.dist-info");
        fs::create_dir(&good).unwrap();
        fs::write(good.join("METADATA"), METADATA).unwrap();
        fs::write(good.join("entry_points.txt"), ENTRY_POINTS).unwrap();

        let broken = root.path().join("broken-0.1.dist-info");
        fs::create_dir(&broken).unwrap();
        fs::write(broken.join("METADATA"), "Summary: no name\n").unwrap();

        fs::create_dir(root.path().join("portal")).unwrap();

        let dists = DistInfoDirectory::new(root.path()).distributions();
        assert_eq!(dists.len(), 1);
        assert_eq!(dists[0].name, "flaskbb-plugin-portal");
        assert_eq!(dists[0].version, "1.1.3");
        assert_eq!(dists[0].entry_points_in("flaskbb_plugins").count(), 1);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let root = tempfile::tempdir().unwrap();
        let source = DistInfoDirectory::new(root.path().join("absent"));
        assert!(source.distributions().is_empty());
    }
}
