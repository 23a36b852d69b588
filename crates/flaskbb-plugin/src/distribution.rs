//! Installed distributions and their entry points.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Core-metadata headers of a distribution.
///
/// Keys compare case-insensitively and may repeat (`Project-Url`,
/// `License-File`, `Classifier`, ...). Insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMap {
    entries: Vec<(String, String)>,
}

impl MetadataMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_string(), value.to_string()));
    }

    /// Appends a header, builder style.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the first value of a header.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value of a header in order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns whether a header is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no headers are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A record naming an importable object under a group label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Entry-point name; becomes the plugin's canonical name.
    pub name: String,
    /// Group label, e.g. `flaskbb_plugins`.
    pub group: String,
    /// Object reference in `module:attr` form.
    pub value: String,
}

impl EntryPoint {
    /// Creates an entry point.
    pub fn new(group: &str, name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            value: value.to_string(),
        }
    }

    /// Module part of the value.
    pub fn module(&self) -> &str {
        self.value
            .split_once(':')
            .map_or(self.value.as_str(), |(module, _)| module)
            .trim()
    }

    /// Attribute part of the value, if any. Extras (`[...]`) are dropped.
    pub fn attr(&self) -> Option<&str> {
        self.value.split_once(':').map(|(_, attr)| {
            attr.split_once('[')
                .map_or(attr, |(attr, _)| attr)
                .trim()
        })
    }
}

/// An installed package: the source of metadata and entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Distribution name.
    pub name: String,
    /// Declared version.
    pub version: String,
    /// Core metadata headers.
    pub metadata: MetadataMap,
    /// Declared entry points.
    pub entry_points: Vec<EntryPoint>,
}

impl Distribution {
    /// Creates a distribution with `Name` and `Version` headers set.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            metadata: MetadataMap::new()
                .with("Metadata-Version", "2.1")
                .with("Name", name)
                .with("Version", version),
            entry_points: Vec::new(),
        }
    }

    /// Builds a distribution from parsed metadata headers.
    ///
    /// Returns `None` when `Name` or `Version` is missing.
    pub fn from_metadata(metadata: MetadataMap, entry_points: Vec<EntryPoint>) -> Option<Self> {
        let name = metadata.get("Name")?.trim().to_string();
        let version = metadata.get("Version")?.trim().to_string();
        Some(Self {
            name,
            version,
            metadata,
            entry_points,
        })
    }

    /// Appends a metadata header.
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Appends an entry point.
    pub fn with_entry_point(mut self, group: &str, name: &str, value: &str) -> Self {
        self.entry_points.push(EntryPoint::new(group, name, value));
        self
    }

    /// Entry points of one group.
    pub fn entry_points_in<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a EntryPoint> {
        self.entry_points.iter().filter(move |ep| ep.group == group)
    }
}

/// Shared view of the distribution a plugin was loaded from.
#[derive(Clone, PartialEq, Eq)]
pub struct DistFacade(Arc<Distribution>);

impl DistFacade {
    /// Wraps a distribution.
    pub fn new(dist: Arc<Distribution>) -> Self {
        Self(dist)
    }

    /// Distribution name.
    pub fn project_name(&self) -> &str {
        &self.0.name
    }

    /// Declared version.
    pub fn version(&self) -> &str {
        &self.0.version
    }

    /// Core metadata headers.
    pub fn metadata(&self) -> &MetadataMap {
        &self.0.metadata
    }

    /// The wrapped distribution.
    pub fn distribution(&self) -> &Arc<Distribution> {
        &self.0
    }
}

impl fmt::Debug for DistFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistFacade")
            .field("project_name", &self.project_name())
            .field("version", &self.version())
            .finish()
    }
}

/// Enumerates installed distributions.
pub trait DistributionSource: Send + Sync + fmt::Debug {
    /// Every distribution currently installed.
    fn distributions(&self) -> Vec<Arc<Distribution>>;
}

/// Distributions supplied directly by the host.
#[derive(Debug, Clone, Default)]
pub struct InstalledDistributions {
    dists: Vec<Arc<Distribution>>,
}

impl InstalledDistributions {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a distribution, builder style.
    pub fn with(mut self, dist: Distribution) -> Self {
        self.push(dist);
        self
    }

    /// Adds a distribution.
    pub fn push(&mut self, dist: Distribution) {
        self.dists.push(Arc::new(dist));
    }
}

impl DistributionSource for InstalledDistributions {
    fn distributions(&self) -> Vec<Arc<Distribution>> {
        self.dists.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_keys_are_case_insensitive_and_repeatable() {
        let meta = MetadataMap::new()
            .with("Project-URL", "Homepage, https://flaskbb.org")
            .with("project-url", "Source, https://github.com/flaskbb/flaskbb");
        assert_eq!(meta.get("Project-Url"), Some("Homepage, https://flaskbb.org"));
        assert_eq!(meta.get_all("PROJECT-URL").len(), 2);
        assert!(!meta.contains("Summary"));
    }

    #[test]
    fn test_entry_point_value_parts() {
        let ep = EntryPoint::new("flaskbb_plugins", "portal", "flaskbb_portal.plugin : PortalPlugin [extra]");
        assert_eq!(ep.module(), "flaskbb_portal.plugin");
        assert_eq!(ep.attr(), Some("PortalPlugin"));

        let module_only = EntryPoint::new("flaskbb_plugins", "portal", "flaskbb_portal");
        assert_eq!(module_only.module(), "flaskbb_portal");
        assert_eq!(module_only.attr(), None);
    }

    #[test]
    fn test_from_metadata_requires_name_and_version() {
        let meta = MetadataMap::new().with("Name", "flaskbb-portal");
        assert!(Distribution::from_metadata(meta.clone(), Vec::new()).is_none());

        let dist = Distribution::from_metadata(meta.with("Version", "1.0"), Vec::new()).unwrap();
        assert_eq!(dist.name, "flaskbb-portal");
        assert_eq!(dist.version, "1.0");
    }
}
