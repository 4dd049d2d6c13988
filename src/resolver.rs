// src/resolver.rs

//! Dependency resolution over a catalog snapshot
//!
//! Registry dependency references are flat strings of the form
//! `"<Owner>-<Name>-<Version>"`. Resolution expands a root package into the
//! deduplicated, dependencies-first list of catalog records to install.

use crate::registry::PackageRecord;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A structured reference to a mod, parsed from a registry string
///
/// The version suffix is informational only; resolution keys on the
/// `Owner-Name` base. Note the registry format is ambiguous for a mod whose
/// name itself ends in a dotted-numeric segment; such a name would be
/// misread as a version. No such package has been observed on the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl ModRef {
    /// Parse a reference string, peeling a trailing version segment if present
    ///
    /// `"Owner-Some-Mod-1.2.3"` parses to owner `Owner`, name `Some-Mod`,
    /// version `1.2.3`; `"Owner-Some-Mod"` leaves the version unset.
    /// Returns `None` when there is no `Owner-Name` structure to extract.
    pub fn parse(reference: &str) -> Option<Self> {
        let (base, version) = match reference.rsplit_once('-') {
            Some((head, tail)) if is_version(tail) => (head, Some(tail.to_string())),
            _ => (reference, None),
        };

        let (owner, name) = base.split_once('-')?;
        if owner.is_empty() || name.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version,
        })
    }

    /// The `Owner-Name` composite key this reference resolves against
    pub fn base_key(&self) -> String {
        format!("{}-{}", self.owner, self.name)
    }
}

/// A trailing segment counts as a version when it is dotted digits (`1.2.3`)
fn is_version(segment: &str) -> bool {
    segment.contains('.')
        && segment
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Traversal frame: expand a reference, or emit a fully-expanded package
enum Frame<'a> {
    Enter(String),
    Exit(&'a PackageRecord),
}

/// Expand a root package into its dependency-ordered install list
///
/// Depth-first over the catalog's dependency references: every dependency
/// precedes its dependent, each package appears at most once, and a cycle
/// degenerates to "already visited". References that do not resolve within
/// the catalog are omitted; an unknown root therefore yields an empty list.
pub fn resolve(catalog: &[PackageRecord], root: &str) -> Vec<PackageRecord> {
    let index: HashMap<&str, &PackageRecord> = catalog
        .iter()
        .map(|pkg| (pkg.full_name.as_str(), pkg))
        .collect();

    let root_key = match ModRef::parse(root) {
        Some(mod_ref) => mod_ref.base_key(),
        None => root.to_string(),
    };

    let mut visited: HashSet<String> = HashSet::new();
    let mut order: Vec<PackageRecord> = Vec::new();
    let mut stack: Vec<Frame<'_>> = vec![Frame::Enter(root_key)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(key) => {
                if !visited.insert(key.clone()) {
                    continue;
                }

                let Some(pkg) = index.get(key.as_str()).copied() else {
                    debug!("Reference '{}' not in catalog, skipping", key);
                    continue;
                };

                // Emit this package only after its dependencies
                stack.push(Frame::Exit(pkg));
                for dep in pkg.dependencies.iter().rev() {
                    if let Some(mod_ref) = ModRef::parse(dep) {
                        stack.push(Frame::Enter(mod_ref.base_key()));
                    } else {
                        debug!("Ignoring malformed dependency reference '{}'", dep);
                    }
                }
            }
            Frame::Exit(pkg) => order.push(pkg.clone()),
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(full_name: &str, dependencies: &[&str]) -> PackageRecord {
        let (owner, name) = full_name.split_once('-').unwrap();
        PackageRecord {
            uuid: full_name.to_string(),
            name: name.to_string(),
            full_name: full_name.to_string(),
            owner: owner.to_string(),
            description: String::new(),
            icon: String::new(),
            latest_version: "1.0.0".to_string(),
            download_url: format!("https://example.com/{}.zip", full_name),
            downloads: 0,
            rating: 0,
            categories: Vec::new(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            is_deprecated: false,
            date_updated: String::new(),
        }
    }

    fn names(resolved: &[PackageRecord]) -> Vec<&str> {
        resolved.iter().map(|p| p.full_name.as_str()).collect()
    }

    #[test]
    fn test_parse_reference_with_version() {
        let mod_ref = ModRef::parse("bbepis-BepInExPack-5.4.21").unwrap();
        assert_eq!(mod_ref.owner, "bbepis");
        assert_eq!(mod_ref.name, "BepInExPack");
        assert_eq!(mod_ref.version.as_deref(), Some("5.4.21"));
        assert_eq!(mod_ref.base_key(), "bbepis-BepInExPack");
    }

    #[test]
    fn test_parse_reference_without_version() {
        let mod_ref = ModRef::parse("Owner-ModName").unwrap();
        assert_eq!(mod_ref.base_key(), "Owner-ModName");
        assert!(mod_ref.version.is_none());
    }

    #[test]
    fn test_parse_keeps_hyphenated_names_whole() {
        // The name itself contains '-'; only the version is peeled off
        let mod_ref = ModRef::parse("Owner-Some-Long-Mod-1.0.0").unwrap();
        assert_eq!(mod_ref.owner, "Owner");
        assert_eq!(mod_ref.name, "Some-Long-Mod");
        assert_eq!(mod_ref.base_key(), "Owner-Some-Long-Mod");
    }

    #[test]
    fn test_parse_rejects_unstructured_strings() {
        assert!(ModRef::parse("justoneword").is_none());
        assert!(ModRef::parse("").is_none());
        assert!(ModRef::parse("-Name").is_none());
    }

    #[test]
    fn test_resolve_orders_dependencies_first() {
        let catalog = vec![
            package("Owner-A", &["Owner-B-1.0.0", "Owner-C-1.0.0"]),
            package("Owner-B", &["Owner-C-1.0.0"]),
            package("Owner-C", &[]),
        ];

        let resolved = resolve(&catalog, "Owner-A");
        assert_eq!(names(&resolved), vec!["Owner-C", "Owner-B", "Owner-A"]);
    }

    #[test]
    fn test_resolve_terminates_on_cycles() {
        let catalog = vec![
            package("Owner-A", &["Owner-B-1.0.0"]),
            package("Owner-B", &["Owner-A-1.0.0"]),
        ];

        let resolved = resolve(&catalog, "Owner-A");
        assert_eq!(names(&resolved), vec!["Owner-B", "Owner-A"]);
    }

    #[test]
    fn test_resolve_omits_missing_dependencies() {
        let catalog = vec![package("Owner-A", &["Elsewhere-NotHere-2.0.0"])];

        let resolved = resolve(&catalog, "Owner-A");
        assert_eq!(names(&resolved), vec!["Owner-A"]);
    }

    #[test]
    fn test_resolve_unknown_root_yields_empty_list() {
        let catalog = vec![package("Owner-A", &[])];

        let resolved = resolve(&catalog, "Owner-Missing");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_resolve_self_dependency_is_a_noop() {
        let catalog = vec![package("Owner-A", &["Owner-A-1.0.0"])];

        let resolved = resolve(&catalog, "Owner-A");
        assert_eq!(names(&resolved), vec!["Owner-A"]);
    }

    #[test]
    fn test_resolve_deduplicates_shared_dependencies() {
        let catalog = vec![
            package("Owner-Root", &["Owner-Left-1.0.0", "Owner-Right-1.0.0"]),
            package("Owner-Left", &["Owner-Shared-1.0.0"]),
            package("Owner-Right", &["Owner-Shared-1.0.0"]),
            package("Owner-Shared", &[]),
        ];

        let resolved = resolve(&catalog, "Owner-Root");
        assert_eq!(
            names(&resolved),
            vec!["Owner-Shared", "Owner-Left", "Owner-Right", "Owner-Root"]
        );
    }
}
