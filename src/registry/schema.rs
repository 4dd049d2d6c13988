// src/registry/schema.rs

//! Raw Thunderstore API types and their transform into catalog records
//!
//! The registry's `GET /c/<slug>/api/v1/package/` endpoint returns an array
//! of packages, each carrying its full version history. Only the latest
//! version (`versions[0]`) is installable; older versions contribute nothing
//! but their download counts.

use serde::{Deserialize, Serialize};

/// A package as returned by the registry, version history included
#[derive(Debug, Deserialize)]
pub struct ApiPackage {
    pub uuid4: String,
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub rating_score: i64,
    #[serde(default)]
    pub categories: Vec<String>,
    pub is_deprecated: bool,
    pub date_updated: String,
    #[serde(default)]
    pub versions: Vec<ApiVersion>,
}

/// One published version of a package
#[derive(Debug, Deserialize)]
pub struct ApiVersion {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub version_number: String,
    pub download_url: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A catalog entry: one package flattened to its latest version
///
/// `full_name` (`"<Owner>-<Name>"`) is the composite key used for lookup,
/// dependency resolution, and the on-disk mod directory name.
#[derive(Debug, Clone, Serialize)]
pub struct PackageRecord {
    pub uuid: String,
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub description: String,
    pub icon: String,
    pub latest_version: String,
    pub download_url: String,
    pub downloads: u64,
    pub rating: i64,
    pub categories: Vec<String>,
    pub dependencies: Vec<String>,
    pub is_deprecated: bool,
    pub date_updated: String,
}

impl From<ApiPackage> for PackageRecord {
    fn from(pkg: ApiPackage) -> Self {
        let downloads = pkg.versions.iter().map(|v| v.downloads).sum();
        let latest = pkg.versions.into_iter().next();

        // A package with no published versions still appears in the
        // catalog; it simply has nothing to download.
        let (description, icon, latest_version, download_url, dependencies) = match latest {
            Some(v) => (
                v.description,
                v.icon,
                v.version_number,
                v.download_url,
                v.dependencies,
            ),
            None => Default::default(),
        };

        Self {
            uuid: pkg.uuid4,
            name: pkg.name,
            full_name: pkg.full_name,
            owner: pkg.owner,
            description,
            icon,
            latest_version,
            download_url,
            downloads,
            rating: pkg.rating_score,
            categories: pkg.categories,
            dependencies,
            is_deprecated: pkg.is_deprecated,
            date_updated: pkg.date_updated,
        }
    }
}
