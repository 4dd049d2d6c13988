// src/registry/mod.rs

//! Registry client for the Thunderstore package catalog
//!
//! This module provides functionality for:
//! - The static table of supported game communities
//! - Fetching a community's package catalog over HTTP
//! - Caching catalog snapshots with a fixed time-to-live
//! - Lookup and search over the cached catalog

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod schema;

pub use schema::PackageRecord;

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a fetched catalog snapshot stays valid
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Registry base URL
const THUNDERSTORE_BASE: &str = "https://thunderstore.io";

/// A game community whose mod catalog can be browsed
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Community {
    pub id: &'static str,
    pub name: &'static str,
    pub slug: &'static str,
}

/// Supported game communities
const COMMUNITIES: &[Community] = &[
    Community { id: "valheim", name: "Valheim", slug: "valheim" },
    Community { id: "lethal_company", name: "Lethal Company", slug: "lethal-company" },
    Community { id: "risk_of_rain_2", name: "Risk of Rain 2", slug: "riskofrain2" },
    Community { id: "content_warning", name: "Content Warning", slug: "content-warning" },
    Community { id: "gtfo", name: "GTFO", slug: "gtfo" },
    Community { id: "vintage_story", name: "Vintage Story", slug: "vintagestory" },
];

/// List the supported communities
pub fn communities() -> &'static [Community] {
    COMMUNITIES
}

/// Resolve a community id to its registry URL slug
fn community_slug(community_id: &str) -> Result<&'static str> {
    COMMUNITIES
        .iter()
        .find(|c| c.id == community_id)
        .map(|c| c.slug)
        .ok_or_else(|| Error::UnknownCommunity(community_id.to_string()))
}

/// Sort order for catalog search results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Downloads,
    Rating,
    Updated,
    Name,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "downloads" => Ok(SortKey::Downloads),
            "rating" => Ok(SortKey::Rating),
            "updated" => Ok(SortKey::Updated),
            "name" => Ok(SortKey::Name),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

/// One cached catalog snapshot
struct CacheEntry {
    fetched_at: Instant,
    packages: Arc<Vec<PackageRecord>>,
}

/// HTTP client for the package registry with a per-community catalog cache
///
/// Snapshots are shared as `Arc` and replaced wholesale on refresh, so a
/// reader never observes a half-updated catalog.
pub struct RegistryClient {
    client: Client,
    base_url: String,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl RegistryClient {
    /// Create a client against the public Thunderstore registry
    pub fn new() -> Result<Self> {
        Self::with_base_url(THUNDERSTORE_BASE)
    }

    /// Create a client against an alternate registry base URL
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Registry(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_ttl: CACHE_TTL,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Override the catalog cache time-to-live
    pub fn set_cache_ttl(&mut self, ttl: Duration) {
        self.cache_ttl = ttl;
    }

    /// Fetch the package catalog for a community
    ///
    /// Returns the cached snapshot when it is younger than the TTL;
    /// otherwise fetches a fresh catalog and replaces the cache entry.
    pub fn fetch_catalog(&self, community_id: &str) -> Result<Arc<Vec<PackageRecord>>> {
        let slug = community_slug(community_id)?;

        if let Some(entry) = self
            .cache
            .lock()
            .expect("catalog cache lock poisoned")
            .get(community_id)
        {
            if entry.fetched_at.elapsed() < self.cache_ttl {
                debug!("Catalog cache hit for community '{}'", community_id);
                return Ok(Arc::clone(&entry.packages));
            }
        }

        let url = format!("{}/c/{}/api/v1/package/", self.base_url, slug);
        info!("Fetching package catalog from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Registry(format!("Failed to fetch catalog: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Registry(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let raw: Vec<schema::ApiPackage> = response
            .json()
            .map_err(|e| Error::Registry(format!("Failed to parse catalog JSON: {}", e)))?;

        let packages: Arc<Vec<PackageRecord>> =
            Arc::new(raw.into_iter().map(PackageRecord::from).collect());

        info!(
            "Fetched {} packages for community '{}'",
            packages.len(),
            community_id
        );

        self.cache
            .lock()
            .expect("catalog cache lock poisoned")
            .insert(
                community_id.to_string(),
                CacheEntry {
                    fetched_at: Instant::now(),
                    packages: Arc::clone(&packages),
                },
            );

        Ok(packages)
    }

    /// Find a package by its `Owner-Name` composite key
    pub fn lookup(&self, community_id: &str, full_name: &str) -> Result<Option<PackageRecord>> {
        let catalog = self.fetch_catalog(community_id)?;
        Ok(catalog.iter().find(|p| p.full_name == full_name).cloned())
    }

    /// Search the catalog by substring, with optional category filter and sort
    pub fn search(
        &self,
        community_id: &str,
        query: &str,
        sort: Option<SortKey>,
        categories: &[String],
    ) -> Result<Vec<PackageRecord>> {
        let catalog = self.fetch_catalog(community_id)?;
        Ok(filter_and_sort(&catalog, query, sort, categories))
    }
}

/// Apply the search query, category filter, and sort to a catalog snapshot
fn filter_and_sort(
    packages: &[PackageRecord],
    query: &str,
    sort: Option<SortKey>,
    categories: &[String],
) -> Vec<PackageRecord> {
    let query = query.to_lowercase();

    let mut results: Vec<PackageRecord> = packages
        .iter()
        .filter(|pkg| {
            query.is_empty()
                || pkg.name.to_lowercase().contains(&query)
                || pkg.owner.to_lowercase().contains(&query)
                || pkg.description.to_lowercase().contains(&query)
        })
        .filter(|pkg| {
            categories.is_empty() || pkg.categories.iter().any(|c| categories.contains(c))
        })
        .cloned()
        .collect();

    match sort {
        Some(SortKey::Downloads) => results.sort_by(|a, b| b.downloads.cmp(&a.downloads)),
        Some(SortKey::Rating) => results.sort_by(|a, b| b.rating.cmp(&a.rating)),
        // RFC 3339 timestamps order correctly as strings
        Some(SortKey::Updated) => results.sort_by(|a, b| b.date_updated.cmp(&a.date_updated)),
        Some(SortKey::Name) => results.sort_by(|a, b| a.name.cmp(&b.name)),
        None => {}
    }

    results
}
