// src/manager.rs

//! Application-facing mod management API
//!
//! Ties the registry client, resolver, state store, and installer together
//! behind the operations a front-end (CLI or web) calls: browse, search,
//! install with or without dependencies, uninstall, list installed.

use crate::error::Result;
use crate::installer::{InstallOutcome, Installer};
use crate::registry::{Community, PackageRecord, RegistryClient, SortKey};
use crate::resolver;
use crate::state::{InstalledEntry, StateStore};
use std::path::PathBuf;
use tracing::info;

/// Runtime configuration: where mods land and where state lives
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the game server loads mods from
    pub mods_dir: PathBuf,
    /// Directory holding the installed-state file
    pub data_dir: PathBuf,
}

impl Config {
    /// Read configuration from the environment
    ///
    /// `MODS_DIR` defaults to `/mods` and `DATA_DIR` to `/data`, matching
    /// the container layout this tool is usually deployed in.
    pub fn from_env() -> Self {
        Self {
            mods_dir: std::env::var_os("MODS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/mods")),
            data_dir: std::env::var_os("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/data")),
        }
    }
}

/// The mod manager: one instance per configured server
pub struct ModManager {
    registry: RegistryClient,
    installer: Installer,
}

impl ModManager {
    /// Create a manager for the given directories
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_registry(config, RegistryClient::new()?)
    }

    /// Create a manager using a specific registry client
    pub fn with_registry(config: &Config, registry: RegistryClient) -> Result<Self> {
        let store = StateStore::new(&config.data_dir);
        let installer = Installer::new(&config.mods_dir, store)?;

        Ok(Self {
            registry,
            installer,
        })
    }

    /// List the supported game communities
    pub fn communities(&self) -> &'static [Community] {
        crate::registry::communities()
    }

    /// The full package catalog for a community
    pub fn packages(&self, community_id: &str) -> Result<Vec<PackageRecord>> {
        Ok(self.registry.fetch_catalog(community_id)?.to_vec())
    }

    /// Search a community's catalog
    pub fn search(
        &self,
        community_id: &str,
        query: &str,
        sort: Option<SortKey>,
        categories: &[String],
    ) -> Result<Vec<PackageRecord>> {
        self.registry.search(community_id, query, sort, categories)
    }

    /// Install a mod, optionally expanding its dependency set first
    ///
    /// With dependencies, the resolved list installs strictly in
    /// dependencies-first order. A mod that cannot be found in the catalog
    /// yields a single failure outcome rather than an empty result, so the
    /// caller can tell it apart from a successful zero-dependency install.
    pub fn install(
        &self,
        community_id: &str,
        full_name: &str,
        with_dependencies: bool,
    ) -> Result<Vec<InstallOutcome>> {
        if with_dependencies {
            let catalog = self.registry.fetch_catalog(community_id)?;
            let resolved = resolver::resolve(&catalog, full_name);

            if resolved.is_empty() {
                return Ok(vec![InstallOutcome::failed(
                    full_name,
                    "not found in catalog",
                )]);
            }

            info!(
                "Resolved {} into {} package(s) to install",
                full_name,
                resolved.len()
            );
            self.installer.install_all(&resolved)
        } else {
            match self.registry.lookup(community_id, full_name)? {
                Some(pkg) => Ok(vec![self.installer.install(&pkg)?]),
                None => Ok(vec![InstallOutcome::failed(
                    full_name,
                    "not found in catalog",
                )]),
            }
        }
    }

    /// Uninstall a mod by its `Owner-Name` key
    pub fn uninstall(&self, full_name: &str) -> Result<InstallOutcome> {
        self.installer.uninstall(full_name)
    }

    /// List currently installed mods
    pub fn installed(&self) -> Result<Vec<InstalledEntry>> {
        self.installer.store().list()
    }
}
