// src/installer.rs

//! Artifact download and installation
//!
//! Each install is independent: download the mod's ZIP artifact, extract it
//! into a staging directory next to the final location, atomically rename
//! the staging directory into place, then record the mod in the state
//! store. A failed extraction discards the staging directory and never
//! touches the target, so an install is all-or-nothing on disk.

use crate::error::Result;
use crate::registry::PackageRecord;
use crate::state::{InstalledEntry, StateStore};
use reqwest::blocking::Client;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for artifact downloads (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-mod result of an install or uninstall
///
/// Expected-state mismatches (already installed, not installed) and
/// per-mod download/extraction failures are reported here rather than as
/// errors, so a batch of N requests always yields N outcomes.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub full_name: String,
    pub success: bool,
    pub message: String,
}

impl InstallOutcome {
    pub fn succeeded(full_name: &str, message: impl Into<String>) -> Self {
        Self {
            full_name: full_name.to_string(),
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(full_name: &str, message: impl Into<String>) -> Self {
        Self {
            full_name: full_name.to_string(),
            success: false,
            message: message.into(),
        }
    }
}

/// Downloads and installs mod artifacts under the mods root
pub struct Installer {
    mods_root: PathBuf,
    store: StateStore,
    client: Client,
}

impl Installer {
    /// Create an installer writing under `mods_root`, recording in `store`
    pub fn new(mods_root: &Path, store: StateStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| {
                crate::Error::Registry(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            mods_root: mods_root.to_path_buf(),
            store,
            client,
        })
    }

    /// The installed-state store backing this installer
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Install one mod: download, extract, record
    ///
    /// Returns a failure outcome (not an error) when the mod is already
    /// installed, has no downloadable artifact, or its download or
    /// extraction fails. State-store and staging I/O failures propagate as
    /// errors since they indicate the whole environment is unhealthy.
    pub fn install(&self, pkg: &PackageRecord) -> Result<InstallOutcome> {
        if self.store.contains(&pkg.full_name)? {
            return Ok(InstallOutcome::failed(&pkg.full_name, "already installed"));
        }

        if pkg.download_url.is_empty() {
            return Ok(InstallOutcome::failed(
                &pkg.full_name,
                "package has no downloadable artifact",
            ));
        }

        info!(
            "Installing {} {} from {}",
            pkg.full_name, pkg.latest_version, pkg.download_url
        );

        let bytes = match self.download(&pkg.download_url) {
            Ok(bytes) => bytes,
            Err(message) => return Ok(InstallOutcome::failed(&pkg.full_name, message)),
        };

        fs::create_dir_all(&self.mods_root)?;

        // Extract into a staging directory, then a single rename puts the
        // fully-populated directory in place.
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.mods_root)?;

        if let Err(e) = extract_zip(&bytes, staging.path()) {
            return Ok(InstallOutcome::failed(
                &pkg.full_name,
                format!("extraction failed: {}", e),
            ));
        }

        let target = self.mods_root.join(&pkg.full_name);

        // A leftover directory the store does not know about is replaced;
        // the store, not the filesystem, decides what is installed.
        if target.exists() {
            warn!(
                "Replacing unrecorded mod directory {}",
                target.display()
            );
            fs::remove_dir_all(&target)?;
        }

        // Extraction already succeeded; a failure here is a filesystem
        // problem with the target, not a bad archive.
        let staged = staging.into_path();
        if let Err(e) = fs::rename(&staged, &target) {
            let _ = fs::remove_dir_all(&staged);
            return Ok(InstallOutcome::failed(
                &pkg.full_name,
                format!("install failed: {}", e),
            ));
        }

        self.store.add(InstalledEntry {
            full_name: pkg.full_name.clone(),
            name: pkg.name.clone(),
            owner: pkg.owner.clone(),
            version: pkg.latest_version.clone(),
            icon: pkg.icon.clone(),
            installed_at: chrono::Utc::now().to_rfc3339(),
        })?;

        info!("Installed {} {}", pkg.full_name, pkg.latest_version);
        Ok(InstallOutcome::succeeded(
            &pkg.full_name,
            format!("installed {} {}", pkg.full_name, pkg.latest_version),
        ))
    }

    /// Install a resolved list strictly in order
    ///
    /// One mod's failure never prevents attempting the rest; the caller
    /// gets one outcome per requested mod.
    pub fn install_all(&self, packages: &[PackageRecord]) -> Result<Vec<InstallOutcome>> {
        let mut outcomes = Vec::with_capacity(packages.len());
        for pkg in packages {
            let outcome = self.install(pkg)?;
            if !outcome.success {
                debug!("Skipped {}: {}", outcome.full_name, outcome.message);
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Uninstall a mod: delete its directory, then drop its record
    ///
    /// Directory deletion is best-effort; a failure is logged and the
    /// record is removed regardless, so the store never claims a mod that
    /// the operator asked to remove.
    pub fn uninstall(&self, full_name: &str) -> Result<InstallOutcome> {
        if !self.store.contains(full_name)? {
            return Ok(InstallOutcome::failed(full_name, "not installed"));
        }

        let mod_dir = self.mods_root.join(full_name);
        match fs::remove_dir_all(&mod_dir) {
            Ok(()) => debug!("Removed mod directory {}", mod_dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Mod directory {} already absent", mod_dir.display());
            }
            Err(e) => warn!("Failed to remove mod directory {}: {}", mod_dir.display(), e),
        }

        self.store.remove(full_name)?;

        info!("Uninstalled {}", full_name);
        Ok(InstallOutcome::succeeded(
            full_name,
            format!("uninstalled {}", full_name),
        ))
    }

    /// Fetch artifact bytes; failures come back as a per-mod message
    fn download(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| format!("download failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("download failed: HTTP {}", response.status()));
        }

        let bytes = response
            .bytes()
            .map_err(|e| format!("download failed: {}", e))?;

        Ok(bytes.to_vec())
    }
}

/// Extract a ZIP archive into `dest`, preserving its internal structure
///
/// Entries whose paths would escape `dest` are skipped.
fn extract_zip(bytes: &[u8], dest: &Path) -> Result<()> {
    let cursor = Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let Some(rel_path) = file.enclosed_name() else {
            warn!("Skipping archive entry with unsafe path: {}", file.name());
            continue;
        };

        let dest_path = dest.join(rel_path);
        if file.is_dir() {
            fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&dest_path)?;
            io::copy(&mut file, &mut out)?;
        }
    }

    Ok(())
}
