// src/lib.rs

//! Modman
//!
//! Mod manager for dedicated game servers backed by the Thunderstore
//! package registry.
//!
//! # Architecture
//!
//! - Registry client: fetches and caches the per-community package catalog
//! - Resolver: expands a mod into its dependency-ordered install list
//! - State store: durable JSON record of what is installed
//! - Installer: downloads, atomically extracts, and records each mod
//! - Manager: ties the pieces together behind the application-facing API

mod error;
pub mod installer;
pub mod manager;
pub mod registry;
pub mod resolver;
pub mod state;

pub use error::{Error, Result};
