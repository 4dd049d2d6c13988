// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use modman::manager::{Config, ModManager};
use modman::registry::SortKey;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "modman")]
#[command(author, version, about = "Thunderstore mod manager for dedicated game servers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported game communities
    Communities,
    /// Browse or search a community's mod catalog
    List {
        /// Community id (see `modman communities`)
        community: String,
        /// Substring to match against name, owner, or description
        #[arg(short, long, default_value = "")]
        search: String,
        /// Sort order: downloads, rating, updated, or name
        #[arg(long)]
        sort: Option<String>,
        /// Only show mods in this category (repeatable)
        #[arg(long)]
        category: Vec<String>,
        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
    /// Install a mod and, by default, its dependencies
    Install {
        /// Community id
        community: String,
        /// Mod to install, as Owner-Name
        package: String,
        /// Install only the named mod, skipping dependency resolution
        #[arg(long)]
        no_deps: bool,
        /// Mods directory (default: $MODS_DIR or /mods)
        #[arg(long)]
        mods_dir: Option<PathBuf>,
        /// Data directory (default: $DATA_DIR or /data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Uninstall a mod
    Uninstall {
        /// Mod to remove, as Owner-Name
        package: String,
        /// Mods directory (default: $MODS_DIR or /mods)
        #[arg(long)]
        mods_dir: Option<PathBuf>,
        /// Data directory (default: $DATA_DIR or /data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List installed mods
    Installed {
        /// Data directory (default: $DATA_DIR or /data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Build a Config from flags, falling back to the environment defaults
fn build_config(mods_dir: Option<PathBuf>, data_dir: Option<PathBuf>) -> Config {
    let mut config = Config::from_env();
    if let Some(dir) = mods_dir {
        config.mods_dir = dir;
    }
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    config
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Communities) => {
            let manager = ModManager::new(&Config::from_env())?;
            println!("Supported communities:");
            for community in manager.communities() {
                println!("  {} - {} ({})", community.id, community.name, community.slug);
            }
            Ok(())
        }
        Some(Commands::List {
            community,
            search,
            sort,
            category,
            limit,
        }) => {
            let sort = sort
                .map(|s| s.parse::<SortKey>())
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;

            let manager = ModManager::new(&Config::from_env())?;
            let results = manager.search(&community, &search, sort, &category)?;

            if results.is_empty() {
                println!("No mods found.");
            } else {
                for pkg in results.iter().take(limit) {
                    print!(
                        "  {} {} ({} downloads)",
                        pkg.full_name, pkg.latest_version, pkg.downloads
                    );
                    if pkg.is_deprecated {
                        print!(" [deprecated]");
                    }
                    println!();
                }
                println!("\nTotal: {} mod(s)", results.len());
            }

            Ok(())
        }
        Some(Commands::Install {
            community,
            package,
            no_deps,
            mods_dir,
            data_dir,
        }) => {
            info!("Installing mod: {}", package);

            let config = build_config(mods_dir, data_dir);
            let manager = ModManager::new(&config)?;
            let outcomes = manager.install(&community, &package, !no_deps)?;

            let mut failures = 0;
            for outcome in &outcomes {
                if outcome.success {
                    println!("  installed {}", outcome.full_name);
                } else {
                    println!("  skipped {}: {}", outcome.full_name, outcome.message);
                    failures += 1;
                }
            }
            println!(
                "\n{} installed, {} skipped or failed",
                outcomes.len() - failures,
                failures
            );

            Ok(())
        }
        Some(Commands::Uninstall {
            package,
            mods_dir,
            data_dir,
        }) => {
            info!("Uninstalling mod: {}", package);

            let config = build_config(mods_dir, data_dir);
            let manager = ModManager::new(&config)?;
            let outcome = manager.uninstall(&package)?;

            if outcome.success {
                println!("Uninstalled {}", outcome.full_name);
            } else {
                println!("Could not uninstall {}: {}", outcome.full_name, outcome.message);
            }

            Ok(())
        }
        Some(Commands::Installed { data_dir }) => {
            let config = build_config(None, data_dir);
            let manager = ModManager::new(&config)?;
            let installed = manager.installed()?;

            if installed.is_empty() {
                println!("No mods installed.");
            } else {
                println!("Installed mods:");
                for entry in &installed {
                    println!(
                        "  {} {} (installed {})",
                        entry.full_name, entry.version, entry.installed_at
                    );
                }
                println!("\nTotal: {} mod(s)", installed.len());
            }

            Ok(())
        }
        None => {
            // No command provided, show help
            println!("Modman v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'modman --help' for usage information");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_flag_overrides_env_default() {
        let config = build_config(Some(PathBuf::from("/srv/mods")), None);
        assert_eq!(config.mods_dir, PathBuf::from("/srv/mods"));
    }

    #[test]
    fn test_cli_parses_install_with_no_deps() {
        let cli = Cli::parse_from(["modman", "install", "valheim", "Owner-Mod", "--no-deps"]);
        match cli.command {
            Some(Commands::Install {
                community,
                package,
                no_deps,
                ..
            }) => {
                assert_eq!(community, "valheim");
                assert_eq!(package, "Owner-Mod");
                assert!(no_deps);
            }
            _ => panic!("expected install command"),
        }
    }
}
