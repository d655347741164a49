//! `config` command handlers.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Subcommand;

use mshmap_core::AnalyticsConfig;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Load and validate the analytics configuration
    Check {
        /// YAML file to check; built-in defaults when omitted
        #[arg(long, env = "MSHMAP_ANALYTICS_CONFIG")]
        path: Option<PathBuf>,
    },
}

pub(crate) fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Check { path } => {
            let config = mshmap_core::load_analytics_config_or_default(path.as_deref())?;
            match &path {
                Some(p) => println!("{} is valid", p.display()),
                None => println!("built-in defaults are valid"),
            }
            print!("{}", describe_config(&config));
        }
    }
    Ok(())
}

/// Human-readable overview of a validated analytics config.
pub(crate) fn describe_config(config: &AnalyticsConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "region: {}", config.region_name);
    let _ = writeln!(out, "cities: {}", config.cities.len());
    for city in &config.cities {
        let scope = if city.in_region { "" } else { " (outside region)" };
        let _ = writeln!(
            out,
            "  {} [{}] pop {} at {:.4},{:.4}{scope}",
            city.name,
            city.slug(),
            city.population,
            city.latitude,
            city.longitude
        );
    }
    let _ = writeln!(out, "coverage targets: {}", config.coverage.targets.len());
    let _ = writeln!(out, "category gap rules: {}", config.category_gaps.len());
    out
}
