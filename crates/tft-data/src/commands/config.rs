use crate::utils::config::{self, FusionConfig};
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;

fn print_entry(name: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("  {} {}", format!("{}:", name).bright_white(), value),
        None => println!(
            "  {} {}",
            format!("{}:", name).bright_white(),
            "(not set)".bright_yellow()
        ),
    }
}

/// Print the effective configuration, after command line overrides.
pub fn show_config(cfg: &FusionConfig, loaded_from: Option<&Utf8Path>) -> Result<()> {
    println!();
    print_entry("config_file", loaded_from.map(Utf8Path::as_str).or(Some("(defaults)")));
    print_entry("community_dragon", Some(cfg.community_dragon.as_str()));
    print_entry(
        "data_dragon",
        Some(cfg.data_dragon.as_deref().unwrap_or("(latest)")),
    );
    print_entry("set", cfg.set.as_deref());
    print_entry("languages", Some(cfg.languages.join(", ").as_str()));
    print_entry("output_dir", Some(cfg.output_dir.as_str()));

    match &cfg.overrides_dir {
        Some(dir) => {
            let status = if dir.is_dir() {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!(
                "  {} {} {}",
                "overrides_dir:".bright_white(),
                dir,
                status
            );
        }
        None => print_entry("overrides_dir", None),
    }

    println!();
    Ok(())
}

/// Write a configuration file with default values.
pub fn init_config(path: Option<&Utf8Path>) -> Result<()> {
    let path: Utf8PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => config::default_config_path()
            .ok_or_else(|| miette::miette!("Could not determine config path"))?,
    };

    if path.exists() {
        return Err(miette::miette!(
            help = "Edit the existing file or remove it first",
            "Configuration file already exists: {}",
            path
        ));
    }

    config::save_config(&path, &FusionConfig::default())
        .map_err(|e| miette::miette!("Failed to save config: {}", e))?;

    println!(
        "{}",
        "✓ Configuration file created".bright_green().bold()
    );
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), path);
    println!();
    println!(
        "  {}",
        "Set `set` to the current set mutator (e.g. TFTSet10) before running 'tft-data fuse'"
            .bright_cyan()
    );

    Ok(())
}
