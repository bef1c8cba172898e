use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::{ArgAction, ColorChoice};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{fuse_datasets, init_config, show_config, FuseArgs};
use errors::CliError;
use fetch::{HttpFeeds, LocalFeeds};
use miette::Result;
use utils::config::{self, ConfigOverrides};

mod commands;
mod errors;
mod fetch;
mod icons;
mod persist;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The path to the configuration file (defaults to tft-data.toml next to the executable)
    #[arg(short, long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Log details of every pass
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Selection shared by the fusing commands. Each flag overrides the config file.
#[derive(clap::Args, Debug)]
struct SelectionArgs {
    /// The set mutator whose champions and traits are fused, e.g. TFTSet10
    #[arg(short, long)]
    set: Option<String>,

    /// A language to fuse, e.g. en_us (repeatable)
    #[arg(short, long = "language")]
    languages: Vec<String>,

    /// The directory to write datasets to
    #[arg(short, long)]
    output_dir: Option<Utf8PathBuf>,

    /// The directory holding per-release override rules
    #[arg(long)]
    overrides_dir: Option<Utf8PathBuf>,

    /// Community Dragon version used for the catalog and icon URLs
    #[arg(long)]
    community_dragon: Option<String>,

    /// Whether to rewrite icon paths to absolute URLs
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    icon_urls: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the current feeds, fuse them and write one dataset per language
    Fuse {
        /// Data Dragon release, e.g. 14.1.1 (defaults to the newest release)
        #[arg(long)]
        data_dragon: Option<String>,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Fuse previously downloaded feeds
    FuseLocal {
        /// The directory holding <language>.json and <language>/tft-<feed>.json
        #[arg(short, long)]
        input_dir: Utf8PathBuf,

        /// Release identifier the feeds belong to
        #[arg(long)]
        data_dragon: Option<String>,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Show the effective configuration
    Config {
        /// Write a configuration file with default values
        #[arg(long)]
        init: bool,
    },
}

impl SelectionArgs {
    fn into_overrides(self, data_dragon: Option<String>) -> (ConfigOverrides, bool) {
        let overrides = ConfigOverrides {
            community_dragon: self.community_dragon,
            data_dragon,
            set: self.set,
            languages: self.languages,
            output_dir: self.output_dir,
            overrides_dir: self.overrides_dir,
        };
        (overrides, self.icon_urls)
    }
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tft_data=debug,ltk_tft_data=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "tft_data=info,ltk_tft_data=info".into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    if let Commands::Config { init: true } = args.command {
        return init_config(args.config.as_deref());
    }

    let (file_config, loaded_from) = config::load_config(args.config.as_deref())?;

    match args.command {
        Commands::Fuse {
            data_dragon,
            selection,
        } => {
            let (overrides, icon_urls) = selection.into_overrides(data_dragon);
            let config = file_config.merge(overrides);
            let feeds = HttpFeeds::new(&config.community_dragon, config.data_dragon.as_deref())?;

            fuse_datasets(FuseArgs { config, icon_urls }, &feeds)
        }
        Commands::FuseLocal {
            input_dir,
            data_dragon,
            selection,
        } => {
            let (overrides, icon_urls) = selection.into_overrides(data_dragon);
            let config = file_config.merge(overrides);
            let release = config
                .data_dragon
                .clone()
                .ok_or(CliError::MissingSetting {
                    name: "data_dragon",
                })?;
            let feeds = LocalFeeds::new(input_dir, release);

            fuse_datasets(FuseArgs { config, icon_urls }, &feeds)
        }
        Commands::Config { .. } => show_config(&file_config, loaded_from.as_deref()),
    }
}
