use crate::errors::CliError;
use crate::fetch::FeedSource;
use crate::icons::icon_url;
use crate::persist;
use crate::println_pad;
use crate::utils::config::FusionConfig;
use camino::Utf8PathBuf;
use colored::Colorize;
use ltk_tft_data::{
    fuse_all, Catalog, EntityKind, FsOverrideSource, FusionContext, FusionReport,
};
use rayon::prelude::*;
use std::error::Error as _;

/// Unresolved placeholders listed per language before the rest are summarized.
const UNRESOLVED_PREVIEW: usize = 10;

pub struct FuseArgs {
    pub config: FusionConfig,
    /// Rewrite raw icon paths to absolute asset URLs.
    pub icon_urls: bool,
}

/// Outcome of one successful (release, language) pass.
#[derive(Debug)]
pub struct PassSummary {
    pub language: String,
    pub output_dir: Utf8PathBuf,
    pub report: FusionReport,
}

/// Fuse every configured language. Passes run in parallel; a failed pass is
/// reported and does not stop the others.
pub fn fuse_datasets(args: FuseArgs, feeds: &dyn FeedSource) -> miette::Result<()> {
    let cfg = &args.config;
    let set = cfg.require_set()?;
    let overrides = cfg.overrides_dir.as_ref().map(FsOverrideSource::new);

    println!(
        "{} {} {}",
        "Fusing".bright_cyan().bold(),
        feeds.release().bright_white().bold(),
        format!("({}, {} language(s))", set, cfg.languages.len()).dimmed()
    );
    println!();

    let results: Vec<Result<PassSummary, CliError>> = cfg
        .languages
        .par_iter()
        .map(|language| {
            let result = run_pass(&args, set, language, feeds, overrides.as_ref());
            if let Err(ref e) = result {
                tracing::error!("Pass for {} failed: {}", language, e);
            }
            result
        })
        .collect();

    let mut failed = 0;
    for (language, result) in cfg.languages.iter().zip(results) {
        match result {
            Ok(summary) => print_summary(&summary),
            Err(e) => {
                failed += 1;
                print_failure(language, &e);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::PassesFailed {
            failed,
            total: cfg.languages.len(),
        }
        .into());
    }

    println!(
        "{}",
        "✓ All datasets written successfully!".bright_green().bold()
    );
    Ok(())
}

fn run_pass(
    args: &FuseArgs,
    set: &str,
    language: &str,
    feeds: &dyn FeedSource,
    overrides: Option<&FsOverrideSource>,
) -> Result<PassSummary, CliError> {
    let allowlist = feeds.allowlist(language)?;
    let catalog = Catalog::from_json(&feeds.catalog(language)?, set)
        .map_err(|e| CliError::fusion_failed(language, e))?;

    let mut ctx = FusionContext::new(feeds.release(), language, &allowlist, &catalog);
    if let Some(overrides) = overrides {
        ctx = ctx.with_overrides(overrides);
    }

    let mut dataset = fuse_all(&ctx).map_err(|e| CliError::fusion_failed(language, e))?;
    if args.icon_urls {
        let community_dragon = args.config.community_dragon.as_str();
        dataset.rewrite_icons(|path| icon_url(community_dragon, path));
    }

    let output_dir = persist::write_dataset(&args.config.output_dir, &dataset)?;

    Ok(PassSummary {
        language: language.to_string(),
        output_dir,
        report: dataset.report,
    })
}

fn print_summary(summary: &PassSummary) {
    println!(
        "{} {}",
        "✓".bright_green().bold(),
        summary.language.bright_white().bold()
    );
    println_pad!(
        "{} {}",
        "Output:".bright_white(),
        summary.output_dir.as_str().bright_green()
    );

    for kind in EntityKind::ALL {
        let stats = summary.report.stats(kind);
        println_pad!(
            "{} {} {}",
            format!("{}:", kind.plural()).bright_white(),
            stats.built.to_string().bright_cyan().bold(),
            format!(
                "({} excluded, {} not in catalog)",
                stats.excluded, stats.missing
            )
            .dimmed()
        );
    }

    let unresolved = &summary.report.unresolved;
    if !unresolved.is_empty() {
        println_pad!(
            "{} {}",
            "Unresolved placeholders:".bright_yellow(),
            unresolved.len().to_string().bright_yellow().bold()
        );
        for placeholder in unresolved.iter().take(UNRESOLVED_PREVIEW) {
            println_pad!(
                "  {} {} {} {}",
                "•".bright_yellow(),
                placeholder.kind,
                placeholder.id.bright_white(),
                placeholder.token.dimmed()
            );
        }
        if unresolved.len() > UNRESOLVED_PREVIEW {
            println_pad!(
                "  {}",
                format!("… and {} more", unresolved.len() - UNRESOLVED_PREVIEW).dimmed()
            );
        }
    }
    println!();
}

fn print_failure(language: &str, error: &CliError) {
    println!(
        "{} {}",
        "✗".bright_red().bold(),
        language.bright_white().bold()
    );
    println_pad!("{}", error.to_string().bright_red());

    let mut source = error.source();
    while let Some(cause) = source {
        println_pad!("  {} {}", "caused by:".dimmed(), cause);
        source = cause.source();
    }
    println!();
}
