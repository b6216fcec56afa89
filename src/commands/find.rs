//! Find command - discover and rank iCloud Drive locations

use anyhow::{Context, Result};
use colored::Colorize;
use drivefind::{Finder, PathInfo, PathKind, SearchOptions};

use crate::Context as AppContext;
use crate::cli::FindArgs;
use crate::ui;

pub fn run(ctx: &AppContext, args: FindArgs) -> Result<()> {
    let finder = build_finder(&args)?;

    let options = SearchOptions {
        app_name: args.app.clone(),
        min_score: args.min_score,
        include_inaccessible: args.include_inaccessible,
        ..Default::default()
    };
    let paths = finder.search(&options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    if paths.is_empty() {
        if !ctx.quiet {
            ui::warn("No iCloud Drive locations found");
            ui::dim("Is iCloud Drive set up on this machine?");
        }
        return Ok(());
    }

    ui::header("iCloud Drive Locations");
    for path in &paths {
        print_path_line(path);
    }

    println!();
    ui::dim(&format!("{} location(s)", paths.len()));

    Ok(())
}

fn build_finder(args: &FindArgs) -> Result<Finder> {
    match args.platform {
        Some(platform) => Ok(Finder::for_platform(platform.into())),
        None => Finder::new().context("Failed to initialize discovery"),
    }
}

fn print_path_line(path: &PathInfo) {
    let score = format!("{:>4}", path.score);
    let score = if path.score >= 20 {
        score.green()
    } else if path.score >= 10 {
        score.yellow()
    } else {
        score.dimmed()
    };

    let kind = kind_label(path.kind).dimmed();
    let access = if path.accessible {
        "✓".green()
    } else {
        "✗".red()
    };

    println!("  {access} {score}  {kind:<12} {}", path.path);

    if path.kind.is_app_storage()
        && let Some(identity) = &path.metadata.identity
    {
        println!(
            "      {} {}",
            identity.app_name.bold(),
            format!("({})", identity.bundle_id).dimmed()
        );
    }
}

fn kind_label(kind: PathKind) -> &'static str {
    match kind {
        PathKind::Root => "root",
        PathKind::AppStorage => "app-storage",
        PathKind::Documents => "documents",
        PathKind::Photos => "photos",
        PathKind::Other => "other",
    }
}
