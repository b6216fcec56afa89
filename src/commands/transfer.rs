//! Analyze and copy commands - plan and execute transfers into iCloud Drive

use anyhow::{Context, Result};
use colored::Colorize;
use drivefind::{CopyRequest, Finder, Transfer, TransferPlan};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::Context as AppContext;
use crate::cli::{AnalyzeArgs, CopyArgs};
use crate::ui;

pub fn analyze(ctx: &AppContext, args: AnalyzeArgs) -> Result<()> {
    let transfer = build_transfer()?;
    let request = CopyRequest {
        source: PathBuf::from(&args.source),
        app: args.app,
        pattern: args.pattern,
        recursive: args.recursive,
        ..Default::default()
    };

    let plan = transfer.analyze(&request)?;
    print_plan(ctx, &plan);

    Ok(())
}

pub fn copy(ctx: &AppContext, args: CopyArgs) -> Result<()> {
    let transfer = build_transfer()?;
    let request = CopyRequest {
        source: PathBuf::from(&args.source),
        app: args.app,
        pattern: args.pattern,
        recursive: args.recursive,
        overwrite: args.overwrite,
        dry_run: args.dry_run,
    };

    let spinner = (!ctx.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(if args.dry_run {
            "Planning copy (dry run)..."
        } else {
            "Copying..."
        });
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let outcome = transfer.copy(&request);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = outcome?;

    if let Some(target) = &outcome.target_path {
        ui::kv("Target", target);
    }

    if args.dry_run {
        ui::header(&format!(
            "Dry run - would copy {} file(s)",
            outcome.copied_files.len()
        ));
        for file in &outcome.copied_files {
            println!("  {file}");
        }
        return Ok(());
    }

    for (file, error) in outcome.failed_files.iter().zip(&outcome.errors) {
        ui::error(&format!("{file}: {error}"));
    }

    if outcome.success {
        ui::success(&format!("Copied {} file(s)", outcome.copied_files.len()));
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} file(s) failed",
            outcome.failed_files.len(),
            outcome.copied_files.len() + outcome.failed_files.len()
        );
    }
}

fn build_transfer() -> Result<Transfer> {
    let finder = Finder::new().context("Failed to initialize discovery")?;
    Ok(Transfer::new(finder))
}

fn print_plan(ctx: &AppContext, plan: &TransferPlan) {
    ui::header("Transfer Plan");
    ui::kv("Source", &plan.source.display().to_string());
    ui::kv("Files", &plan.total_files.to_string());
    ui::kv("Total size", &ui::format_size(plan.total_size));

    println!();
    println!("{}", "Targets (best first):".bold());
    for target in &plan.targets {
        println!("  {:>4}  {}", target.score, target.path);
    }

    if ctx.verbose > 0 {
        println!();
        println!("{}", "Files:".bold());
        for file in &plan.files {
            ui::dim(&file.display().to_string());
        }
    }
}
