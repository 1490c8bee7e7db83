//! CLI entry point for the relayup installer.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use relayup::{
    EXIT_SUCCESS, HttpClient, InstallLayout, Installer, ProcessEnvStore, ReplaceStrategy,
};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("relayup starting");

    let layout = match args.install_dir.clone() {
        Some(install_dir) => InstallLayout::new(args.url.clone(), install_dir),
        None => InstallLayout::in_user_data_dir(args.url.clone())
            .context("cannot determine the per-user application-data directory")?,
    };

    let strategy = if args.in_place {
        ReplaceStrategy::InPlace
    } else {
        ReplaceStrategy::StagedSwap
    };

    let installer = Installer::new(HttpClient::new(), layout)
        .with_strategy(strategy)
        .with_buffer_size(args.buffer_size as usize);

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::with_template(
                "{bytes}/{total_bytes} [{bar:40.cyan/blue}] {bytes_per_sec}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    };

    let mut store = ProcessEnvStore;
    let outcome = installer
        .run(&mut store, |chunk| {
            if progress.length() != Some(chunk.content_length) {
                progress.set_length(chunk.content_length);
            }
            progress.set_position(chunk.bytes_so_far);
        })
        .await;

    let exit_code = match outcome {
        Ok(report) => {
            progress.finish_and_clear();
            info!(
                bytes = report.bytes_downloaded,
                install_dir = %report.install_dir.display(),
                path_updated = report.path_updated,
                "installation complete"
            );
            EXIT_SUCCESS
        }
        Err(e) => {
            progress.abandon();
            error!(error = %e, "installation failed");
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}
