//! Subcommand handlers, called from `main` once config and logging are up.

use std::path::Path;

use anyhow::{bail, Context};
use clipstat_core::{compare_profiles, AppConfig, ProfileSnapshot};
use clipstat_license::LicenseGate;
use clipstat_scraper::{
    scan, video_detail, EngineSettings, Envelope, FetchTabDriver, ScanData, ScanOptions,
    StaticPageHost,
};

use crate::export::render_csv;
use crate::render::{render_comparison, render_snapshot, render_video};
use crate::source::PageSource;
use crate::OutputFormat;

fn envelope_error<T>(envelope: &Envelope<T>) -> anyhow::Error {
    anyhow::anyhow!(
        "{}: {}",
        envelope.error.as_deref().unwrap_or("Error"),
        envelope.message.as_deref().unwrap_or("extraction failed")
    )
}

/// Scan a profile and print it as a table, JSON envelope, or CSV.
///
/// The license server is only consulted when the request needs Pro.
///
/// # Errors
///
/// Returns an error if the page cannot be loaded, CSV is requested without
/// Pro, or the scan fails.
pub(crate) async fn run_scan(
    config: &AppConfig,
    source: &PageSource,
    deep: bool,
    deep_limit: Option<usize>,
    format: OutputFormat,
    top: usize,
) -> anyhow::Result<()> {
    let driver = FetchTabDriver::from_config(config)?;

    let pro = if deep || format == OutputFormat::Csv {
        let status = LicenseGate::from_config(config)?.pro_status(false).await?;
        tracing::debug!(pro = status.pro, source = status.source.as_str(), "license checked");
        status.pro
    } else {
        false
    };
    if format == OutputFormat::Csv && !pro {
        bail!("CSV export is Pro-only; run `clipstat license set <token>` first");
    }

    let page = source.load(&driver).await?;
    let host = StaticPageHost::new(page);
    let options = ScanOptions {
        deep,
        ..ScanOptions::default()
    };
    let envelope = scan(
        &host,
        &driver,
        &options,
        deep_limit.unwrap_or(config.deep_limit),
        pro,
        &EngineSettings::from_app_config(config),
    )
    .await;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        if !envelope.ok {
            return Err(envelope_error(&envelope));
        }
        return Ok(());
    }

    let Some(data) = envelope.data.as_ref() else {
        return Err(envelope_error(&envelope));
    };
    match format {
        OutputFormat::Csv => println!("{}", render_csv(&data.snapshot)),
        OutputFormat::Table | OutputFormat::Json => {
            print!("{}", render_snapshot(&data.snapshot, top));
            if let Some(summary) = &data.deep_summary {
                println!(
                    "\ndeep scan: {} attempted, {} enriched, {} failed",
                    summary.attempted, summary.enriched, summary.failed
                );
            }
            if let Some(note) = &data.pro_note {
                println!("\n{note}");
            }
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the page cannot be loaded or extraction fails.
pub(crate) async fn run_video(
    config: &AppConfig,
    source: &PageSource,
    json: bool,
) -> anyhow::Result<()> {
    let driver = FetchTabDriver::from_config(config)?;
    let page = source.load(&driver).await?;
    let envelope = video_detail(&StaticPageHost::new(page)).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    let Some(detail) = envelope.data.as_ref() else {
        return Err(envelope_error(&envelope));
    };
    if !json {
        print!("{}", render_video(detail));
    }
    Ok(())
}

/// Reads a saved scan: either the `scan --format json` envelope or a bare
/// snapshot object.
pub(crate) fn load_snapshot(path: &Path) -> anyhow::Result<ProfileSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if let Ok(envelope) = serde_json::from_str::<Envelope<ScanData>>(&raw) {
        return match envelope.data {
            Some(data) => Ok(data.snapshot),
            None => Err(envelope_error(&envelope))
                .with_context(|| format!("{} holds a failed scan", path.display())),
        };
    }
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a saved scan", path.display()))
}

/// # Errors
///
/// Returns an error if `input` is not a readable saved scan.
pub(crate) fn run_stats(input: &Path, top: usize) -> anyhow::Result<()> {
    let snapshot = load_snapshot(input)?;
    print!("{}", render_snapshot(&snapshot, top));
    Ok(())
}

/// # Errors
///
/// Returns an error if either file is not a readable saved scan.
pub(crate) fn run_compare(a: &Path, b: &Path, json: bool) -> anyhow::Result<()> {
    let comparison = compare_profiles(&load_snapshot(a)?, &load_snapshot(b)?);
    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!("{}", render_comparison(&comparison));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the license store cannot be read or written.
pub(crate) async fn run_license_set(config: &AppConfig, token: &str) -> anyhow::Result<()> {
    let status = LicenseGate::from_config(config)?.set_token(token).await?;
    println!("pro: {}  (source: {})", status.pro, status.source.as_str());
    Ok(())
}

/// # Errors
///
/// Returns an error if the license store cannot be read or written.
pub(crate) async fn run_license_status(config: &AppConfig, refresh: bool) -> anyhow::Result<()> {
    let status = LicenseGate::from_config(config)?.pro_status(refresh).await?;
    println!("pro: {}  (source: {})", status.pro, status.source.as_str());
    Ok(())
}
