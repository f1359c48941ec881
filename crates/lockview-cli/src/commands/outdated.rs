//! `lockview outdated` command implementation.
//!
//! Compares every declared dependency with the latest registry version. The
//! installed version comes from the lockfile; a dependency that is not
//! installed is compared through its declared range instead.

use std::collections::HashMap;

use tracing::debug;

use lockview_config::{ManifestLoader, PackageJson};
use lockview_core::error::LockviewResult;
use lockview_core::types::{OutdatedEntry, OutdatedLevel};
use lockview_registry::LatestVersions;
use lockview_resolver::load_installed_graph;

use super::CommandContext;
use crate::output::colors::ColorSupport;

/// Outdated report for the enclosing project
pub async fn collect(all: bool, ctx: &CommandContext) -> LockviewResult<Vec<OutdatedEntry>> {
    let project = ManifestLoader::new(&ctx.cwd).load().await?;
    let names = project.manifest.dependency_names();
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let installed: HashMap<String, String> = load_installed_graph(&project.dir)
        .await
        .map(|graph| {
            graph
                .direct_versions()
                .into_iter()
                .map(|(name, version)| (name.to_string(), version.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let service = ctx.metadata_service()?;
    let latest = service.get_latest_versions(&names, &ctx.settings.registry_url).await?;

    Ok(build_report(&project.manifest, &installed, &latest, all))
}

/// Classify each declared dependency; names the registry did not answer for are left out
pub fn build_report(
    manifest: &PackageJson,
    installed: &HashMap<String, String>,
    latest: &LatestVersions,
    include_up_to_date: bool,
) -> Vec<OutdatedEntry> {
    let mut report = Vec::new();

    for name in manifest.dependency_names() {
        let Some(metadata) = latest.get(name) else {
            debug!("No registry metadata for {}", name);
            continue;
        };

        let current = installed
            .get(name)
            .map(String::as_str)
            .or_else(|| manifest.declared_range(name))
            .unwrap_or_default();

        let entry = OutdatedEntry::new(name, current, metadata.version());
        if include_up_to_date || entry.level.is_outdated() {
            report.push(entry);
        }
    }

    report
}

/// Aligned text table, one row per entry
pub fn render_report(report: &[OutdatedEntry], colors: &ColorSupport) -> String {
    let header = ["Package", "Current", "Latest", "Update"];
    let name_width = column_width(header[0], report.iter().map(|e| e.name.as_str()));
    let current_width = column_width(header[1], report.iter().map(|e| e.current.as_str()));
    let latest_width = column_width(header[2], report.iter().map(|e| e.latest.as_str()));

    let mut lines = vec![colors.bold(&format!(
        "{:<name_width$}  {:<current_width$}  {:<latest_width$}  {}",
        header[0], header[1], header[2], header[3]
    ))];

    for entry in report {
        let level = entry.level.to_string();
        let level = match entry.level {
            OutdatedLevel::Major => colors.red(&level),
            OutdatedLevel::Minor => colors.yellow(&level),
            OutdatedLevel::Patch => colors.green(&level),
            OutdatedLevel::UpToDate => colors.dim(&level),
        };
        lines.push(format!(
            "{:<name_width$}  {:<current_width$}  {:<latest_width$}  {}",
            entry.name, entry.current, entry.latest, level
        ));
    }

    lines.join("\n")
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(str::len).max().unwrap_or(0).max(header.len())
}

/// Execute the `lockview outdated` command
pub async fn execute(all: bool, ctx: &CommandContext) -> LockviewResult<()> {
    let report = collect(all, ctx).await?;

    if ctx.json {
        return ctx.output.json(&report);
    }

    if report.is_empty() {
        ctx.output.success("All dependencies are up to date");
        return Ok(());
    }

    ctx.output.line(&render_report(&report, ctx.output.colors()));
    Ok(())
}
