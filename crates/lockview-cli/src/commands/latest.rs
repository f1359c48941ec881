//! `lockview latest` command implementation.
//!
//! Looks up the latest published version of each named package, serving
//! fresh answers from the registry cache.

use lockview_core::error::LockviewResult;
use lockview_registry::LatestVersions;

use super::CommandContext;

/// Latest metadata for every name the registry knows
pub async fn collect(packages: &[String], ctx: &CommandContext) -> LockviewResult<LatestVersions> {
    let service = ctx.metadata_service()?;
    service.get_latest_versions(packages, &ctx.settings.registry_url).await
}

/// Execute the `lockview latest` command
pub async fn execute(packages: &[String], ctx: &CommandContext) -> LockviewResult<()> {
    let latest = collect(packages, ctx).await?;

    if ctx.json {
        return ctx.output.json(&latest);
    }

    let width = packages.iter().map(String::len).max().unwrap_or(0);
    for name in packages {
        match latest.get(name) {
            Some(metadata) => ctx.output.line(&format!("{:<width$}  {}", name, metadata.version())),
            None => ctx.output.warn(&format!("{}: not found in {}", name, ctx.settings.registry_url)),
        }
    }

    Ok(())
}
