//! `lockview cache` command implementation.

use camino::Utf8PathBuf;
use serde::Serialize;

use lockview_core::error::LockviewResult;
use lockview_registry::CacheStats;

use super::CommandContext;
use crate::CacheAction;

/// Outcome of one cache action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheReport {
    pub path: Utf8PathBuf,
    pub ttl_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
}

/// Run `action` against the configured cache file
pub async fn collect(action: CacheAction, ctx: &CommandContext) -> LockviewResult<CacheReport> {
    let service = ctx.metadata_service()?;
    let mut report = CacheReport {
        path: ctx.settings.cache_file.clone(),
        ttl_secs: ctx.settings.cache_ttl_secs,
        stats: None,
        removed: None,
    };

    match action {
        CacheAction::Stats => report.stats = Some(service.cache_stats().await),
        CacheAction::Prune => report.removed = Some(service.prune_cache().await?),
        CacheAction::Clear => report.removed = Some(service.clear_cache().await?),
    }

    Ok(report)
}

/// Execute the `lockview cache` command
pub async fn execute(action: CacheAction, ctx: &CommandContext) -> LockviewResult<()> {
    let report = collect(action, ctx).await?;

    if ctx.json {
        return ctx.output.json(&report);
    }

    match (action, report.stats, report.removed) {
        (CacheAction::Stats, Some(stats), _) => {
            ctx.output.line(&format!("Cache file: {}", report.path));
            ctx.output.line(&format!("TTL:        {}s", report.ttl_secs));
            ctx.output.line(&format!(
                "Entries:    {} ({} fresh, {} stale)",
                stats.total_entries, stats.fresh_entries, stats.stale_entries
            ));
        },
        (CacheAction::Prune, _, Some(removed)) => {
            ctx.output.success(&format!("Removed {} expired entries", removed));
        },
        (_, _, removed) => {
            ctx.output.success(&format!("Removed {} entries", removed.unwrap_or(0)));
        },
    }

    Ok(())
}
