//! Offset overlays: auto-generated, time-shifted copies of graph query lines.
//!
//! Overlays are rebuilt on every save. [`prune`] drops every line that was
//! auto-created with an offset; [`regenerate`] adds one overlay per
//! user-authored line and dashboard offset. Both return a new document.

use dashboard_api::dashboard::{Dashboard, Panel, Target};

use crate::error::Result;
use crate::offset;

/// A line this module created and owns.
pub fn is_overlay(target: &Target) -> bool {
    target.auto_created && target.offset().is_some()
}

/// Remove all overlays from graph panels; everything else is untouched.
pub fn prune(dashboard: &Dashboard) -> Dashboard {
    map_graph_panels(dashboard, |panel| {
        panel.targets.retain(|target| !is_overlay(target));
    })
}

/// Add overlays for every dashboard offset when `with_offset` is set.
///
/// Stale overlays are dropped first so the result depends only on the
/// user-authored lines. A line is not added when the panel already has one
/// with the same query and offset.
pub fn regenerate(dashboard: &Dashboard) -> Result<Dashboard> {
    if !dashboard.with_offset {
        return Ok(dashboard.clone());
    }

    let offsets = checked_offsets(&dashboard.offsets)?;

    Ok(map_graph_panels(&prune(dashboard), |panel| {
        let sources: Vec<Target> = panel
            .targets
            .iter()
            .filter(|target| target.offset().is_none())
            .cloned()
            .collect();

        for source in &sources {
            for offset in &offsets {
                let overlay = overlay_of(source, offset);
                let exists = panel.targets.iter().any(|target| {
                    target.query == overlay.query && target.time_offset == overlay.time_offset
                });

                if exists {
                    tracing::debug!(
                        "Skipping overlay {offset} for query {:?}, already present",
                        overlay.query
                    );
                } else {
                    panel.targets.push(overlay);
                }
            }
        }
    }))
}

/// Prune, then regenerate. Run before handing a dashboard to storage.
pub fn prepare_for_save(dashboard: &Dashboard) -> Result<Dashboard> {
    regenerate(&prune(dashboard))
}

/// Non-empty offsets, each checked to decode.
fn checked_offsets(offsets: &[String]) -> Result<Vec<&str>> {
    offsets
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(|token| offset::decode(token).map(|_| token))
        .collect()
}

fn overlay_of(source: &Target, offset: &str) -> Target {
    let mut overlay = source.clone();
    if let Some(alias) = source.alias() {
        overlay.alias = Some(format!("{alias}-{offset}-offset"));
    }
    overlay.time_offset = Some(offset.to_string());
    overlay.auto_created = true;
    overlay
}

fn map_graph_panels(dashboard: &Dashboard, mut f: impl FnMut(&mut Panel)) -> Dashboard {
    let mut dashboard = dashboard.clone();
    for row in dashboard.rows.iter_mut() {
        for panel in row.panels.iter_mut().filter(|panel| panel.is_graph()) {
            f(panel);
        }
    }
    dashboard
}
