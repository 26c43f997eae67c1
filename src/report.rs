//! Change reporting for a finished run.
//!
//! The pipeline itself only produces the list of newly added catalog entries.
//! This module packages that list with what triggered the run and renders the
//! commit message that accompanies the mirrored files.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::catalog::CatalogEntry;
use crate::error::Result;

/// Newly added names listed in a commit message before the rest are
/// summarized.
pub const MAX_LISTED: usize = 10;

/// What started the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Scheduled,
    Manual,
    Default,
}

impl TriggerEvent {
    /// Classifies a CI event name (`schedule`, `workflow_dispatch`, ...).
    pub fn from_event_name(name: Option<&str>) -> Self {
        match name {
            Some("schedule") => TriggerEvent::Scheduled,
            Some("workflow_dispatch") => TriggerEvent::Manual,
            _ => TriggerEvent::Default,
        }
    }

    fn scope(self) -> &'static str {
        match self {
            TriggerEvent::Scheduled => "Scheduled",
            TriggerEvent::Manual => "Manual",
            TriggerEvent::Default => "Auto",
        }
    }
}

/// Input to the change reporter.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub added: Vec<CatalogEntry>,
    pub event: TriggerEvent,
    pub finished_at: DateTime<Local>,
}

impl RunSummary {
    pub fn new(added: Vec<CatalogEntry>, event: TriggerEvent) -> Self {
        Self {
            added,
            event,
            finished_at: Local::now(),
        }
    }
}

/// Renders the commit message for a run.
pub fn render_commit_message(summary: &RunSummary) -> String {
    let mut lines = Vec::new();

    if summary.added.is_empty() {
        lines.push(format!(
            "chore({}): sync upstream icon sets",
            summary.event.scope()
        ));
        lines.push(String::new());
        lines.push("Routine update, no new icons detected.".to_string());
    } else {
        let count = summary.added.len();
        lines.push(format!("feat: add {} icons", count));
        lines.push(String::new());
        lines.push(format!("Added {} new icons to the catalog.", count));
        lines.push(String::new());
        lines.push(format!("New icons (showing up to {}):", MAX_LISTED));
        for entry in summary.added.iter().take(MAX_LISTED) {
            lines.push(format!("  - {}", entry.display_name));
        }
        if count > MAX_LISTED {
            lines.push(format!("... and {} more.", count - MAX_LISTED));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Updated at: {}",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S %Z")
    ));
    lines.join("\n")
}

/// Renders and writes the commit message to `path`.
pub fn write_commit_message(path: &Path, summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_commit_message(summary))?;
    Ok(())
}
