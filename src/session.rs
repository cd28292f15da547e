//! Per-tab session state - condition registry, link cache, command generation
//!
//! All of this state is owned explicitly and passed into the handlers that
//! need it; nothing lives in module-level statics. The condition registry is
//! persisted as JSON keyed by tab identifier, last write wins, and entries
//! are removed when their tab goes away.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::filters::Condition;
use crate::page::{DriverResult, PageDriver, PageElement};

/// Tab-keyed condition registry with JSON persistence.
#[derive(Debug, Default)]
pub struct Conditions {
    map: HashMap<String, Condition>,
    path: Option<PathBuf>,
}

impl Conditions {
    /// In-memory registry without persistence.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the registry from `path`. A missing or malformed file yields an
    /// empty registry bound to that path.
    pub fn load(path: &Path) -> Self {
        let map = fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self {
            map,
            path: Some(path.to_path_buf()),
        }
    }

    pub fn get(&self, tab: &str) -> Option<Condition> {
        self.map.get(tab).copied()
    }

    pub fn set(&mut self, tab: &str, condition: Condition) {
        self.map.insert(tab.to_string(), condition);
        self.save();
    }

    /// Remove a tab's entry (the tab closed).
    pub fn remove(&mut self, tab: &str) {
        self.map.remove(tab);
        self.save();
    }

    fn save(&self) {
        let Some(path) = &self.path else { return };
        match serde_json::to_string_pretty(&self.map) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    eprintln!("conditions: failed to write {}: {}", path.display(), e);
                }
            }
            Err(e) => eprintln!("conditions: failed to serialize: {}", e),
        }
    }
}

/// Apply a condition's visual treatment to the driven page: replace the
/// injected style element, add the dimming overlay where needed, set zoom.
pub fn apply_condition(page: &dyn PageDriver, condition: Condition) -> DriverResult<()> {
    match condition.css() {
        Some(css) => page.inject_css(&css)?,
        None => page.inject_css("")?,
    }
    if condition.needs_overlay() {
        page.ensure_overlay()?;
    }
    page.set_zoom(condition.zoom())?;
    Ok(())
}

/// Per-tab interpreter state for the lifetime of a page.
#[derive(Debug, Default)]
pub struct TabSession {
    /// Link list captured by the last "read links", reused by "click N link"
    /// until the next requery.
    pub links: Option<Vec<PageElement>>,
    /// Monotonic per-command counter; asynchronous service replies tagged
    /// with an older generation are discarded.
    pub generation: u64,
}

impl TabSession {
    /// Start a new command; returns its generation.
    pub fn begin_command(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// True when a reply tagged `generation` belongs to the current command.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}
