//! Seams to the outside world: persistence, rendering and the host platform
//!
//! The projection core never calls these; session types and binaries do.

use std::collections::HashMap;
use std::io::Write;

use chrono::{DateTime, Utc};

use crate::assumptions::AllocationTemplate;
use crate::error::{CoreResult, ProjectionError};
use crate::projection::ProjectionSeries;

/// Key under which the current plan is stored
pub const PLAN_KEY: &str = "investmentData";
/// Key under which survey answers are stored
pub const SURVEY_KEY: &str = "surveyData";

/// Session-scoped key/value persistence
pub trait PlanStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    /// Like `get`, but a missing key is an error
    fn require(&self, key: &str) -> CoreResult<String> {
        self.get(key)
            .ok_or_else(|| ProjectionError::NotFound(format!("no stored value for {:?}", key)))
    }
}

/// Something that can draw a projection and its allocation
pub trait RenderSurface {
    fn render(&mut self, series: &ProjectionSeries, allocation: &AllocationTemplate) -> CoreResult<()>;
}

/// Host messaging client hosting the app
pub trait HostBridge {
    /// Hand the final payload back to the host
    fn send_data(&mut self, payload: &str) -> CoreResult<()>;
    /// Show a modal alert to the user
    fn show_alert(&mut self, message: &str);
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    saved_at: DateTime<Utc>,
}

/// In-memory store, the stand-in for browser local storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `key` was last written
    pub fn saved_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.values.get(key).map(|v| v.saved_at)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PlanStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value.clone())
    }

    fn put(&mut self, key: &str, value: String) {
        self.values.insert(
            key.to_string(),
            StoredValue {
                value,
                saved_at: Utc::now(),
            },
        );
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Plain-text rendering surface, used by the CLI
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for TextSurface<W> {
    fn render(&mut self, series: &ProjectionSeries, allocation: &AllocationTemplate) -> CoreResult<()> {
        writeln!(
            self.out,
            "{:>4} {:>16} {:>16} {:>16}",
            "Year", "Min", "Avg", "Max"
        )?;
        writeln!(self.out, "{}", "-".repeat(55))?;
        for point in series {
            writeln!(
                self.out,
                "{:>4} {:>16.2} {:>16.2} {:>16.2}",
                point.year, point.min, point.avg, point.max
            )?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "Allocation ({}):", allocation.profile.display_name())?;
        for entry in &allocation.entries {
            writeln!(
                self.out,
                "  {:<16} {:>3}%",
                entry.category.display_name(),
                entry.percent
            )?;
        }
        Ok(())
    }
}

/// Bridge that records everything it is given, for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    pub sent: Vec<String>,
    pub alerts: Vec<String>,
}

impl HostBridge for RecordingBridge {
    fn send_data(&mut self, payload: &str) -> CoreResult<()> {
        self.sent.push(payload.to_string());
        Ok(())
    }

    fn show_alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::RiskProfile;
    use crate::projection::ProjectionEngine;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.require(PLAN_KEY).is_err());

        store.put(PLAN_KEY, "{}".to_string());
        assert_eq!(store.get(PLAN_KEY).as_deref(), Some("{}"));
        assert!(store.saved_at(PLAN_KEY).is_some());

        store.remove(PLAN_KEY);
        assert!(store.is_empty());
        assert!(matches!(store.require(PLAN_KEY), Err(ProjectionError::NotFound(_))));
    }

    #[test]
    fn test_text_surface() {
        let engine = ProjectionEngine::reference();
        let series = engine.project(1_000.0, 2, RiskProfile::Conservative).unwrap();
        let allocation = engine.allocation_for(RiskProfile::Conservative);

        let mut surface = TextSurface::new(Vec::new());
        surface.render(&series, &allocation).unwrap();
        let text = String::from_utf8(surface.into_inner()).unwrap();

        let first_row: Vec<&str> = text.lines().nth(2).unwrap().split_whitespace().collect();
        assert_eq!(first_row, vec!["0", "1000.00", "1000.00", "1000.00"]);
        assert!(text.contains("Allocation (Conservative):"));
        assert!(text.contains("Russian bonds     60%"));
    }
}
