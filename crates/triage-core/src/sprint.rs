use crate::error::{Result, TriageError};
use crate::paths;
use crate::types::SprintStatus;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sprint length in calendar days after the Monday start (Mon..Sat window).
const SPRINT_DAYS: i64 = 5;

// ---------------------------------------------------------------------------
// Sprint
// ---------------------------------------------------------------------------

/// A fixed-length planning window with a man-day capacity.
///
/// The end date is always derived from the start; callers never choose it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capacity: u32,
    pub status: SprintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a sprint sits relative to a given day. Drives list grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintPhase {
    Active,
    Upcoming,
    Past,
}

impl Sprint {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        goal: impl Into<String>,
        start: NaiveDate,
        capacity: u32,
    ) -> Result<Self> {
        if start.weekday() != Weekday::Mon {
            return Err(TriageError::NotMonday(start));
        }
        if capacity == 0 {
            return Err(TriageError::InvalidCapacity);
        }
        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            name: name.into(),
            goal: goal.into(),
            start_date: start,
            end_date: start + Duration::days(SPRINT_DAYS),
            capacity,
            status: SprintStatus::Planned,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn next_id(existing: usize) -> String {
        format!("SPRINT-{}", existing + 1)
    }

    pub fn default_name(existing: usize) -> String {
        format!("Sprint {}", existing + 1)
    }

    /// Apply an edit. A new start date must again be a Monday and re-derives
    /// the end date; a supplied end date is never honored.
    pub fn edit(&mut self, patch: SprintPatch) -> Result<()> {
        if let Some(start) = patch.start_date {
            if start.weekday() != Weekday::Mon {
                return Err(TriageError::NotMonday(start));
            }
            self.start_date = start;
            self.end_date = start + Duration::days(SPRINT_DAYS);
        }
        if let Some(capacity) = patch.capacity {
            if capacity == 0 {
                return Err(TriageError::InvalidCapacity);
            }
            self.capacity = capacity;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(goal) = patch.goal {
            self.goal = goal;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn phase(&self, today: NaiveDate) -> SprintPhase {
        if self.contains(today) {
            SprintPhase::Active
        } else if self.start_date > today {
            SprintPhase::Upcoming
        } else {
            SprintPhase::Past
        }
    }

    /// Load as a percentage of capacity, conventionally rounded, unclamped.
    /// Values above 100 signal overcommitment and are reported as-is.
    pub fn utilization(&self, total_effort: u32) -> u32 {
        (f64::from(total_effort) / f64::from(self.capacity) * 100.0).round() as u32
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::sprint_path(root, id);
        if !path.exists() {
            return Err(TriageError::SprintNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let sprint: Sprint = serde_yaml::from_str(&data)?;
        Ok(sprint)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::sprint_path(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn delete(&self, root: &Path) -> Result<()> {
        let path = paths::sprint_path(root, &self.id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// All sprints, earliest start first.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::SPRINTS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut sprints = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                let sprint: Sprint = serde_yaml::from_str(&data)?;
                sprints.push(sprint);
            }
        }
        sprints.sort_by_key(|s| s.start_date);
        Ok(sprints)
    }
}

// ---------------------------------------------------------------------------
// SprintPatch
// ---------------------------------------------------------------------------

/// Partial sprint edit. End date is deliberately absent; it is derived.
#[derive(Debug, Clone, Default)]
pub struct SprintPatch {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub capacity: Option<u32>,
    pub status: Option<SprintStatus>,
}

// ---------------------------------------------------------------------------
// Utilization bands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilizationBand {
    Healthy,
    Warn,
    Over,
}

impl UtilizationBand {
    pub fn of(pct: u32) -> Self {
        if pct > 100 {
            UtilizationBand::Over
        } else if pct > 80 {
            UtilizationBand::Warn
        } else {
            UtilizationBand::Healthy
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn monday() -> NaiveDate {
        // 2024-10-14 is a Monday.
        NaiveDate::from_ymd_opt(2024, 10, 14).unwrap()
    }

    #[test]
    fn sprint_end_is_derived() {
        let sprint = Sprint::new("SPRINT-1", "Sprint 1", "Checkout", monday(), 20).unwrap();
        assert_eq!(
            sprint.end_date,
            NaiveDate::from_ymd_opt(2024, 10, 19).unwrap()
        );
        assert_eq!(sprint.status, SprintStatus::Planned);
    }

    #[test]
    fn non_monday_start_rejected() {
        let tuesday = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        assert!(matches!(
            Sprint::new("SPRINT-1", "Sprint 1", "", tuesday, 20),
            Err(TriageError::NotMonday(_))
        ));
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            Sprint::new("SPRINT-1", "Sprint 1", "", monday(), 0),
            Err(TriageError::InvalidCapacity)
        ));
    }

    #[test]
    fn edit_rederives_end_date() {
        let mut sprint = Sprint::new("SPRINT-1", "Sprint 1", "", monday(), 20).unwrap();
        let next_monday = NaiveDate::from_ymd_opt(2024, 10, 21).unwrap();
        sprint
            .edit(SprintPatch {
                start_date: Some(next_monday),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            sprint.end_date,
            NaiveDate::from_ymd_opt(2024, 10, 26).unwrap()
        );
    }

    #[test]
    fn edit_rejects_non_monday() {
        let mut sprint = Sprint::new("SPRINT-1", "Sprint 1", "", monday(), 20).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 10, 19).unwrap();
        assert!(sprint
            .edit(SprintPatch {
                start_date: Some(saturday),
                ..Default::default()
            })
            .is_err());
    }

    #[test]
    fn utilization_rounds_and_does_not_clamp() {
        let sprint = Sprint::new("SPRINT-1", "Sprint 1", "", monday(), 20).unwrap();
        assert_eq!(sprint.utilization(10), 50);
        assert_eq!(sprint.utilization(17), 85);
        assert_eq!(sprint.utilization(25), 125);
        // 13/20 = 65%, 3/20 = 15%
        assert_eq!(sprint.utilization(13), 65);
    }

    #[test]
    fn utilization_bands() {
        assert_eq!(UtilizationBand::of(80), UtilizationBand::Healthy);
        assert_eq!(UtilizationBand::of(81), UtilizationBand::Warn);
        assert_eq!(UtilizationBand::of(100), UtilizationBand::Warn);
        assert_eq!(UtilizationBand::of(101), UtilizationBand::Over);
    }

    #[test]
    fn phase_grouping() {
        let sprint = Sprint::new("SPRINT-1", "Sprint 1", "", monday(), 20).unwrap();
        let inside = NaiveDate::from_ymd_opt(2024, 10, 16).unwrap();
        let before = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 10, 28).unwrap();
        assert_eq!(sprint.phase(inside), SprintPhase::Active);
        assert_eq!(sprint.phase(before), SprintPhase::Upcoming);
        assert_eq!(sprint.phase(after), SprintPhase::Past);
    }

    #[test]
    fn sprint_roundtrip_and_list_order() {
        let dir = TempDir::new().unwrap();
        let later = Sprint::new(
            "SPRINT-2",
            "Sprint 2",
            "",
            NaiveDate::from_ymd_opt(2024, 10, 21).unwrap(),
            20,
        )
        .unwrap();
        let earlier = Sprint::new("SPRINT-1", "Sprint 1", "", monday(), 20).unwrap();
        later.save(dir.path()).unwrap();
        earlier.save(dir.path()).unwrap();

        let sprints = Sprint::list(dir.path()).unwrap();
        assert_eq!(sprints[0].id, "SPRINT-1");
        assert_eq!(sprints[1].id, "SPRINT-2");

        let loaded = Sprint::load(dir.path(), "SPRINT-1").unwrap();
        assert_eq!(loaded.capacity, 20);
    }

    #[test]
    fn default_ids_and_names() {
        assert_eq!(Sprint::next_id(0), "SPRINT-1");
        assert_eq!(Sprint::next_id(3), "SPRINT-4");
        assert_eq!(Sprint::default_name(0), "Sprint 1");
    }
}
