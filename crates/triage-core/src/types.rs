use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TriageError;

/// Normalize user input for enum parsing: lowercase, strip separators.
fn norm(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "")
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Bd,
    Ba,
    Pm,
    Dev,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Bd, Role::Ba, Role::Pm, Role::Dev]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Bd => "BD",
            Role::Ba => "BA",
            Role::Pm => "PM",
            Role::Dev => "DEV",
        }
    }

    /// The pipeline stage this role owns.
    pub fn stage(self) -> Stage {
        match self {
            Role::Bd => Stage::Requirement,
            Role::Ba => Stage::Analysis,
            Role::Pm => Stage::Approval,
            Role::Dev => Stage::Delivery,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "bd" => Ok(Role::Bd),
            "ba" => Ok(Role::Ba),
            "pm" => Ok(Role::Pm),
            "dev" => Ok(Role::Dev),
            _ => Err(TriageError::InvalidValue {
                what: "role",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The four sequential review phases a ticket passes through.
/// Indices are fixed: 0=BD, 1=BA, 2=PM, 3=Dev.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Requirement,
    Analysis,
    Approval,
    Delivery,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::Requirement,
            Stage::Analysis,
            Stage::Approval,
            Stage::Delivery,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The unique role that owns this stage.
    pub fn owner(self) -> Role {
        match self {
            Stage::Requirement => Role::Bd,
            Stage::Analysis => Role::Ba,
            Stage::Approval => Role::Pm,
            Stage::Delivery => Role::Dev,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Requirement => "requirement",
            Stage::Analysis => "analysis",
            Stage::Approval => "approval",
            Stage::Delivery => "delivery",
        }
    }

    /// Label as shown on the review tabs.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Requirement => "Requirement (BD)",
            Stage::Analysis => "Analysis (BA)",
            Stage::Approval => "Approval (PM)",
            Stage::Delivery => "Delivery (Dev)",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequestType / Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    New,
    Enhancement,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestType::New => "New",
            RequestType::Enhancement => "Enhancement",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RequestType {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "new" => Ok(RequestType::New),
            "enhancement" => Ok(RequestType::Enhancement),
            _ => Err(TriageError::InvalidValue {
                what: "request type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Severity {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(TriageError::InvalidValue {
                what: "severity",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-stage status fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaStatus {
    Pending,
    AnalysisComplete,
}

impl fmt::Display for BaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BaStatus::Pending => "Pending",
            BaStatus::AnalysisComplete => "Analysis Complete",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for BaStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "pending" => Ok(BaStatus::Pending),
            "analysiscomplete" | "complete" => Ok(BaStatus::AnalysisComplete),
            _ => Err(TriageError::InvalidValue {
                what: "BA status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmStatus {
    Pending,
    Approved,
    Rejected,
    OnHold,
}

impl fmt::Display for PmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PmStatus::Pending => "Pending",
            PmStatus::Approved => "Approved",
            PmStatus::Rejected => "Rejected",
            PmStatus::OnHold => "On Hold",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for PmStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "pending" => Ok(PmStatus::Pending),
            "approved" => Ok(PmStatus::Approved),
            "rejected" => Ok(PmStatus::Rejected),
            "onhold" | "hold" => Ok(PmStatus::OnHold),
            _ => Err(TriageError::InvalidValue {
                what: "PM status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevStatus {
    Pending,
    Scheduled,
    InProgress,
    Done,
}

impl fmt::Display for DevStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DevStatus::Pending => "Pending",
            DevStatus::Scheduled => "Scheduled",
            DevStatus::InProgress => "In Progress",
            DevStatus::Done => "Done",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for DevStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "pending" => Ok(DevStatus::Pending),
            "scheduled" => Ok(DevStatus::Scheduled),
            "inprogress" => Ok(DevStatus::InProgress),
            "done" => Ok(DevStatus::Done),
            _ => Err(TriageError::InvalidValue {
                what: "dev status",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// PM assessment fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImpactLevel::Low => "Low",
            ImpactLevel::Medium => "Medium",
            ImpactLevel::High => "High",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ImpactLevel {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "low" => Ok(ImpactLevel::Low),
            "medium" => Ok(ImpactLevel::Medium),
            "high" => Ok(ImpactLevel::High),
            _ => Err(TriageError::InvalidValue {
                what: "impact level",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Yes,
    No,
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for YesNo {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "yes" | "y" => Ok(YesNo::Yes),
            "no" | "n" => Ok(YesNo::No),
            _ => Err(TriageError::InvalidValue {
                what: "yes/no value",
                value: s.to_string(),
            }),
        }
    }
}

/// T-shirt effort estimate assigned during PM approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TShirtSize {
    S,
    M,
    L,
    Xl,
}

impl TShirtSize {
    /// Calendar-day count used when promoting an approved ticket to a task.
    pub fn days(self) -> u32 {
        match self {
            TShirtSize::S => 1,
            TShirtSize::M => 3,
            TShirtSize::L => 5,
            TShirtSize::Xl => 10,
        }
    }
}

impl fmt::Display for TShirtSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TShirtSize::S => "S",
            TShirtSize::M => "M",
            TShirtSize::L => "L",
            TShirtSize::Xl => "XL",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TShirtSize {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "s" => Ok(TShirtSize::S),
            "m" => Ok(TShirtSize::M),
            "l" => Ok(TShirtSize::L),
            "xl" => Ok(TShirtSize::Xl),
            _ => Err(TriageError::InvalidValue {
                what: "effort size",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SprintStatus / TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SprintStatus::Planned => "Planned",
            SprintStatus::Active => "Active",
            SprintStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SprintStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "planned" => Ok(SprintStatus::Planned),
            "active" => Ok(SprintStatus::Active),
            "completed" => Ok(SprintStatus::Completed),
            _ => Err(TriageError::InvalidValue {
                what: "sprint status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "todo" => Ok(TaskStatus::ToDo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(TriageError::InvalidValue {
                what: "task status",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stage_indices_fixed() {
        assert_eq!(Stage::Requirement.index(), 0);
        assert_eq!(Stage::Analysis.index(), 1);
        assert_eq!(Stage::Approval.index(), 2);
        assert_eq!(Stage::Delivery.index(), 3);
    }

    #[test]
    fn role_parse_accepts_any_case() {
        assert_eq!(Role::from_str("pm").unwrap(), Role::Pm);
        assert_eq!(Role::from_str("DEV").unwrap(), Role::Dev);
        assert!(Role::from_str("qa").is_err());
    }

    #[test]
    fn ba_status_parse_variants() {
        assert_eq!(
            BaStatus::from_str("analysis-complete").unwrap(),
            BaStatus::AnalysisComplete
        );
        assert_eq!(
            BaStatus::from_str("Analysis Complete").unwrap(),
            BaStatus::AnalysisComplete
        );
    }

    #[test]
    fn pm_status_display_matches_export_labels() {
        assert_eq!(PmStatus::OnHold.to_string(), "On Hold");
        assert_eq!(DevStatus::InProgress.to_string(), "In Progress");
        assert_eq!(TaskStatus::ToDo.to_string(), "To Do");
    }

    #[test]
    fn effort_day_mapping() {
        assert_eq!(TShirtSize::S.days(), 1);
        assert_eq!(TShirtSize::M.days(), 3);
        assert_eq!(TShirtSize::L.days(), 5);
        assert_eq!(TShirtSize::Xl.days(), 10);
    }

    #[test]
    fn tshirt_serde_uppercase() {
        let yaml = serde_yaml::to_string(&TShirtSize::Xl).unwrap();
        assert!(yaml.contains("XL"));
    }
}
