use crate::error::{Result, TriageError};
use crate::paths;
use crate::types::{
    BaStatus, DevStatus, ImpactLevel, PmStatus, RequestType, Severity, Stage, TShirtSize, YesNo,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Optional-date storage mapping
// ---------------------------------------------------------------------------

/// Store-boundary rule: empty-string date cells normalize to an explicit
/// absent value instead of failing the parse.
mod opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(d: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// A feature/enhancement request carrying fields for all four pipeline
/// stages. The ticket is the single source of truth for request state; it is
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,

    // BD fields (stage 0)
    pub request_type: RequestType,
    pub title: String,
    pub source: String,
    pub problem: String,
    pub severity: Severity,
    pub value: String,
    #[serde(
        default,
        deserialize_with = "opt_date::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub requested_date: Option<NaiveDate>,

    // BA fields (stage 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub ba_status: BaStatus,

    // PM fields (stage 2)
    pub pm_status: PmStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_impact_backend: Option<ImpactLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_impact_mobile: Option<ImpactLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situm_dependency: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<TShirtSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<ImpactLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_cycle: Option<String>,

    // Dev fields (stage 3)
    #[serde(
        default,
        deserialize_with = "opt_date::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_comments: Option<String>,
    pub dev_status: DevStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            request_type: RequestType::New,
            title: String::new(),
            source: String::new(),
            problem: String::new(),
            severity: Severity::Medium,
            value: String::new(),
            requested_date: None,
            srs_link: None,
            analysis: None,
            ba_status: BaStatus::Pending,
            pm_status: PmStatus::Pending,
            product_alignment: None,
            tech_impact_backend: None,
            tech_impact_mobile: None,
            situm_dependency: None,
            effort: None,
            risk_level: None,
            sprint_cycle: None,
            delivery_date: None,
            dev_comments: None,
            dev_status: DevStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sequential human-readable id derived from the current ticket count.
    ///
    /// Known limitation: two actors creating tickets concurrently can race to
    /// the same id; the store treats ids as unique and the second write wins.
    pub fn next_id(existing: usize) -> String {
        format!("REQ-{:03}", existing + 1)
    }

    /// The highest-numbered stage whose status is not Pending; BD otherwise.
    /// Used to pre-select which stage a reviewer lands on.
    pub fn default_stage(&self) -> Stage {
        if self.dev_status != DevStatus::Pending {
            Stage::Delivery
        } else if self.pm_status != PmStatus::Pending {
            Stage::Approval
        } else if self.ba_status != BaStatus::Pending {
            Stage::Analysis
        } else {
            Stage::Requirement
        }
    }

    /// Apply a single field update. Authorization happens at the boundary
    /// (see `Session::update_ticket`), not here.
    pub fn apply(&mut self, field: TicketField) {
        match field {
            TicketField::RequestType(v) => self.request_type = v,
            TicketField::Title(v) => self.title = v,
            TicketField::Source(v) => self.source = v,
            TicketField::Problem(v) => self.problem = v,
            TicketField::Severity(v) => self.severity = v,
            TicketField::Value(v) => self.value = v,
            TicketField::RequestedDate(v) => self.requested_date = v,
            TicketField::SrsLink(v) => self.srs_link = none_if_empty(v),
            TicketField::Analysis(v) => self.analysis = none_if_empty(v),
            TicketField::BaStatus(v) => self.ba_status = v,
            TicketField::PmStatus(v) => self.pm_status = v,
            TicketField::ProductAlignment(v) => self.product_alignment = none_if_empty(v),
            TicketField::TechImpactBackend(v) => self.tech_impact_backend = v,
            TicketField::TechImpactMobile(v) => self.tech_impact_mobile = v,
            TicketField::SitumDependency(v) => self.situm_dependency = v,
            TicketField::Effort(v) => self.effort = v,
            TicketField::RiskLevel(v) => self.risk_level = v,
            TicketField::SprintCycle(v) => self.sprint_cycle = none_if_empty(v),
            TicketField::DeliveryDate(v) => self.delivery_date = v,
            TicketField::DevComments(v) => self.dev_comments = none_if_empty(v),
            TicketField::DevStatus(v) => self.dev_status = v,
        }
        self.updated_at = Utc::now();
    }

    /// Case-insensitive match against id, title, or source.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.id.to_lowercase().contains(&term)
            || self.title.to_lowercase().contains(&term)
            || self.source.to_lowercase().contains(&term)
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(root: &Path, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        paths::validate_id(&id)?;

        let path = paths::ticket_path(root, &id);
        if path.exists() {
            return Err(TriageError::TicketExists(id));
        }

        let ticket = Self::new(id);
        ticket.save(root)?;
        Ok(ticket)
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::ticket_path(root, id);
        if !path.exists() {
            return Err(TriageError::TicketNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let ticket: Ticket = serde_yaml::from_str(&data)?;
        Ok(ticket)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::ticket_path(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// All tickets, newest first (display order).
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::TICKETS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut tickets = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                let data = std::fs::read_to_string(&path)?;
                let ticket: Ticket = serde_yaml::from_str(&data)?;
                tickets.push(ticket);
            }
        }
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }
}

// ---------------------------------------------------------------------------
// TicketField
// ---------------------------------------------------------------------------

/// A single ticket field update, tagged with its value.
///
/// One variant per form field; `stage()` is the total function from field
/// identity to the pipeline stage that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketField {
    RequestType(RequestType),
    Title(String),
    Source(String),
    Problem(String),
    Severity(Severity),
    Value(String),
    RequestedDate(Option<NaiveDate>),
    SrsLink(Option<String>),
    Analysis(Option<String>),
    BaStatus(BaStatus),
    PmStatus(PmStatus),
    ProductAlignment(Option<String>),
    TechImpactBackend(Option<ImpactLevel>),
    TechImpactMobile(Option<ImpactLevel>),
    SitumDependency(Option<YesNo>),
    Effort(Option<TShirtSize>),
    RiskLevel(Option<ImpactLevel>),
    SprintCycle(Option<String>),
    DeliveryDate(Option<NaiveDate>),
    DevComments(Option<String>),
    DevStatus(DevStatus),
}

impl TicketField {
    /// The pipeline stage that owns this field.
    pub fn stage(&self) -> Stage {
        match self {
            TicketField::RequestType(_)
            | TicketField::Title(_)
            | TicketField::Source(_)
            | TicketField::Problem(_)
            | TicketField::Severity(_)
            | TicketField::Value(_)
            | TicketField::RequestedDate(_) => Stage::Requirement,

            TicketField::SrsLink(_) | TicketField::Analysis(_) | TicketField::BaStatus(_) => {
                Stage::Analysis
            }

            TicketField::PmStatus(_)
            | TicketField::ProductAlignment(_)
            | TicketField::TechImpactBackend(_)
            | TicketField::TechImpactMobile(_)
            | TicketField::SitumDependency(_)
            | TicketField::Effort(_)
            | TicketField::RiskLevel(_)
            | TicketField::SprintCycle(_) => Stage::Approval,

            TicketField::DeliveryDate(_)
            | TicketField::DevComments(_)
            | TicketField::DevStatus(_) => Stage::Delivery,
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

    #[test]
    fn new_ticket_defaults() {
        let ticket = Ticket::new("REQ-001");
        assert_eq!(ticket.request_type, RequestType::New);
        assert_eq!(ticket.severity, Severity::Medium);
        assert_eq!(ticket.ba_status, BaStatus::Pending);
        assert_eq!(ticket.pm_status, PmStatus::Pending);
        assert_eq!(ticket.dev_status, DevStatus::Pending);
        assert!(ticket.sprint_cycle.is_none());
    }

    #[test]
    fn next_id_zero_padded() {
        assert_eq!(Ticket::next_id(0), "REQ-001");
        assert_eq!(Ticket::next_id(9), "REQ-010");
        assert_eq!(Ticket::next_id(122), "REQ-123");
    }

    #[test]
    fn default_stage_progression() {
        let mut ticket = Ticket::new("REQ-001");
        assert_eq!(ticket.default_stage(), Stage::Requirement);

        ticket.apply(TicketField::BaStatus(BaStatus::AnalysisComplete));
        assert_eq!(ticket.default_stage(), Stage::Analysis);

        ticket.apply(TicketField::PmStatus(PmStatus::Approved));
        assert_eq!(ticket.default_stage(), Stage::Approval);

        ticket.apply(TicketField::DevStatus(DevStatus::Scheduled));
        assert_eq!(ticket.default_stage(), Stage::Delivery);
    }

    #[test]
    fn default_stage_dev_wins_regardless_of_other_fields() {
        let mut ticket = Ticket::new("REQ-001");
        ticket.apply(TicketField::DevStatus(DevStatus::InProgress));
        // BA and PM still Pending, delivery stage still wins.
        assert_eq!(ticket.default_stage(), Stage::Delivery);
    }

    #[test]
    fn apply_normalizes_empty_strings() {
        let mut ticket = Ticket::new("REQ-001");
        ticket.apply(TicketField::SprintCycle(Some("".to_string())));
        assert!(ticket.sprint_cycle.is_none());
        ticket.apply(TicketField::SprintCycle(Some("SPRINT-1".to_string())));
        assert_eq!(ticket.sprint_cycle.as_deref(), Some("SPRINT-1"));
    }

    #[test]
    fn field_stage_mapping() {
        assert_eq!(
            TicketField::Title("x".into()).stage(),
            Stage::Requirement
        );
        assert_eq!(
            TicketField::BaStatus(BaStatus::Pending).stage(),
            Stage::Analysis
        );
        assert_eq!(
            TicketField::SprintCycle(None).stage(),
            Stage::Approval
        );
        assert_eq!(
            TicketField::DeliveryDate(None).stage(),
            Stage::Delivery
        );
    }

    #[test]
    fn ticket_create_load() {
        let dir = TempDir::new().unwrap();
        let ticket = Ticket::create(dir.path(), "REQ-001").unwrap();
        assert_eq!(ticket.id, "REQ-001");

        let loaded = Ticket::load(dir.path(), "REQ-001").unwrap();
        assert_eq!(loaded.ba_status, BaStatus::Pending);
    }

    #[test]
    fn ticket_create_duplicate_fails() {
        let dir = TempDir::new().unwrap();
        Ticket::create(dir.path(), "REQ-001").unwrap();
        assert!(matches!(
            Ticket::create(dir.path(), "REQ-001"),
            Err(TriageError::TicketExists(_))
        ));
    }

    #[test]
    fn ticket_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut first = Ticket::new("REQ-001");
        let mut second = Ticket::new("REQ-002");
        first.created_at = "2024-10-01T08:00:00Z".parse().unwrap();
        second.created_at = "2024-10-02T08:00:00Z".parse().unwrap();
        first.save(dir.path()).unwrap();
        second.save(dir.path()).unwrap();

        let tickets = Ticket::list(dir.path()).unwrap();
        assert_eq!(tickets[0].id, "REQ-002");
        assert_eq!(tickets[1].id, "REQ-001");
    }

    #[test]
    fn empty_date_string_deserializes_to_none() {
        let yaml = "\
id: REQ-001
request_type: new
title: Checkout
source: Client
problem: Slow
severity: medium
value: Conversion
requested_date: ''
ba_status: pending
pm_status: pending
dev_status: pending
created_at: 2024-10-01T08:00:00Z
updated_at: 2024-10-01T08:00:00Z
";
        let ticket: Ticket = serde_yaml::from_str(yaml).unwrap();
        assert!(ticket.requested_date.is_none());
    }

    #[test]
    fn search_matches_id_title_source() {
        let mut ticket = Ticket::new("REQ-001");
        ticket.apply(TicketField::Title("One-Click Checkout".into()));
        ticket.apply(TicketField::Source("Client Meeting (Zara)".into()));

        assert!(ticket.matches("req-001"));
        assert!(ticket.matches("checkout"));
        assert!(ticket.matches("zara"));
        assert!(!ticket.matches("payments"));
    }
}
