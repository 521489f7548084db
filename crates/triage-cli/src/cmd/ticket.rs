use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::path::Path;
use triage_core::session::Session;
use triage_core::ticket::{Ticket, TicketField};
use triage_core::types::{
    BaStatus, DevStatus, ImpactLevel, PmStatus, RequestType, Severity, TShirtSize, YesNo,
};

#[derive(Subcommand)]
pub enum TicketSubcommand {
    /// Create a ticket (BD only; id is assigned automatically)
    New {
        #[arg(long)]
        title: String,
        /// Who asked for this (client, meeting, channel)
        #[arg(long, default_value = "")]
        source: String,
        #[arg(long, default_value = "")]
        problem: String,
        #[arg(long)]
        severity: Option<Severity>,
        /// Business value statement
        #[arg(long, default_value = "")]
        value: String,
        #[arg(long)]
        request_type: Option<RequestType>,
        #[arg(long)]
        requested_date: Option<NaiveDate>,
    },
    /// List tickets, newest first
    List {
        /// Case-insensitive filter on id, title, or source
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one ticket in full
    Show { id: String },
    /// Update ticket fields owned by your role's stage
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
}

/// One optional flag per ticket field, grouped by owning stage.
#[derive(Args)]
pub struct FieldArgs {
    // Requirement (BD)
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    source: Option<String>,
    #[arg(long)]
    problem: Option<String>,
    #[arg(long)]
    severity: Option<Severity>,
    #[arg(long)]
    value: Option<String>,
    #[arg(long)]
    request_type: Option<RequestType>,
    #[arg(long)]
    requested_date: Option<NaiveDate>,

    // Analysis (BA)
    #[arg(long)]
    srs_link: Option<String>,
    #[arg(long)]
    analysis: Option<String>,
    #[arg(long)]
    ba_status: Option<BaStatus>,

    // Approval (PM)
    #[arg(long)]
    pm_status: Option<PmStatus>,
    #[arg(long)]
    product_alignment: Option<String>,
    #[arg(long)]
    backend_impact: Option<ImpactLevel>,
    #[arg(long)]
    mobile_impact: Option<ImpactLevel>,
    #[arg(long)]
    situm_dependency: Option<YesNo>,
    /// T-shirt size: S, M, L, or XL
    #[arg(long)]
    effort: Option<TShirtSize>,
    #[arg(long)]
    risk: Option<ImpactLevel>,
    /// Sprint id to schedule into (with pm-status Approved, creates a task)
    #[arg(long)]
    sprint: Option<String>,

    // Delivery (DEV)
    #[arg(long)]
    delivery_date: Option<NaiveDate>,
    #[arg(long)]
    dev_comments: Option<String>,
    #[arg(long)]
    dev_status: Option<DevStatus>,
}

impl FieldArgs {
    fn into_fields(self) -> Vec<TicketField> {
        let mut fields = Vec::new();
        let mut push = |f: Option<TicketField>| {
            if let Some(f) = f {
                fields.push(f);
            }
        };
        push(self.title.map(TicketField::Title));
        push(self.source.map(TicketField::Source));
        push(self.problem.map(TicketField::Problem));
        push(self.severity.map(TicketField::Severity));
        push(self.value.map(TicketField::Value));
        push(self.request_type.map(TicketField::RequestType));
        push(self.requested_date.map(|d| TicketField::RequestedDate(Some(d))));
        push(self.srs_link.map(|v| TicketField::SrsLink(Some(v))));
        push(self.analysis.map(|v| TicketField::Analysis(Some(v))));
        push(self.ba_status.map(TicketField::BaStatus));
        push(self.pm_status.map(TicketField::PmStatus));
        push(
            self.product_alignment
                .map(|v| TicketField::ProductAlignment(Some(v))),
        );
        push(
            self.backend_impact
                .map(|v| TicketField::TechImpactBackend(Some(v))),
        );
        push(
            self.mobile_impact
                .map(|v| TicketField::TechImpactMobile(Some(v))),
        );
        push(
            self.situm_dependency
                .map(|v| TicketField::SitumDependency(Some(v))),
        );
        push(self.effort.map(|v| TicketField::Effort(Some(v))));
        push(self.risk.map(|v| TicketField::RiskLevel(Some(v))));
        push(self.sprint.map(|v| TicketField::SprintCycle(Some(v))));
        push(
            self.delivery_date
                .map(|d| TicketField::DeliveryDate(Some(d))),
        );
        push(self.dev_comments.map(|v| TicketField::DevComments(Some(v))));
        push(self.dev_status.map(TicketField::DevStatus));
        fields
    }
}

pub fn run(root: &Path, subcmd: TicketSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TicketSubcommand::New {
            title,
            source,
            problem,
            severity,
            value,
            request_type,
            requested_date,
        } => {
            let mut fields = vec![
                TicketField::Title(title),
                TicketField::Source(source),
                TicketField::Problem(problem),
                TicketField::Value(value),
            ];
            if let Some(s) = severity {
                fields.push(TicketField::Severity(s));
            }
            if let Some(r) = request_type {
                fields.push(TicketField::RequestType(r));
            }
            if let Some(d) = requested_date {
                fields.push(TicketField::RequestedDate(Some(d)));
            }
            new(root, fields, json)
        }
        TicketSubcommand::List { search } => list(root, search.as_deref(), json),
        TicketSubcommand::Show { id } => show(root, &id, json),
        TicketSubcommand::Update { id, fields } => update(root, &id, fields.into_fields(), json),
    }
}

fn new(root: &Path, fields: Vec<TicketField>, json: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    let ticket = session.create_ticket(fields)?;

    if json {
        print_json(&ticket)?;
    } else {
        println!("Created ticket {}: {}", ticket.id, ticket.title);
    }
    Ok(())
}

fn list(root: &Path, search: Option<&str>, json: bool) -> anyhow::Result<()> {
    let session = Session::load(root).context("failed to load project")?;
    let tickets: Vec<&Ticket> = match search {
        Some(term) => session.search_tickets(term),
        None => session.tickets.iter().collect(),
    };

    if json {
        print_json(&tickets)?;
        return Ok(());
    }

    if tickets.is_empty() {
        println!("No tickets.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tickets
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.title.clone(),
                t.severity.to_string(),
                t.ba_status.to_string(),
                t.pm_status.to_string(),
                t.dev_status.to_string(),
                t.sprint_cycle.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(
        &["ID", "TITLE", "SEVERITY", "BA", "PM", "DEV", "SPRINT"],
        rows,
    );
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let session = Session::load(root).context("failed to load project")?;
    let ticket = session.ticket(id)?;

    if json {
        print_json(ticket)?;
        return Ok(());
    }

    println!("Ticket: {}", ticket.id);
    println!("Stage:        {}", ticket.default_stage().label());
    println!("Type:         {}", ticket.request_type);
    println!("Title:        {}", ticket.title);
    println!("Source:       {}", ticket.source);
    println!("Problem:      {}", ticket.problem);
    println!("Severity:     {}", ticket.severity);
    println!("Value:        {}", ticket.value);
    if let Some(d) = ticket.requested_date {
        println!("Requested:    {d}");
    }
    println!("BA status:    {}", ticket.ba_status);
    if let Some(link) = &ticket.srs_link {
        println!("SRS link:     {link}");
    }
    if let Some(a) = &ticket.analysis {
        println!("Analysis:     {a}");
    }
    println!("PM status:    {}", ticket.pm_status);
    if let Some(p) = &ticket.product_alignment {
        println!("Alignment:    {p}");
    }
    if let Some(i) = ticket.tech_impact_backend {
        println!("Backend:      {i}");
    }
    if let Some(i) = ticket.tech_impact_mobile {
        println!("Mobile:       {i}");
    }
    if let Some(y) = ticket.situm_dependency {
        println!("Situm dep:    {y}");
    }
    if let Some(e) = ticket.effort {
        println!("Effort:       {e}");
    }
    if let Some(r) = ticket.risk_level {
        println!("Risk:         {r}");
    }
    if let Some(s) = &ticket.sprint_cycle {
        println!("Sprint:       {s}");
    }
    println!("Dev status:   {}", ticket.dev_status);
    if let Some(d) = ticket.delivery_date {
        println!("Delivery:     {d}");
    }
    if let Some(c) = &ticket.dev_comments {
        println!("Comments:     {c}");
    }
    Ok(())
}

fn update(root: &Path, id: &str, fields: Vec<TicketField>, json: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to load project")?;
    let (ticket, promoted) = session.update_ticket(id, fields)?;

    if json {
        print_json(&serde_json::json!({
            "ticket": ticket,
            "promoted_task": promoted,
        }))?;
        return Ok(());
    }

    println!("Updated ticket {}", ticket.id);
    if let Some(task) = promoted {
        println!(
            "Scheduled task [{}] in {} ({} day{})",
            task.id,
            task.sprint_id,
            task.effort,
            if task.effort == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
