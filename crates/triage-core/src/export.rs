use crate::error::Result;
use crate::ticket::Ticket;
use std::fmt::Display;
use std::path::Path;

/// Fixed export column order. Consumers key on position, so this never
/// changes shape without a format version bump.
const HEADERS: [&str; 19] = [
    "ID",
    "Title",
    "Source",
    "Problem",
    "Value",
    "BA Status",
    "SRS Link",
    "Analysis",
    "PM Status",
    "Product Alignment",
    "Backend Impact",
    "Mobile Impact",
    "Situm Dependency",
    "Effort",
    "Risk",
    "Sprint",
    "Dev Status",
    "Delivery Date",
    "Comments",
];

/// Every cell is quoted, embedded quotes doubled, missing values empty.
fn cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn opt<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

fn row(ticket: &Ticket) -> String {
    let fields = [
        ticket.id.clone(),
        ticket.title.clone(),
        ticket.source.clone(),
        ticket.problem.clone(),
        ticket.value.clone(),
        ticket.ba_status.to_string(),
        opt(&ticket.srs_link),
        opt(&ticket.analysis),
        ticket.pm_status.to_string(),
        opt(&ticket.product_alignment),
        opt(&ticket.tech_impact_backend),
        opt(&ticket.tech_impact_mobile),
        opt(&ticket.situm_dependency),
        opt(&ticket.effort),
        opt(&ticket.risk_level),
        opt(&ticket.sprint_cycle),
        ticket.dev_status.to_string(),
        opt(&ticket.delivery_date),
        opt(&ticket.dev_comments),
    ];
    fields
        .iter()
        .map(|f| cell(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render all tickets as CSV, header first, in the given order.
pub fn to_csv(tickets: &[Ticket]) -> String {
    let mut out = String::new();
    out.push_str(
        &HEADERS
            .iter()
            .map(|h| cell(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');
    for ticket in tickets {
        out.push_str(&row(ticket));
        out.push('\n');
    }
    out
}

pub fn write_csv(tickets: &[Ticket], path: &Path) -> Result<()> {
    crate::io::atomic_write(path, to_csv(tickets).as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
