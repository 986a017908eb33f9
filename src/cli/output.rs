// Output formatting utilities

use std::collections::HashMap;
use std::io::IsTerminal;
use chrono::{Local, TimeZone};
use crate::backend::Paginate;
use crate::models::{Job, JobStatus};
use crate::repo::StatusChangeRecord;
use crate::utils::format_date;
use crate::view::Column;
use crate::workflow::{BulkReport, CatalogIssue};

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// 24-bit foreground escape for a `#rrggbb` color
fn hex_to_fg(color: &str) -> Option<String> {
    if !crate::models::is_hex_color(color) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&color[i..i + 2], 16).ok();
    Some(format!("\x1b[38;2;{};{};{}m", channel(1)?, channel(3)?, channel(5)?))
}

fn status_label(status: &JobStatus, is_tty: bool) -> String {
    match (is_tty, hex_to_fg(&status.color)) {
        (true, Some(fg)) => format!("{}{}{}", fg, status.code, ANSI_RESET),
        _ => status.code.clone(),
    }
}

fn format_created(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Truncate to `width` characters, marking the cut with `~`
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('~');
    out
}

/// Names for ids shown in the table
#[derive(Debug, Default)]
pub struct TableLookups {
    pub channels: HashMap<i64, String>,
}

fn cell_text(job: &Job, column: Column, lookups: &TableLookups) -> String {
    match column {
        Column::JobNumber => job.job_number.clone(),
        Column::DisplayName => job.display_name.clone(),
        Column::Client => job.client_name.clone(),
        Column::Status => job.status.code.clone(),
        Column::Type => job.job_type.clone().unwrap_or_default(),
        Column::IncomeCost => job.income_cost.to_string(),
        Column::StaffCost => job.staff_cost.to_string(),
        Column::PaymentChannel => job
            .payment_channel_id
            .map(|id| lookups.channels.get(&id).cloned().unwrap_or_else(|| format!("[{}]", id)))
            .unwrap_or_default(),
        Column::Paid => (if job.is_paid { "yes" } else { "no" }).to_string(),
        Column::DueAt => format_date(job.due_at),
        Column::Assignees => job.assignees.iter().map(|u| u.name.as_str()).collect::<Vec<_>>().join(","),
        Column::CreatedAt => format_created(job.created_ts),
        Column::CompletedAt => format_date(job.completed_at),
    }
}

fn is_numeric(column: Column) -> bool {
    matches!(column, Column::IncomeCost | Column::StaffCost)
}

/// Columns that give up width first when the table is too wide
const SHRINKABLE: [Column; 3] = [Column::DisplayName, Column::Client, Column::Assignees];
const MIN_SHRUNK_WIDTH: usize = 8;

/// Format the job table for the given visible columns. The ID column is
/// always shown first.
pub fn format_job_table(
    jobs: &[Job],
    columns: &[Column],
    lookups: &TableLookups,
    width: usize,
    is_tty: bool,
) -> String {
    let ids: Vec<String> = jobs.iter().map(|j| j.id.to_string()).collect();
    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|job| columns.iter().map(|c| cell_text(job, *c, lookups)).collect())
        .collect();

    let id_width = ids.iter().map(|s| s.len()).max().unwrap_or(0).max(2);
    let mut widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(c.label().len())
        })
        .collect();

    // Shrink text columns until the table fits
    let total = |widths: &[usize]| id_width + widths.iter().map(|w| w + 1).sum::<usize>();
    for shrinkable in SHRINKABLE {
        let excess = total(&widths).saturating_sub(width);
        if excess == 0 {
            break;
        }
        if let Some(i) = columns.iter().position(|c| *c == shrinkable) {
            let floor = MIN_SHRUNK_WIDTH.max(shrinkable.label().len());
            widths[i] = widths[i].saturating_sub(excess).max(floor);
        }
    }

    let mut output = String::new();
    let mut header = format!("{:>w$}", "ID", w = id_width);
    for (i, column) in columns.iter().enumerate() {
        header.push(' ');
        if is_numeric(*column) {
            header.push_str(&format!("{:>w$}", column.label(), w = widths[i]));
        } else {
            header.push_str(&format!("{:<w$}", column.label(), w = widths[i]));
        }
    }
    output.push_str(&bold_if_tty(header.trim_end(), is_tty));
    output.push('\n');

    for (row_idx, row) in rows.iter().enumerate() {
        let mut line = format!("{:>w$}", ids[row_idx], w = id_width);
        for (i, column) in columns.iter().enumerate() {
            line.push(' ');
            let text = truncate(&row[i], widths[i]);
            let pad = widths[i].saturating_sub(text.chars().count());
            let shown = if *column == Column::Status {
                status_label(&jobs[row_idx].status, is_tty)
            } else {
                text
            };
            if is_numeric(*column) {
                line.push_str(&" ".repeat(pad));
                line.push_str(&shown);
            } else {
                line.push_str(&shown);
                line.push_str(&" ".repeat(pad));
            }
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

pub fn format_pagination(paginate: &Paginate) -> String {
    let noun = if paginate.total == 1 { "job" } else { "jobs" };
    format!(
        "Page {} of {} ({} {})",
        paginate.page,
        paginate.total_pages.max(1),
        paginate.total,
        noun
    )
}

pub fn format_job_summary(job: &Job, channel: Option<&str>, quick_targets: &[JobStatus]) -> String {
    let mut output = String::new();

    let header = format!("Job {}: {} ({})", job.id, job.display_name, job.job_number);
    output.push_str(&header);
    output.push('\n');
    output.push_str(&"=".repeat(header.len().max(60)));
    output.push_str("\n\n");

    output.push_str(&format!("  Client:      {}\n", job.client_name));
    output.push_str(&format!(
        "  Status:      {} ({}, {})\n",
        job.status.code,
        job.status.name,
        job.status.system_type.as_str()
    ));
    output.push_str(&format!("  Type:        {}\n", job.job_type.as_deref().unwrap_or("(none)")));
    output.push_str(&format!("  Income:      {}\n", job.income_cost));
    output.push_str(&format!("  Staff cost:  {}\n", job.staff_cost));
    output.push_str(&format!("  Channel:     {}\n", channel.unwrap_or("(none)")));
    output.push_str(&format!("  Paid:        {}\n", if job.is_paid { "yes" } else { "no" }));

    let date_or_none = |d| {
        let s = format_date(d);
        if s.is_empty() { "(none)".to_string() } else { s }
    };
    output.push_str(&format!("  Due:         {}\n", date_or_none(job.due_at)));
    output.push_str(&format!("  Started:     {}\n", date_or_none(job.started_at)));
    output.push_str(&format!("  Completed:   {}\n", date_or_none(job.completed_at)));
    output.push_str(&format!("  Finished:    {}\n", date_or_none(job.finished_at)));
    output.push_str(&format!("  Created:     {}\n", format_created(job.created_ts)));

    if job.assignees.is_empty() {
        output.push_str("  Assignees:   (none)\n");
    } else {
        let names: Vec<&str> = job.assignees.iter().map(|u| u.name.as_str()).collect();
        output.push_str(&format!("  Assignees:   {}\n", names.join(", ")));
    }

    if !job.attachments.is_empty() {
        output.push_str("\nAttachments:\n");
        for url in &job.attachments {
            output.push_str(&format!("  {}\n", url));
        }
    }

    output.push('\n');
    if quick_targets.is_empty() {
        output.push_str("Quick change: (none)\n");
    } else {
        let codes: Vec<&str> = quick_targets.iter().map(|s| s.code.as_str()).collect();
        output.push_str(&format!("Quick change: {}\n", codes.join(", ")));
    }
    output
}

fn order_or_dash(order: Option<i64>) -> String {
    order.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn format_status_list(statuses: &[JobStatus], is_tty: bool) -> String {
    let code_width = statuses.iter().map(|s| s.code.len()).max().unwrap_or(0).max(4);
    let name_width = statuses.iter().map(|s| s.name.len()).max().unwrap_or(0).max(4);

    let mut output = String::new();
    let header = format!(
        "{:>5} {:<cw$} {:<nw$} {:<11} {:>4} {:>4} {}",
        "Order", "Code", "Name", "Type", "Prev", "Next", "Color",
        cw = code_width,
        nw = name_width
    );
    output.push_str(&bold_if_tty(&header, is_tty));
    output.push('\n');
    for status in statuses {
        let pad = " ".repeat(code_width - status.code.len());
        output.push_str(&format!(
            "{:>5} {}{} {:<nw$} {:<11} {:>4} {:>4} {}\n",
            status.order,
            status_label(status, is_tty),
            pad,
            status.name,
            status.system_type.as_str(),
            order_or_dash(status.prev_status_order),
            order_or_dash(status.next_status_order),
            status.color,
            nw = name_width
        ));
    }
    output
}

pub fn format_catalog_issues(issues: &[CatalogIssue]) -> String {
    if issues.is_empty() {
        return "Status catalog OK.\n".to_string();
    }
    let mut output = format!("Status catalog has {} issue(s):\n", issues.len());
    for issue in issues {
        output.push_str(&format!("  - {}\n", issue));
    }
    output
}

pub fn format_history(job_id: i64, records: &[StatusChangeRecord]) -> String {
    if records.is_empty() {
        return format!("No status changes recorded for job {}.\n", job_id);
    }
    let mut output = String::new();
    for record in records {
        let when = Local
            .timestamp_opt(record.changed_ts, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        output.push_str(&format!("{}  {} -> {}\n", when, record.from_code, record.to_code));
    }
    output
}

pub fn format_bulk_report(report: &BulkReport, is_tty: bool) -> String {
    let mut output = String::new();
    let ok = format!("{} succeeded", report.succeeded.len());
    if is_tty && !report.succeeded.is_empty() {
        output.push_str(&format!("{}{}{}", ANSI_FG_GREEN, ok, ANSI_RESET));
    } else {
        output.push_str(&ok);
    }
    if !report.unchanged.is_empty() {
        output.push_str(&format!(", {} unchanged", report.unchanged.len()));
    }
    let failed = format!(", {} failed", report.failed.len());
    if is_tty && !report.failed.is_empty() {
        output.push_str(&format!("{}{}{}", ANSI_FG_RED, failed, ANSI_RESET));
    } else {
        output.push_str(&failed);
    }
    output.push('\n');
    for (job_id, err) in &report.failed {
        output.push_str(&format!("  Job {}: {}\n", job_id, err));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::models::fixtures::{job, status};
    use crate::models::SystemType;

    fn todo_job(id: i64) -> Job {
        job(id, status(1, "todo", None, Some(2), SystemType::Standard))
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long name", 6), "a lon~");
    }

    #[test]
    fn test_hex_to_fg() {
        assert_eq!(hex_to_fg("#ff8000").as_deref(), Some("\x1b[38;2;255;128;0m"));
        assert_eq!(hex_to_fg("orange"), None);
    }

    #[test]
    fn test_job_table_plain() {
        let jobs = vec![todo_job(1), todo_job(12)];
        let table = format_job_table(
            &jobs,
            &[Column::JobNumber, Column::Status, Column::IncomeCost],
            &TableLookups::default(),
            120,
            false,
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID Number"));
        assert!(lines[1].contains("J-00001 todo"));
        assert!(lines[2].starts_with("12 J-00012"));
        assert!(lines[2].ends_with("100.00"));
    }

    #[test]
    fn test_job_table_shrinks_names() {
        let mut long = todo_job(1);
        long.display_name = "A very long job name that will not fit".to_string();
        let table = format_job_table(&[long], &[Column::DisplayName], &TableLookups::default(), 20, false);
        assert!(table.lines().all(|l| l.chars().count() <= 20));
        assert!(table.contains('~'));
    }

    #[test]
    fn test_pagination_footer() {
        assert_eq!(format_pagination(&Paginate::new(2, 20, 45)), "Page 2 of 3 (45 jobs)");
        assert_eq!(format_pagination(&Paginate::new(1, 20, 0)), "Page 1 of 1 (0 jobs)");
    }

    #[test]
    fn test_bulk_report_plain() {
        let report = BulkReport {
            succeeded: vec![1, 2],
            unchanged: vec![],
            failed: vec![(3, JobError::not_found("Job", 3))],
        };
        let text = format_bulk_report(&report, false);
        assert!(text.starts_with("2 succeeded, 1 failed"));
        assert!(text.contains("Job 3: Job not found: 3"));
    }
}
