// Calendar date expressions for due dates and filters

use chrono::{Duration, Local, NaiveDate};
use anyhow::Result;

/// Parse a date expression relative to `today`.
///
/// Accepts `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday` and `+Nd`/`-Nd`
/// day offsets.
pub fn parse_date_expr_from(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    let expr = expr.trim();
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }

    match expr.to_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(days) = expr.strip_suffix('d') {
        if days.starts_with('+') || days.starts_with('-') {
            if let Ok(offset) = days.parse::<i64>() {
                return Ok(today + Duration::days(offset));
            }
        }
    }

    anyhow::bail!(
        "Unsupported date expression: '{}'. Use YYYY-MM-DD, today, tomorrow, yesterday or +Nd.",
        expr
    )
}

/// Parse a date expression relative to the local calendar day
pub fn parse_date_expr(expr: &str) -> Result<NaiveDate> {
    parse_date_expr_from(expr, Local::now().date_naive())
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_absolute_and_relative() {
        let today = day("2026-03-10");
        assert_eq!(parse_date_expr_from("2026-04-01", today).unwrap(), day("2026-04-01"));
        assert_eq!(parse_date_expr_from("tomorrow", today).unwrap(), day("2026-03-11"));
        assert_eq!(parse_date_expr_from("+7d", today).unwrap(), day("2026-03-17"));
        assert_eq!(parse_date_expr_from("-10d", today).unwrap(), day("2026-02-28"));
    }

    #[test]
    fn test_rejects_unknown() {
        assert!(parse_date_expr_from("next week", day("2026-03-10")).is_err());
        assert!(parse_date_expr_from("7d", day("2026-03-10")).is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some(day("2026-01-05"))), "2026-01-05");
        assert_eq!(format_date(None), "");
    }
}
