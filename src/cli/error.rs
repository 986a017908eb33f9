// Input validation for command arguments

use std::collections::BTreeSet;
use std::str::FromStr;
use rust_decimal::Decimal;
use crate::models::is_valid_code;

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a job ID is valid (positive integer)
pub fn validate_job_id(id_str: &str) -> Result<i64, String> {
    id_str.trim().parse::<i64>()
        .map_err(|_| format!("'{}' is not a job ID. Job IDs are numbers.", id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("{} is not a job ID. Job IDs are positive.", id))
            }
        })
}

/// Parse a job ID list: comma-separated IDs and `a-b` ranges, e.g. `1,4-6`
pub fn parse_job_id_list(spec: &str) -> Result<Vec<i64>, String> {
    let mut ids = BTreeSet::new();
    for part in spec.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(format!("Invalid ID list: '{}'", spec));
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let start = validate_job_id(start)?;
                let end = validate_job_id(end)?;
                if start > end {
                    return Err(format!("Invalid ID range: '{}'. Start must not exceed end.", part));
                }
                ids.extend(start..=end);
            }
            None => {
                ids.insert(validate_job_id(part)?);
            }
        }
    }
    Ok(ids.into_iter().collect())
}

/// Validate a status code (lowercase letters, digits, underscores)
pub fn validate_status_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("Status code cannot be empty".to_string());
    }
    if is_valid_code(code) {
        Ok(())
    } else {
        Err(format!("Invalid status code: '{}'. Codes use lowercase letters, digits and underscores.", code))
    }
}

/// Parse a non-negative currency amount
pub fn parse_amount(value: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(value.trim())
        .map_err(|_| format!("'{}' is not a valid amount", value))?;
    if amount.is_sign_negative() {
        return Err(format!("Amount cannot be negative: {}", value));
    }
    Ok(amount)
}

/// Split `key=value` arguments into pairs
pub fn parse_key_values(args: &[String]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", arg))
        })
        .collect()
}
