use serde::{Deserialize, Serialize};

/// Coarse classification of a status governing which transitions apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemType {
    Standard,
    Completed,
    WaitReview,
    Terminated,
}

impl SystemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemType::Standard => "STANDARD",
            SystemType::Completed => "COMPLETED",
            SystemType::WaitReview => "WAIT_REVIEW",
            SystemType::Terminated => "TERMINATED",
        }
    }

    /// Accepts the canonical upper-case form and its lower-case spelling
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Some(SystemType::Standard),
            "COMPLETED" => Some(SystemType::Completed),
            "WAIT_REVIEW" => Some(SystemType::WaitReview),
            "TERMINATED" => Some(SystemType::Terminated),
            _ => None,
        }
    }
}

/// A named stage in the job workflow
///
/// `order` places the status in a total ordering. `prev_status_order` and
/// `next_status_order` point at adjacent order values; `None` marks an end
/// of the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub color: String,
    pub order: i64,
    pub prev_status_order: Option<i64>,
    pub next_status_order: Option<i64>,
    pub system_type: SystemType,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        self.system_type == SystemType::Terminated
    }
}

/// Check a `#rrggbb` color string
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_type_conversion() {
        assert_eq!(SystemType::Standard.as_str(), "STANDARD");
        assert_eq!(SystemType::from_str("WAIT_REVIEW"), Some(SystemType::WaitReview));
        assert_eq!(SystemType::from_str("terminated"), Some(SystemType::Terminated));
        assert_eq!(SystemType::from_str("done"), None);
    }

    #[test]
    fn test_system_type_serde() {
        let json = serde_json::to_string(&SystemType::WaitReview).unwrap();
        assert_eq!(json, "\"WAIT_REVIEW\"");
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#1a2B3c"));
        assert!(!is_hex_color("1a2b3c"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#zzzzzz"));
    }
}
