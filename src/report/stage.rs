use serde_json::Value;

use crate::report::NOT_AVAILABLE;

/// Stage keys, in the order they appear in the progress cell.
pub const STAGE_KEYS: [&str; 4] = ["S1", "S2", "S3", "S4"];

/// Progress of one stage, read from its colour token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    InProgress,
    Pending,
    Unknown,
}

impl StageStatus {
    /// Map a colour token. Unrecognised or missing tokens degrade to `Unknown`.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("green") => Self::Completed,
            Some("amber") => Self::InProgress,
            Some("red") => Self::Pending,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
            Self::Pending => "Pending",
            Self::Unknown => NOT_AVAILABLE,
        }
    }
}

/// Per-stage statuses from the first entry of a record's `stages` array.
///
/// Returns `None` when the field is absent, not an array, or empty.
pub fn stage_statuses(stages: Option<&Value>) -> Option<[(&'static str, StageStatus); 4]> {
    let first = stages.and_then(Value::as_array)?.first()?;
    Some(STAGE_KEYS.map(|key| {
        (
            key,
            StageStatus::from_token(first.get(key).and_then(Value::as_str)),
        )
    }))
}

/// Text for the stage-progress cell: one `"Sx: Label"` line per stage.
pub fn stage_progress(stages: Option<&Value>) -> String {
    match stage_statuses(stages) {
        Some(statuses) => statuses
            .iter()
            .map(|(key, status)| format!("{key}: {}", status.label()))
            .collect::<Vec<_>>()
            .join("\n"),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{StageStatus, stage_progress};

    #[test]
    fn colour_tokens_map_to_labels() {
        let stages = json!([{"S1": "green", "S2": "amber", "S3": "red", "S4": "purple"}]);
        assert_eq!(
            stage_progress(Some(&stages)),
            "S1: Completed\nS2: In Progress\nS3: Pending\nS4: N/A"
        );
    }

    #[test]
    fn only_the_first_stage_entry_counts() {
        let stages = json!([{"S1": "green"}, {"S1": "red", "S2": "red"}]);
        assert_eq!(
            stage_progress(Some(&stages)),
            "S1: Completed\nS2: N/A\nS3: N/A\nS4: N/A"
        );
    }

    #[test]
    fn missing_or_malformed_stage_field_is_not_available() {
        assert_eq!(stage_progress(None), "N/A");
        assert_eq!(stage_progress(Some(&json!([]))), "N/A");
        assert_eq!(stage_progress(Some(&json!({"S1": "green"}))), "N/A");
        assert_eq!(stage_progress(Some(&json!("green"))), "N/A");
    }

    #[test]
    fn tokens_are_case_sensitive() {
        assert_eq!(StageStatus::from_token(Some("Green")), StageStatus::Unknown);
        assert_eq!(StageStatus::from_token(None).label(), "N/A");
    }
}
