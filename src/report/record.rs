use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenerationError, GenerationResult};
use crate::report::NOT_AVAILABLE;
use crate::report::stage::stage_progress;

/// One order/task entry of the persisted client snapshot.
///
/// Fields are kept as raw JSON: the dashboard writes strings, numbers and
/// nulls interchangeably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(default)]
    pub order_id: Option<Value>,
    #[serde(default)]
    pub client_name: Option<Value>,
    #[serde(default)]
    pub billing_address: Option<Value>,
    #[serde(default)]
    pub order_date: Option<Value>,
    #[serde(default)]
    pub delivery_date: Option<Value>,
    #[serde(default)]
    pub order_details: Option<Value>,
    #[serde(default)]
    pub allocated_user: Option<Value>,
    #[serde(default)]
    pub stages: Option<Value>,
}

impl OrderRecord {
    pub fn allocated_user_str(&self) -> Option<&str> {
        self.allocated_user.as_ref().and_then(Value::as_str)
    }

    /// Exact, case-sensitive match on the allocated user.
    pub fn is_allocated_to(&self, user: &str) -> bool {
        self.allocated_user_str() == Some(user)
    }
}

/// Projection of an `OrderRecord` into report cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub order_id: String,
    pub client_name: String,
    pub billing_address: String,
    pub order_date: String,
    pub delivery_date: String,
    pub order_details: String,
    pub stage_progress: String,
    pub allocated_user: String,
}

impl ReportRow {
    pub fn cells(&self) -> [&str; 8] {
        [
            self.order_id.as_str(),
            self.client_name.as_str(),
            self.billing_address.as_str(),
            self.order_date.as_str(),
            self.delivery_date.as_str(),
            self.order_details.as_str(),
            self.stage_progress.as_str(),
            self.allocated_user.as_str(),
        ]
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl From<&OrderRecord> for ReportRow {
    fn from(record: &OrderRecord) -> Self {
        Self {
            order_id: cell_text(record.order_id.as_ref()),
            client_name: cell_text(record.client_name.as_ref()),
            billing_address: cell_text(record.billing_address.as_ref()),
            order_date: cell_text(record.order_date.as_ref()),
            delivery_date: cell_text(record.delivery_date.as_ref()),
            order_details: cell_text(record.order_details.as_ref()),
            stage_progress: stage_progress(record.stages.as_ref()),
            allocated_user: cell_text(record.allocated_user.as_ref()),
        }
    }
}

/// Parse the persisted snapshot (`{"state": {"clients": [...]}}`).
///
/// A snapshot without a `state.clients` array is `NoData`. Entries that are
/// not objects carry no fields and project to an all-`N/A` row; a `null`
/// entry fails the whole projection.
pub fn parse_snapshot(raw: &str) -> GenerationResult<Vec<OrderRecord>> {
    let parsed: Value = serde_json::from_str(raw).map_err(|e| GenerationError::NoData {
        reason: format!("snapshot is not valid JSON: {}", e),
    })?;
    let clients = parsed
        .get("state")
        .and_then(|state| state.get("clients"))
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::NoData {
            reason: "snapshot has no state.clients list".to_string(),
        })?;

    clients
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Null => Err(GenerationError::Unexpected(format!(
                "client record {} is null",
                index
            ))),
            Value::Object(_) => serde_json::from_value(entry.clone()).map_err(|e| {
                GenerationError::Unexpected(format!("client record {} is malformed: {}", index, e))
            }),
            _ => Ok(OrderRecord::default()),
        })
        .collect()
}

/// Distinct non-empty allocated users, sorted, for the filter picker.
pub fn allocated_users(records: &[OrderRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(OrderRecord::allocated_user_str)
        .filter(|user| !user.trim().is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
