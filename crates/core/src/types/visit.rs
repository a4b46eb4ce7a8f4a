//! Visit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::place_id::PlaceId;

/// A recorded visit to a coffee shop.
///
/// Append-only from the client's perspective: created through the record-visit
/// call, never mutated or deleted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub place_id: PlaceId,
    pub name: String,
    pub visited_at: DateTime<Utc>,
}
