//! Wire-shape DTOs for the verification endpoint and progress stream (§6).
//! Kept here rather than in `truce-panel` so an embedding HTTP layer can
//! `serde_json::to_value` them without redefining the shape, and so
//! `truce-panel`'s plain async functions stay free of transport concerns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{TimeWindow, VerdictType};

/// `POST /claims/{id}/verify` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyRequest {
    /// `time_start` query parameter.
    pub time_start: Option<DateTime<Utc>>,
    /// `time_end` query parameter.
    pub time_end: Option<DateTime<Utc>>,
    /// `providers[]` query parameter.
    #[serde(default)]
    pub providers: Vec<String>,
    /// `force` query parameter.
    #[serde(default)]
    pub force: bool,
}

/// The `time_window` field of [`VerifyResponse`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TimeWindowDto {
    /// Inclusive lower bound, if any.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound, if any.
    pub end: Option<DateTime<Utc>>,
}

impl From<&TimeWindow> for TimeWindowDto {
    fn from(window: &TimeWindow) -> Self {
        Self { start: window.start, end: window.end }
    }
}

/// `POST /claims/{id}/verify` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// The verification record's id.
    pub verification_id: Uuid,
    /// Whether this response was served from the cache.
    pub cached: bool,
    /// The legacy four-way verdict.
    pub verdict: VerdictType,
    /// When the returned record was created.
    pub created_at: DateTime<Utc>,
    /// Providers considered for this verification.
    pub providers: Vec<String>,
    /// Evidence ids considered, filtered to the requested time window.
    pub evidence_ids: Vec<Uuid>,
    /// Model-assessment ids current as of this verification.
    pub assessment_ids: Vec<Uuid>,
    /// The time window applied.
    pub time_window: TimeWindowDto,
}

/// `DELETE /claims/progress/{session_id}` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    /// Always `"cancelled"` on success.
    pub status: String,
}

impl Default for CancelResponse {
    fn default() -> Self {
        Self { status: "cancelled".to_string() }
    }
}
