//! API query and error types.

use serde::{Deserialize, Serialize};

/// Optional filters for the records endpoint. Dates are `YYYY-MM-DD`,
/// both bounds inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub site_id: Option<String>,
    pub site_type: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
