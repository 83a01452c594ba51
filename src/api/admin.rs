use super::{ApiClient, ApiError};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct AdminSummary {
    #[serde(default)]
    data: Vec<Value>,
}

impl ApiClient {
    /// Cross-tenant summary, admin only. Row shape is server-defined, so the
    /// rows stay loosely typed.
    #[instrument(skip(self))]
    pub async fn admin_summary(&self) -> Result<Vec<Value>, ApiError> {
        let summary: AdminSummary = self.get("/admin/all_data").await?;

        Ok(summary.data)
    }
}
