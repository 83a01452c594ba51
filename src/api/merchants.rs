use super::{ApiClient, ApiError};
use serde::Deserialize;
use tracing::instrument;

#[derive(Clone, Debug, Deserialize)]
pub struct MerchantRecord {
    pub merchant_id: i64,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MerchantList {
    #[serde(default)]
    merchants: Vec<MerchantRecord>,
}

impl ApiClient {
    /// Lists merchants; available to any authenticated role.
    #[instrument(skip(self))]
    pub async fn list_merchants(&self) -> Result<Vec<MerchantRecord>, ApiError> {
        let list: MerchantList = self.get("/merchant/list").await?;

        Ok(list.merchants)
    }
}
