use super::{ApiClient, ApiError};
use crate::card::CardInput;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Clone, Debug, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: i64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub merchant_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CustomerList {
    #[serde(default)]
    customers: Vec<CustomerRecord>,
}

/// Contact details for `POST /customer/store_with_card`, which creates the
/// customer and stores their first card in one request.
#[derive(Clone, Debug)]
pub struct NewCustomer {
    pub merchant_id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
struct StoreWithCardRequest {
    merchant_id: i64,
    firstname: String,
    lastname: String,
    email: String,
    phone: String,
    card: String,
    exp: String,
    cvv: String,
}

#[derive(Debug, Deserialize)]
pub struct StoredCustomer {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub customer_id: Option<i64>,
}

impl ApiClient {
    /// Lists active customers; merchant and admin only.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<CustomerRecord>, ApiError> {
        let list: CustomerList = self.get("/customer/list").await?;

        Ok(list.customers)
    }

    /// Creates a customer together with their first card.
    #[instrument(skip_all)]
    pub async fn store_customer_with_card(
        &self,
        customer: &NewCustomer,
        card: &CardInput,
    ) -> Result<StoredCustomer, ApiError> {
        let request = StoreWithCardRequest {
            merchant_id: customer.merchant_id,
            firstname: customer.firstname.clone(),
            lastname: customer.lastname.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            card: card.card_digits(),
            exp: card.expiry.clone(),
            cvv: card.cvv.clone(),
        };

        self.post("/customer/store_with_card", &request).await
    }
}
