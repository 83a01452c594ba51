//! Card listing and storage calls. Card numbers leave this module masked
//! only; the full number exists in memory just long enough to transmit.

use super::{ApiClient, ApiError};
use crate::card::{mask_card_number, CardInput};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A stored card as returned by the API. The number is replaced with its
/// masked form before the record is handed out.
#[derive(Clone, Debug, Deserialize)]
pub struct CardRecord {
    pub card_id: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

impl CardRecord {
    /// `**** **** **** last4`, or empty when the server sent no number.
    #[must_use]
    pub fn masked_number(&self) -> String {
        self.card_number
            .as_deref()
            .map(mask_card_number)
            .unwrap_or_default()
    }

    fn redact(mut self) -> Self {
        self.card_number = self.card_number.as_deref().map(mask_card_number);
        self
    }
}

#[derive(Debug, Deserialize)]
struct CardList {
    #[serde(default)]
    cards: Vec<CardRecord>,
}

/// Wire shape of `POST /card/store`. Field names follow the API contract.
#[derive(Debug, Serialize)]
pub struct StoreCardRequest {
    pub customer_id: i64,
    #[serde(rename = "cardholderName")]
    pub cardholder_name: String,
    pub card: String,
    pub exp: String,
    pub cvv: String,
}

impl StoreCardRequest {
    /// Builds the wire payload from a validated input: display spacing is
    /// stripped from the number, expiry and CVV go out as displayed.
    #[must_use]
    pub fn from_input(input: &CardInput, owner_id: i64) -> Self {
        Self {
            customer_id: owner_id,
            cardholder_name: input.cardholder_name.clone(),
            card: input.card_digits(),
            exp: input.expiry.clone(),
            cvv: input.cvv.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoreCardResponse {
    #[serde(default)]
    message: String,
}

impl ApiClient {
    /// Lists cards in the caller's scope: own cards for a customer, all
    /// active cards for merchant and admin.
    #[instrument(skip(self))]
    pub async fn list_cards(&self) -> Result<Vec<CardRecord>, ApiError> {
        let list: CardList = self.get("/card/list").await?;

        Ok(list.cards.into_iter().map(CardRecord::redact).collect())
    }

    /// Lists cards owned by one customer.
    #[instrument(skip(self))]
    pub async fn list_cards_for(&self, owner_id: i64) -> Result<Vec<CardRecord>, ApiError> {
        let list: CardList = self.get(&format!("/card/list/{owner_id}")).await?;

        Ok(list.cards.into_iter().map(CardRecord::redact).collect())
    }

    /// Stores a card. The request carries the full number and CVV; neither is
    /// logged and the caller drops them once this resolves.
    #[instrument(skip_all)]
    pub async fn store_card(&self, request: &StoreCardRequest) -> Result<String, ApiError> {
        let response: StoreCardResponse = self.post("/card/store", request).await?;

        Ok(response.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_request_strips_display_spacing_only() {
        let input = CardInput::from_raw("Ada Lovelace", "4111 1111 1111 1111", "12/99", "123");
        let request = StoreCardRequest::from_input(&input, 42);

        assert_eq!(request.customer_id, 42);
        assert_eq!(request.card, "4111111111111111");
        assert_eq!(request.exp, "12/99");
        assert_eq!(request.cvv, "123");
    }

    #[test]
    fn test_store_request_wire_field_names() {
        let input = CardInput::from_raw("Ada", "4111111111111111", "12/99", "123");
        let request = StoreCardRequest::from_input(&input, 7);
        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(wire["customer_id"], 7);
        assert_eq!(wire["cardholderName"], "Ada");
        assert_eq!(wire["card"], "4111111111111111");
        assert_eq!(wire["exp"], "12/99");
        assert_eq!(wire["cvv"], "123");
    }

    #[test]
    fn test_record_redaction_keeps_last_four() {
        let record = CardRecord {
            card_id: 1,
            customer_id: Some(7),
            card_number: Some("4111111111111111".to_string()),
            expiry_date: Some("12/30".to_string()),
        }
        .redact();

        assert_eq!(
            record.card_number.as_deref(),
            Some("**** **** **** 1111")
        );
        assert_eq!(record.masked_number(), "**** **** **** 1111");
    }

    #[test]
    fn test_record_without_number_masks_to_empty() {
        let record = CardRecord {
            card_id: 1,
            customer_id: None,
            card_number: None,
            expiry_date: None,
        };

        assert_eq!(record.masked_number(), "");
    }
}
