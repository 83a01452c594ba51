//! Card intake submission: local fail-fast validation, the store call, and
//! the post-success refresh of the owner's card list. After the call resolves
//! only the masked number is retained.

use crate::api::cards::{CardRecord, StoreCardRequest};
use crate::api::{ApiClient, ApiError};
use crate::card::{mask_card_number, CardInput, CardInputError};
use crate::session::SessionStore;
use thiserror::Error;
use tracing::{instrument, warn};

#[derive(Debug, Error)]
pub enum IntakeError {
    /// First failing local rule; never reaches the network.
    #[error(transparent)]
    Invalid(#[from] CardInputError),

    /// No authenticated identity, or the session was rejected mid-call; the
    /// user must sign in again.
    #[error("No signed-in user found; sign in and try again")]
    NotSignedIn,

    /// Server-side rejection, message verbatim. The caller's input is intact
    /// for correction and resubmission.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Outcome of a stored card: the server message, the masked number kept for
/// display, and the owner's refreshed card list.
#[derive(Debug)]
pub struct IntakeReceipt {
    pub message: String,
    pub masked_number: String,
    pub cards: Vec<CardRecord>,
}

/// Submits a card for the authenticated identity. Rejected locally when no
/// identity is present; no network call is attempted in that case.
#[instrument(skip_all)]
pub async fn submit(
    api: &ApiClient,
    store: &mut SessionStore,
    input: &CardInput,
) -> Result<IntakeReceipt, IntakeError> {
    let Some(identity) = store.identity().cloned() else {
        return Err(IntakeError::NotSignedIn);
    };

    submit_for(api, store, input, identity.user_id).await
}

/// Submits a card for an explicit owner, used by merchant and admin flows.
#[instrument(skip_all, fields(owner_id = owner_id))]
pub async fn submit_for(
    api: &ApiClient,
    store: &mut SessionStore,
    input: &CardInput,
    owner_id: i64,
) -> Result<IntakeReceipt, IntakeError> {
    input.validate()?;

    let request = StoreCardRequest::from_input(input, owner_id);
    let masked_number = mask_card_number(&request.card);

    let message = match api.store_card(&request).await {
        Ok(message) if !message.trim().is_empty() => message,
        Ok(_) => "Card stored successfully".to_string(),
        Err(err) => {
            if store.reconcile(&err)? {
                return Err(IntakeError::NotSignedIn);
            }

            return Err(match err {
                ApiError::Validation(message) => IntakeError::Rejected(message),
                other => IntakeError::Api(other),
            });
        }
    };

    // the full number and CVV end here
    drop(request);

    let cards = match api.list_cards_for(owner_id).await {
        Ok(cards) => cards,
        Err(err) => {
            if store.reconcile(&err)? {
                return Err(IntakeError::NotSignedIn);
            }

            warn!("card stored but refresh failed: {err}");
            Vec::new()
        }
    };

    Ok(IntakeReceipt {
        message,
        masked_number,
        cards,
    })
}
