pub mod auth;
pub mod cards;
pub mod views;

use crate::api::customers::NewCustomer;
use crate::api::ApiClient;
use crate::card::CardInput;
use crate::cli::globals::GlobalArgs;
use crate::session::SessionStore;
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        username: String,
        password: SecretString,
    },
    Register {
        username: String,
        email: String,
        password: SecretString,
    },
    Logout,
    Session,
    Dashboard,
    CardList {
        owner: Option<i64>,
    },
    CardAdd {
        input: CardInput,
        owner: Option<i64>,
    },
    CustomerList,
    CustomerAdd {
        customer: NewCustomer,
        input: CardInput,
    },
    MerchantList,
    AdminSummary,
}

/// Loads the persisted session and binds an API client to it.
pub(crate) fn open(globals: &GlobalArgs) -> Result<(SessionStore, ApiClient)> {
    let store = SessionStore::load(globals.session_file.clone());
    let api = ApiClient::new(&globals.api_url, store.cookie())?;

    Ok((store, api))
}

pub(crate) fn signed_out_error() -> anyhow::Error {
    anyhow::anyhow!("Session expired; run `cardvault login` to sign in again")
}

pub(crate) fn not_signed_in_error() -> anyhow::Error {
    anyhow::anyhow!("Not signed in; run `cardvault login` first")
}
