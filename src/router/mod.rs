//! Role-gated navigation and the dashboard orchestration. Visibility is
//! derived from the role alone, never from fetched data; an absent or
//! unrecognized role shows no role-specific entries while the shell stays
//! usable. The admin summary is fetched eagerly on its own task and its
//! result is discarded if the session changed while it was in flight.

use crate::api::cards::CardRecord;
use crate::api::customers::CustomerRecord;
use crate::api::merchants::MerchantRecord;
use crate::api::{ApiClient, ApiError};
use crate::session::{Role, SessionStore};
use anyhow::Result;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavEntry {
    MyCards,
    AddCard,
    Customers,
    Merchants,
    AllCards,
    AdminSummary,
}

impl NavEntry {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::MyCards => "My Cards",
            Self::AddCard => "Add Card",
            Self::Customers => "Customers",
            Self::Merchants => "Merchants",
            Self::AllCards => "All Cards",
            Self::AdminSummary => "Admin Summary",
        }
    }
}

/// Ordered navigation entries for a role. `None` fails closed.
#[must_use]
pub fn nav_entries(role: Option<Role>) -> Vec<NavEntry> {
    match role {
        Some(Role::Customer) => vec![NavEntry::MyCards, NavEntry::AddCard],
        Some(Role::Merchant) => vec![NavEntry::Customers, NavEntry::AddCard],
        Some(Role::Admin) => vec![
            NavEntry::Customers,
            NavEntry::Merchants,
            NavEntry::AllCards,
            NavEntry::AdminSummary,
        ],
        None => Vec::new(),
    }
}

/// The view a signed-in user lands on.
#[must_use]
pub fn default_view(role: Option<Role>) -> Option<NavEntry> {
    nav_entries(role).first().copied()
}

/// One dashboard panel: rows, or the user-facing message explaining why they
/// are missing. Errors here never take down the rest of the dashboard.
pub type Panel<T> = std::result::Result<Vec<T>, String>;

#[derive(Debug, Default)]
pub struct DashboardView {
    pub entries: Vec<NavEntry>,
    pub customers: Option<Panel<CustomerRecord>>,
    pub merchants: Option<Panel<MerchantRecord>>,
    pub cards: Option<Panel<CardRecord>>,
    pub admin_summary: Option<Panel<Value>>,
}

#[derive(Debug)]
pub enum DashboardOutcome {
    /// A protected call returned 401; the session was cleared and any
    /// in-flight fetch result discarded.
    SignedOut,
    View(Box<DashboardView>),
}

/// Loads the role-scoped dashboard. Panels are fetched in sequence except the
/// admin summary, which runs concurrently and never blocks the others.
#[instrument(skip_all)]
pub async fn load_dashboard(
    api: &ApiClient,
    store: &mut SessionStore,
) -> Result<DashboardOutcome> {
    let Some(identity) = store.identity().cloned() else {
        return Ok(DashboardOutcome::SignedOut);
    };

    let role = store.role();
    let epoch = store.epoch();

    let admin_task: Option<JoinHandle<std::result::Result<Vec<Value>, ApiError>>> =
        if role == Some(Role::Admin) {
            let api = api.clone();
            Some(tokio::spawn(async move { api.admin_summary().await }))
        } else {
            None
        };

    let mut view = DashboardView {
        entries: nav_entries(role),
        ..DashboardView::default()
    };

    let signed_out = match role {
        Some(Role::Customer) => {
            match fetch_panel(store, api.list_cards_for(identity.user_id).await, "Failed to load cards")? {
                Some(panel) => {
                    view.cards = Some(panel);
                    false
                }
                None => true,
            }
        }
        Some(Role::Merchant) | Some(Role::Admin) => {
            load_directory_panels(api, store, &mut view).await?
        }
        None => false,
    };

    if let Some(task) = admin_task {
        if store.epoch() != epoch {
            // a 401 mid-flow cleared the session; whatever the task fetched
            // belongs to a session that no longer exists
            task.abort();
            debug!("discarding stale admin summary result");
        } else {
            match task.await {
                Ok(result) => {
                    match fetch_panel(store, result, "Failed to load admin summary")? {
                        Some(panel) => view.admin_summary = Some(panel),
                        None => return Ok(DashboardOutcome::SignedOut),
                    }
                }
                Err(err) => {
                    view.admin_summary = Some(Err(format!("admin summary fetch failed: {err}")));
                }
            }
        }
    }

    if signed_out {
        return Ok(DashboardOutcome::SignedOut);
    }

    Ok(DashboardOutcome::View(Box::new(view)))
}

/// Customers, merchants and the full card list for merchant/admin views.
/// Returns true when a 401 signed the client out mid-flow.
async fn load_directory_panels(
    api: &ApiClient,
    store: &mut SessionStore,
    view: &mut DashboardView,
) -> Result<bool> {
    match fetch_panel(store, api.list_customers().await, "Failed to load customers")? {
        Some(panel) => view.customers = Some(panel),
        None => return Ok(true),
    }

    match fetch_panel(store, api.list_merchants().await, "Failed to load merchants")? {
        Some(panel) => view.merchants = Some(panel),
        None => return Ok(true),
    }

    match fetch_panel(store, api.list_cards().await, "Failed to load cards")? {
        Some(panel) => view.cards = Some(panel),
        None => return Ok(true),
    }

    Ok(false)
}

/// Converts one fetch result into a panel. `Ok(None)` means a 401 cleared the
/// session and the caller must abandon the view.
fn fetch_panel<T>(
    store: &mut SessionStore,
    result: std::result::Result<Vec<T>, ApiError>,
    fallback: &str,
) -> Result<Option<Panel<T>>> {
    match result {
        Ok(rows) => Ok(Some(Ok(rows))),
        Err(err) => {
            if store.reconcile(&err)? {
                Ok(None)
            } else {
                Ok(Some(Err(err.user_message(fallback))))
            }
        }
    }
}
