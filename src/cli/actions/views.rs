use crate::api::cards::CardRecord;
use crate::api::customers::CustomerRecord;
use crate::api::merchants::MerchantRecord;
use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::router::{self, DashboardOutcome, Panel};
use anyhow::Result;
use serde_json::Value;

/// The dashboard shows at most the ten most recent cards.
const RECENT_CARDS: usize = 10;

/// Handle the read-only views: dashboard and the directory lists
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let (mut store, api) = super::open(globals)?;

    match action {
        Action::Dashboard => {
            if !store.is_authenticated() {
                println!("Not signed in; run `cardvault login` to continue");
                return Ok(());
            }

            // shell first: identity and navigation render even when a role is
            // missing or a panel fails
            let identity = store
                .identity()
                .cloned()
                .ok_or_else(super::not_signed_in_error)?;
            let role = store.role();

            println!(
                "Card Vault: signed in as {} ({})",
                identity.username,
                role.map_or("no role", |r| r.as_str())
            );

            let entries = router::nav_entries(role);
            if entries.is_empty() {
                println!("No views available for this account");
            } else {
                let labels: Vec<&str> = entries.iter().map(|e| e.label()).collect();
                println!("Views: {}", labels.join(" | "));
            }

            match router::load_dashboard(&api, &mut store).await? {
                DashboardOutcome::SignedOut => return Err(super::signed_out_error()),
                DashboardOutcome::View(view) => {
                    if let Some(panel) = view.customers {
                        print_panel("Customers", panel, print_customers);
                    }
                    if let Some(panel) = view.merchants {
                        print_panel("Merchants", panel, print_merchants);
                    }
                    if let Some(panel) = view.cards {
                        print_panel(
                            &format!("Recent Cards (Last {RECENT_CARDS})"),
                            panel.map(|cards| {
                                cards.into_iter().take(RECENT_CARDS).collect::<Vec<_>>()
                            }),
                            print_cards,
                        );
                    }
                    if let Some(panel) = view.admin_summary {
                        print_panel("Admin Summary", panel, print_summary);
                    }
                }
            }
        }
        Action::CustomerList => match api.list_customers().await {
            Ok(customers) => print_customers(customers),
            Err(err) => {
                if store.reconcile(&err)? {
                    return Err(super::signed_out_error());
                }
                anyhow::bail!(err.user_message("Failed to load customers"));
            }
        },
        Action::MerchantList => match api.list_merchants().await {
            Ok(merchants) => print_merchants(merchants),
            Err(err) => {
                if store.reconcile(&err)? {
                    return Err(super::signed_out_error());
                }
                anyhow::bail!(err.user_message("Failed to load merchants"));
            }
        },
        Action::AdminSummary => match api.admin_summary().await {
            Ok(rows) => print_summary(rows),
            Err(err) => {
                if store.reconcile(&err)? {
                    return Err(super::signed_out_error());
                }
                anyhow::bail!(err.user_message("Failed to load admin summary"));
            }
        },
        _ => anyhow::bail!("unsupported action"),
    }

    Ok(())
}

fn print_panel<T>(title: &str, panel: Panel<T>, render: fn(Vec<T>)) {
    println!();
    println!("== {title} ==");

    match panel {
        Ok(rows) => render(rows),
        Err(message) => println!("error: {message}"),
    }
}

pub(crate) fn print_customers(customers: Vec<CustomerRecord>) {
    if customers.is_empty() {
        println!("No customers found");
        return;
    }

    println!("{:<8} {:<24} {:<28} {}", "ID", "NAME", "EMAIL", "PHONE");

    for c in customers {
        let name = format!(
            "{} {}",
            c.firstname.unwrap_or_default(),
            c.lastname.unwrap_or_default()
        );

        println!(
            "{:<8} {:<24} {:<28} {}",
            c.customer_id,
            name.trim(),
            c.email.unwrap_or_default(),
            c.phone.unwrap_or_default()
        );
    }
}

pub(crate) fn print_merchants(merchants: Vec<MerchantRecord>) {
    if merchants.is_empty() {
        println!("No merchants found");
        return;
    }

    println!("{:<8} {:<28} {}", "ID", "BUSINESS", "EMAIL");

    for m in merchants {
        println!(
            "{:<8} {:<28} {}",
            m.merchant_id,
            m.business_name.unwrap_or_default(),
            m.contact_email.unwrap_or_default()
        );
    }
}

pub(crate) fn print_cards(cards: Vec<CardRecord>) {
    if cards.is_empty() {
        println!("No cards stored yet");
        return;
    }

    println!("{:<10} {:<10} {:<22} {}", "CARD ID", "CUSTOMER", "NUMBER", "EXPIRY");

    for card in cards {
        println!(
            "{:<10} {:<10} {:<22} {}",
            card.card_id,
            card.customer_id.map_or_else(String::new, |id| id.to_string()),
            card.masked_number(),
            card.expiry_date.unwrap_or_default()
        );
    }
}

fn print_summary(rows: Vec<Value>) {
    if rows.is_empty() {
        println!("No records");
        return;
    }

    for row in rows {
        println!("{row}");
    }
}
