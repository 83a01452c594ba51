use crate::card::intake::{self, IntakeError};
use crate::cli::actions::views::print_cards;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;

/// Handle the card intake and listing actions
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let (mut store, api) = super::open(globals)?;

    match action {
        Action::CardList { owner } => {
            let result = match owner {
                Some(owner_id) => api.list_cards_for(owner_id).await,
                None => api.list_cards().await,
            };

            match result {
                Ok(cards) => print_cards(cards),
                Err(err) => {
                    if store.reconcile(&err)? {
                        return Err(super::signed_out_error());
                    }
                    anyhow::bail!(err.user_message("Failed to load cards"));
                }
            }
        }
        Action::CardAdd { input, owner } => {
            let receipt = match owner {
                // merchants and admins may store for another customer
                Some(owner_id) => intake::submit_for(&api, &mut store, &input, owner_id).await,
                None => intake::submit(&api, &mut store, &input).await,
            };

            match receipt {
                Ok(receipt) => {
                    println!("{}", receipt.message);
                    println!("Stored {}", receipt.masked_number);
                    println!();
                    print_cards(receipt.cards);
                }
                Err(IntakeError::NotSignedIn) => return Err(super::not_signed_in_error()),
                Err(err) => anyhow::bail!("{err}"),
            }
        }
        Action::CustomerAdd { customer, input } => {
            // same local pipeline as card add before anything hits the wire
            if let Err(err) = input.validate() {
                anyhow::bail!("{err}");
            }

            match api.store_customer_with_card(&customer, &input).await {
                Ok(stored) => {
                    if stored.message.trim().is_empty() {
                        println!("Customer and card stored");
                    } else {
                        println!("{}", stored.message);
                    }

                    if let Some(customer_id) = stored.customer_id {
                        println!("Customer id: {customer_id}");
                    }
                }
                Err(err) => {
                    if store.reconcile(&err)? {
                        return Err(super::signed_out_error());
                    }
                    anyhow::bail!(err.user_message("Failed to store customer"));
                }
            }
        }
        _ => anyhow::bail!("unsupported action"),
    }

    Ok(())
}
