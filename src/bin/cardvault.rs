use anyhow::Result;
use cardvault::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Login { .. }
        | Action::Register { .. }
        | Action::Logout
        | Action::Session => actions::auth::handle(action, &globals).await?,
        Action::CardList { .. } | Action::CardAdd { .. } | Action::CustomerAdd { .. } => {
            actions::cards::handle(action, &globals).await?;
        }
        Action::Dashboard
        | Action::CustomerList
        | Action::MerchantList
        | Action::AdminSummary => actions::views::handle(action, &globals).await?,
    }

    Ok(())
}
