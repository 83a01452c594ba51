use crate::api::ApiError;
use crate::auth::{AuthFlow, RegisterOutcome};
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;

/// Handle the login, register, logout and session actions
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let (mut store, api) = super::open(globals)?;

    match action {
        Action::Login { username, password } => {
            let mut flow = AuthFlow::new(api, &mut store);
            let session = flow.login(&username, &password).await?;

            let role = session.role.map_or("unknown", |r| r.as_str());
            println!("Signed in as {} ({role})", session.identity.username);
        }
        Action::Register {
            username,
            email,
            password,
        } => {
            let mut flow = AuthFlow::new(api, &mut store);

            match flow.register(&username, &email, &password).await? {
                RegisterOutcome::SignedIn { message, session } => {
                    let role = session.role.map_or("unknown", |r| r.as_str());
                    println!("{message}");
                    println!("Signed in as {} ({role})", session.identity.username);
                }
                RegisterOutcome::RegisteredOnly {
                    message,
                    login_error,
                } => {
                    println!("{message}");
                    println!("Sign-in did not complete: {login_error}");
                    println!("Run `cardvault login -u {username}` to sign in manually");
                }
            }
        }
        Action::Logout => {
            let mut flow = AuthFlow::new(api, &mut store);
            flow.logout().await?;

            println!("Signed out");
        }
        Action::Session => {
            let Some(session) = store.session().cloned() else {
                println!("Not signed in");
                return Ok(());
            };

            let role = session.role.map_or("unknown", |r| r.as_str());
            println!(
                "Local session: {} (user id {}, role {role})",
                session.identity.username, session.identity.user_id
            );

            match api.session_check().await {
                Ok(check) if check.logged_in => println!("Server session: live"),
                Ok(_) | Err(ApiError::Unauthorized(_)) => {
                    store.clear()?;
                    println!("Server session: expired; local session cleared");
                }
                Err(err) => println!(
                    "Server session: could not verify ({})",
                    err.user_message("request failed")
                ),
            }
        }
        _ => anyhow::bail!("unsupported action"),
    }

    Ok(())
}
