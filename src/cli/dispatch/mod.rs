use crate::api::customers::NewCustomer;
use crate::card::CardInput;
use crate::cli::actions::Action;
use crate::cli::globals::{default_session_file, GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;
use std::path::PathBuf;

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .map(ToString::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --{name}"))
}

fn card_input(matches: &clap::ArgMatches) -> Result<CardInput> {
    Ok(CardInput::from_raw(
        &required(matches, "name")?,
        &required(matches, "number")?,
        &required(matches, "expiry")?,
        &required(matches, "cvv")?,
    ))
}

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs::new(
        required(matches, "api-url")?,
        matches
            .get_one::<String>("session-file")
            .map_or_else(default_session_file, PathBuf::from),
    );

    let action = match matches.subcommand() {
        Some(("login", sub)) => Action::Login {
            username: required(sub, "username")?,
            password: SecretString::from(required(sub, "password")?),
        },
        Some(("register", sub)) => Action::Register {
            username: required(sub, "username")?,
            email: required(sub, "email")?,
            password: SecretString::from(required(sub, "password")?),
        },
        Some(("logout", _)) => Action::Logout,
        Some(("session", _)) => Action::Session,
        Some(("dashboard", _)) => Action::Dashboard,
        Some(("card", sub)) => match sub.subcommand() {
            Some(("list", sub)) => Action::CardList {
                owner: sub.get_one::<i64>("owner").copied(),
            },
            Some(("add", sub)) => Action::CardAdd {
                input: card_input(sub)?,
                owner: sub.get_one::<i64>("owner").copied(),
            },
            _ => anyhow::bail!("missing card subcommand"),
        },
        Some(("customer", sub)) => match sub.subcommand() {
            Some(("list", _)) => Action::CustomerList,
            Some(("add", sub)) => Action::CustomerAdd {
                customer: NewCustomer {
                    merchant_id: sub
                        .get_one::<i64>("merchant-id")
                        .copied()
                        .ok_or_else(|| anyhow::anyhow!("missing required argument: --merchant-id"))?,
                    firstname: required(sub, "firstname")?,
                    lastname: required(sub, "lastname")?,
                    email: required(sub, "email")?,
                    phone: required(sub, "phone")?,
                },
                input: card_input(sub)?,
            },
            _ => anyhow::bail!("missing customer subcommand"),
        },
        Some(("merchant", sub)) => match sub.subcommand() {
            Some(("list", _)) => Action::MerchantList,
            _ => anyhow::bail!("missing merchant subcommand"),
        },
        Some(("admin", sub)) => match sub.subcommand() {
            Some(("summary", _)) => Action::AdminSummary,
            _ => anyhow::bail!("missing admin subcommand"),
        },
        _ => anyhow::bail!("missing subcommand"),
    };

    Ok((action, globals))
}
