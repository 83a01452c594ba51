use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

/// Default API base; overridable per invocation or via the environment.
pub const DEFAULT_API_URL: &str = "https://credit-card-vault-cryptography.onrender.com";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn card_args() -> Vec<Arg> {
    vec![
        Arg::new("name")
            .long("name")
            .help("Cardholder name")
            .required(true),
        Arg::new("number")
            .long("number")
            .help("Card number, 13-19 digits, spaces allowed")
            .required(true),
        Arg::new("expiry")
            .long("expiry")
            .help("Expiry date as MM/YY")
            .required(true),
        Arg::new("cvv")
            .long("cvv")
            .help("Card verification value, 3-4 digits")
            .required(true),
    ]
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("cardvault")
        .about("Client for the card-vault payment card intake API")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the card-vault API")
                .default_value(DEFAULT_API_URL)
                .env("CARDVAULT_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("session-file")
                .long("session-file")
                .help("Where the signed-in session is persisted (default: $HOME/.cardvault/session.json)")
                .env("CARDVAULT_SESSION_FILE")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("CARDVAULT_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and persist the session")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .env("CARDVAULT_PASSWORD")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account, then sign in with the same credentials")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .required(true),
                )
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .env("CARDVAULT_PASSWORD")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("logout")
                .about("Invalidate the server session and clear local state"),
        )
        .subcommand(
            Command::new("session")
                .about("Show the persisted session and verify it with the server"),
        )
        .subcommand(Command::new("dashboard").about("Role-gated landing view"))
        .subcommand(
            Command::new("card")
                .about("List and store cards")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("list").about("List cards in your scope").arg(
                        Arg::new("owner")
                            .long("owner")
                            .help("List cards for one customer id")
                            .value_parser(clap::value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Validate and store a card")
                        .args(card_args())
                        .arg(
                            Arg::new("owner")
                                .long("owner")
                                .help("Store for another customer id (merchant/admin)")
                                .value_parser(clap::value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("customer")
                .about("Customer directory")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("list").about("List active customers"))
                .subcommand(
                    Command::new("add")
                        .about("Create a customer together with their first card")
                        .arg(
                            Arg::new("merchant-id")
                                .long("merchant-id")
                                .required(true)
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(Arg::new("firstname").long("firstname").required(true))
                        .arg(Arg::new("lastname").long("lastname").required(true))
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("phone").long("phone").required(true))
                        .args(card_args()),
                ),
        )
        .subcommand(
            Command::new("merchant")
                .about("Merchant directory")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("list").about("List merchants")),
        )
        .subcommand(
            Command::new("admin")
                .about("Admin views")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("summary").about("Cross-tenant summary, admin only")),
        )
}
