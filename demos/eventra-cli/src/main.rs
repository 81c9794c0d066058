//! Command-line demo of the Eventra client.
//!
//! ```text
//! eventra-cli login <email> <password>
//! eventra-cli whoami
//! eventra-cli events [search]
//! eventra-cli my-registrations
//! eventra-cli check-in <code>
//! eventra-cli logout
//! ```
//!
//! Tokens persist in `EVENTRA_TOKEN_FILE` (default `eventra-tokens.json`),
//! so a login survives between invocations. Set `RUST_LOG=debug` to watch
//! the refresh machinery.

use eventra::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_TOKEN_FILE: &str = "eventra-tokens.json";

const USAGE: &str = "usage: eventra-cli <login EMAIL PASSWORD | logout | whoami | events [SEARCH] | my-registrations | check-in CODE>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let mut config = ClientConfig::from_env()?;
    if config.token_file.is_none() {
        config.token_file = Some(DEFAULT_TOKEN_FILE.into());
    }
    let client = eventra::connect(config)?;

    let mut expired = client.auth().subscribe();
    let state = client.auth().bootstrap().await;
    tracing::debug!(authenticated = state.is_authenticated(), "bootstrap finished");

    let result = match (command.as_str(), &args[1..]) {
        ("login", [email, password]) => {
            let success = client.auth().login(email, password).await?;
            println!("logged in as {}", success.user.display_name());
            Ok(())
        }
        ("logout", []) => {
            client.auth().logout().await;
            println!("logged out");
            Ok(())
        }
        ("whoami", []) => {
            match state.user() {
                Some(user) => println!("{} <{}>", user.display_name(), user.email),
                None => println!("not logged in"),
            }
            Ok(())
        }
        ("events", rest) => list_events(&client, rest.first().cloned()).await,
        ("my-registrations", []) => my_registrations(&client).await,
        ("check-in", [code]) => {
            let result = client.registrations().check_in(code).await?;
            println!("{}", result.message.as_deref().unwrap_or("checked in"));
            Ok(())
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Ok(SessionEvent::Expired { reason }) = expired.try_recv() {
        eprintln!("session expired ({reason}), please log in again");
    }
    result.map_err(Into::into)
}

async fn list_events<T: HttpTransport, S: TokenStore>(
    client: &EventraClient<T, S>,
    search: Option<String>,
) -> Result<(), EventraError> {
    let filters = EventFilters {
        search,
        ..EventFilters::default()
    };
    for event in client.events().list(&filters).await? {
        let date = event
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "tba".into());
        println!(
            "#{:<4} {date}  {}{}",
            event.id,
            event.title,
            if event.is_full { "  (full)" } else { "" }
        );
    }
    Ok(())
}

async fn my_registrations<T: HttpTransport, S: TokenStore>(
    client: &EventraClient<T, S>,
) -> Result<(), EventraError> {
    let registrations = client.registrations().mine().await?;
    let today = chrono::Local::now().date_naive();
    let dashboard = partition_registrations(registrations, today);

    println!("upcoming:");
    for registration in &dashboard.upcoming {
        print_registration(client, registration);
    }
    println!("past:");
    for registration in &dashboard.past {
        print_registration(client, registration);
    }
    Ok(())
}

fn print_registration<T: HttpTransport, S: TokenStore>(
    client: &EventraClient<T, S>,
    registration: &Registration,
) {
    let date = registration
        .event
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "tba".into());
    let code = registration.registration_code.as_deref().unwrap_or("-");
    println!("  {date}  {}  [{code}]", registration.event.title);
    if let Some(url) = client.qr_code_url(registration) {
        println!("           qr: {url}");
    }
    if registration.checked_in {
        println!("           checked in");
    }
}
