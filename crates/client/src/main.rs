//! `notesdesk`: headless client for the notes and displacements API.
//!
//! Usage:
//!   notesdesk login <email>      (password read from NOTESDESK_PASSWORD)
//!   notesdesk logout
//!   notesdesk whoami
//!   notesdesk visit <path>

use std::sync::Arc;

use anyhow::{Context, bail};

use notesdesk_auth::Credentials;
use notesdesk_client::navigation::Navigator;
use notesdesk_client::{AppState, ClientConfig, HistoryNavigator, InitOutcome, LoginOutcome};

const PASSWORD_ENV: &str = "NOTESDESK_PASSWORD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    notesdesk_observability::init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;
    let navigator: Arc<dyn Navigator> = Arc::new(HistoryNavigator::new("/"));
    let app = AppState::new(config, navigator).context("failed to initialize client")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["login", email] => login(&app, email).await?,
        ["logout"] => {
            app.session.initialize().await;
            app.session.logout().await;
            println!("signed out");
        }
        ["whoami"] => whoami(&app).await,
        ["visit", path] => visit(&app, path).await?,
        _ => bail!("usage: notesdesk <login <email> | logout | whoami | visit <path>>"),
    }

    Ok(())
}

async fn login(app: &AppState, email: &str) -> anyhow::Result<()> {
    let password = std::env::var(PASSWORD_ENV).with_context(|| format!("{PASSWORD_ENV} is not set"))?;

    match app.session.login(&Credentials::new(email, password)).await {
        LoginOutcome::Success => {
            let landing = app.navigator.current_path();
            let nav = app.router.navigate(&landing).await?;
            println!("signed in; landed on {} ({:?})", nav.path, nav.view);
            Ok(())
        }
        LoginOutcome::Failure { message } => bail!("login failed: {message}"),
    }
}

async fn whoami(app: &AppState) {
    match app.session.initialize().await {
        InitOutcome::NoToken | InitOutcome::Failed => println!("not signed in"),
        _ => match app.session.user() {
            Some(user) => println!(
                "{} ({}) role={}",
                user.display_name().unwrap_or_else(|| user.id.to_string()),
                user.email().unwrap_or("-"),
                user.role,
            ),
            None => println!("not signed in"),
        },
    }
}

async fn visit(app: &AppState, path: &str) -> anyhow::Result<()> {
    let nav = app.router.navigate(path).await?;
    println!("{} -> {:?}", nav.path, nav.view);
    Ok(())
}
