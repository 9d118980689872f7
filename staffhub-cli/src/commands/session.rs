use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use client::{navigation::navigation_for, session::SessionStore};
use rpassword::prompt_password;
use shared::{config::ClientConfig, format::is_valid_email, models::{LoginCredentials, User}};
use tracing::warn;

use super::{Output, connect, prompt, signed_in};

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Sign in and store the session token
    Login(LoginArgs),
    /// Show the signed-in collaborator
    Me,
    /// Sign out and erase the stored token
    Logout,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account e-mail; prompted for when omitted
    #[arg(long, short)]
    pub email: Option<String>,
}

pub async fn run(command: SessionCommand, config: &ClientConfig, output: Output) -> Result<()> {
    match command {
        SessionCommand::Login(args) => login(args, config, output).await,
        SessionCommand::Me => me(config, output).await,
        SessionCommand::Logout => logout(config).await,
    }
}

async fn login(args: LoginArgs, config: &ClientConfig, output: Output) -> Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    if !is_valid_email(&email) {
        bail!("'{email}' is not a valid e-mail address");
    }
    let password = prompt_password("Password: ")?;
    if password.trim().is_empty() {
        bail!("password must not be empty");
    }

    let store = connect(config).await?;
    let user = store
        .login(&LoginCredentials::new(email, password))
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))
        .context("login failed")?;

    output.emit(&user, |user| print_session_summary(user, &store))
}

async fn me(config: &ClientConfig, output: Output) -> Result<()> {
    let store = signed_in(config).await?;
    let user = store
        .api()
        .current_user()
        .await
        .context("failed to fetch profile")?;
    output.emit(&user, |user| print_session_summary(user, &store))
}

async fn logout(config: &ClientConfig) -> Result<()> {
    let store = connect(config).await?;
    if store.is_authenticated() {
        if let Err(err) = store.api().logout_remote().await {
            warn!(error = %err, "server-side logout failed");
        }
        store.logout();
        println!("Signed out.");
    } else {
        store.logout();
        println!("No active session.");
    }
    Ok(())
}

fn print_session_summary(user: &User, store: &SessionStore) {
    println!("Logged in as {} <{}>", user.name, user.email);
    println!("role: {}", user.role.label());
    if !user.areas.is_empty() {
        println!(
            "areas: {}",
            user.areas
                .iter()
                .map(|area| area.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!(
        "menu: {}",
        navigation_for(user.role)
            .iter()
            .map(|item| item.label)
            .collect::<Vec<_>>()
            .join(" | ")
    );
    if store.permissions().manage_settings {
        println!("manager tools enabled");
    }
}
