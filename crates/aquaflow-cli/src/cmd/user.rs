use crate::output::print_json;
use anyhow::Context;
use aquaflow_core::{
    backend::{Credentials, DeliveryBackend, DirectoryBackend, NewUser},
    config::ServiceConfig,
    paths,
    ratelimit::{actions, AttemptDb, RateLimiter},
};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(clap::Subcommand)]
pub enum UserSubcommand {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        /// Full name
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in with username or email
    Login {
        /// Username or email
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Show the role attached to a user id
    Role { user_id: String },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::Signup {
            email,
            username,
            name,
            password,
        } => signup(root, email, username, name, password, json),
        UserSubcommand::Login { username, password } => login(root, username, password, json),
        UserSubcommand::Role { user_id } => role(root, &user_id, json),
    }
}

fn limiter(root: &Path) -> anyhow::Result<RateLimiter> {
    let store = AttemptDb::open(&paths::attempts_db_path(root))?;
    Ok(RateLimiter::new(Box::new(store)))
}

// ---------------------------------------------------------------------------
// signup
// ---------------------------------------------------------------------------

fn signup(
    root: &Path,
    email: String,
    username: String,
    name: String,
    password: String,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = ServiceConfig::load(root).context("failed to load config")?;
    let backend = DirectoryBackend::open(root)?;

    let decision = limiter(root)?.check(
        actions::SIGNUP_ATTEMPTS,
        cfg.limits.auth_limit,
        cfg.limits.auth_window_ms,
    );
    if decision.limited {
        anyhow::bail!(
            "Rate limit reached. Retry in {}s.",
            decision.retry_after_secs.unwrap_or_default()
        );
    }

    let session = backend.register(NewUser {
        email,
        username,
        name,
        password,
    })?;

    if json {
        print_json(&session)?;
    } else {
        println!("Welcome, {}! Account '{}' created.", session.name, session.username);
        println!("  user id: {}", session.user_id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

fn login(root: &Path, username: String, password: String, json: bool) -> anyhow::Result<()> {
    let cfg = ServiceConfig::load(root).context("failed to load config")?;
    let backend = DirectoryBackend::open(root)?;

    let decision = limiter(root)?.check(
        actions::LOGIN_ATTEMPTS,
        cfg.limits.auth_limit,
        cfg.limits.auth_window_ms,
    );
    if decision.limited {
        anyhow::bail!(
            "Too many login attempts. Retry in {}s.",
            decision.retry_after_secs.unwrap_or_default()
        );
    }

    let session = backend.authenticate(&Credentials {
        identifier: username,
        password,
    })?;

    if json {
        print_json(&session)?;
    } else {
        println!("Signed in as {} ({})", session.username, session.role);
        println!("  user id: {}", session.user_id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// role
// ---------------------------------------------------------------------------

fn role(root: &Path, user_id: &str, json: bool) -> anyhow::Result<()> {
    let backend = DirectoryBackend::open(root)?;
    let role = backend.user_role(user_id)?;

    if json {
        print_json(&serde_json::json!({ "user_id": user_id, "role": role }))?;
    } else {
        println!("{role}");
    }
    Ok(())
}
