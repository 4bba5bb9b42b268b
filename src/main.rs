//! Activity Monitor - command-line entry point
//!
//! Drives the screen state holders from the terminal: sign in, browse and
//! toggle equipment, manage the profile.

use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::info;

use activity_monitor_lib::{
    config::Config,
    logging,
    models::{Equipment, Outcome, StatusFilter, User},
    screens::OperationState,
    storage::SUPPORTED_LANGUAGES,
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "activity-monitor", version, about = "Monitor and toggle factory equipment")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session
    SignIn { email: String, password: String },
    /// Create an account
    SignUp { email: String, password: String },
    /// Forget the stored session
    SignOut,
    /// Show the signed-in user
    Me,
    /// List equipment
    Devices {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Show one equipment item
    Device { id: String },
    /// Set an equipment item active or passive
    SetStatus { id: String, status: StatusArg },
    /// Register new equipment
    AddDevice {
        name: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Show, set, or toggle the interface language
    Language { code: Option<String> },
    /// Report whether a session is stored
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Active,
    Passive,
}

impl From<FilterArg> for StatusFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => StatusFilter::All,
            FilterArg::Active => StatusFilter::Active,
            FilterArg::Passive => StatusFilter::Passive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Passive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env();
    let _log_guard = logging::init(&config);

    let state = AppState::new(config).context("failed to initialize client")?;
    info!("Activity Monitor starting against {}", state.api.base_url());
    let timeout = state.config.request_timeout + Duration::from_secs(5);

    match cli.command {
        Command::SignIn { email, password } => {
            let screen = state.sign_in_screen();
            let rx = screen.state();
            screen.sign_in(&email, &password);
            settle(rx, timeout).await?;
            println!("Signed in as {email}");
        }
        Command::SignUp { email, password } => {
            let screen = state.sign_up_screen();
            let rx = screen.state();
            screen.sign_up(&email, &password);
            settle(rx, timeout).await?;
            println!("Account created for {email}; sign in to continue");
        }
        Command::SignOut => {
            // Awaited directly so the stored token is gone before the process exits.
            state.auth.log_out().await;
            println!("Signed out");
        }
        Command::Me => {
            let screen = state.profile_screen();
            let mut outcome = screen.me_outcome();
            screen.on_enter();
            let result = tokio::time::timeout(timeout, outcome.wait_for(Option::is_some))
                .await
                .context("timed out fetching profile")?
                .context("session closed")?
                .clone();
            match result {
                Some(Outcome::Success(user)) => print_user(&user),
                Some(Outcome::Error(message)) => bail!(message),
                None => bail!("no profile outcome"),
            }
        }
        Command::Devices { filter } => {
            let screen = state.home_screen();
            let rx = screen.equipment_list();
            screen.on_enter();
            let page = settle(rx, timeout).await?;
            let shown = StatusFilter::from(filter).apply(&page.equipment);
            println!("{} shown, {} total", shown.len(), page.total);
            for equipment in &shown {
                print_row(equipment);
            }
        }
        Command::Device { id } => {
            let screen = state.home_screen();
            let rx = screen.equipment_list();
            screen.on_enter();
            settle(rx, timeout).await?;
            match screen.detail(&id).equipment() {
                Some(equipment) => print_detail(&equipment),
                None => bail!("equipment {id} not found"),
            }
        }
        Command::SetStatus { id, status } => {
            let screen = state.home_screen();
            let rx = screen.update_status_state();
            screen.update_equipment_status(&id, matches!(status, StatusArg::Active));
            let message = settle(rx, timeout).await?;
            println!("{message}");
        }
        Command::AddDevice { name, description } => {
            let screen = state.home_screen();
            let rx = screen.add_equipment_state();
            screen.add_equipment(&name, &description);
            let id = settle(rx, timeout).await?;
            println!("Created {name} ({id})");
        }
        Command::Language { code } => {
            let screen = state.profile_screen();
            let next = match code.as_deref() {
                None => {
                    println!("{}", state.preferences.language());
                    return Ok(());
                }
                Some("toggle") => screen.next_language(),
                Some(code) if SUPPORTED_LANGUAGES.contains(&code) => code,
                Some(code) => bail!(
                    "unsupported language {code}; expected one of {}",
                    SUPPORTED_LANGUAGES.join(", ")
                ),
            };
            state
                .preferences
                .save_language(next)
                .await
                .context("failed to save language")?;
            println!("{next}");
        }
        Command::Status => {
            let splash = state.splash_screen();
            if splash.is_logged_in() {
                println!("Signed in");
            } else {
                println!("Signed out");
            }
        }
    }

    Ok(())
}

/// Wait for an operation to succeed or fail.
async fn settle<T: Clone>(
    mut rx: watch::Receiver<OperationState<T>>,
    timeout: Duration,
) -> anyhow::Result<T> {
    let state = tokio::time::timeout(timeout, rx.wait_for(OperationState::is_settled))
        .await
        .context("timed out waiting for the server")?
        .context("screen closed before finishing")?
        .clone();

    match state {
        OperationState::Success(value) => Ok(value),
        OperationState::Error(message) => bail!(message),
        OperationState::Idle | OperationState::Loading => bail!("operation did not finish"),
    }
}

fn print_user(user: &User) {
    println!("{} <{}>", user.display_name(), user.email);
    if let Some(position) = &user.position {
        println!("  position: {position}");
    }
    if let Some(factory) = &user.factory {
        println!("  factory:  {factory}");
    }
    match user.registered_at() {
        Some(at) => println!("  since:    {}", at.format("%Y-%m-%d")),
        None => println!("  since:    {}", user.registration_date),
    }
    if user.is_admin {
        println!("  administrator");
    }
}

fn status_label(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "passive"
    }
}

fn print_row(equipment: &Equipment) {
    let utilization = equipment
        .utilization_percent()
        .map(|p| format!("{p:>5.1}%"))
        .unwrap_or_else(|| "    -".to_string());
    println!(
        "{:<26} {:<8} {} {}",
        equipment.id,
        status_label(equipment.status),
        utilization,
        equipment.name
    );
}

fn print_detail(equipment: &Equipment) {
    println!("{} ({})", equipment.name, equipment.id);
    println!("  status:      {}", status_label(equipment.status));
    if let Some(description) = &equipment.description {
        println!("  description: {description}");
    }
    if let Some(percent) = equipment.utilization_percent() {
        println!("  utilization: {percent:.1}%");
    }
    if let Some(model) = &equipment.model {
        if let Some(name) = &model.name {
            println!("  model:       {name}");
        }
        if let Some(days) = model.maintenance_interval_days {
            println!("  maintenance: every {days} days");
        }
    }
    if let Some(at) = equipment.created_at() {
        println!("  created:     {}", at.format("%Y-%m-%d"));
    }
    if let Some(at) = equipment.updated_at() {
        println!("  updated:     {}", at.format("%Y-%m-%d %H:%M"));
    }
}
