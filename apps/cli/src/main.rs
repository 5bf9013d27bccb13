use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    AlwaysConfirm, ClearOutcome, ConfirmationGate, DictationOutcome, ReminderApi, ReminderClient,
    ReminderWorkflows, SubmitOutcome,
};
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;
mod view;

use config::{load_settings, DEFAULT_CONFIG_PATH};
use prompt::StdinConfirmation;

#[derive(Parser, Debug)]
#[command(name = "reminders", about = "Schedule, list and clear text reminders")]
struct Cli {
    /// Backend base URL; overrides the config file and environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Schedule a new reminder from free text.
    Create {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        text: Option<String>,
        /// Append a spoken phrase to the text before submitting.
        #[arg(long)]
        dictate: bool,
    },
    /// Show scheduled reminders.
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete every reminder.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Probe the backend.
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(server_url) = cli.server_url {
        settings.api_base_url = server_url;
    }
    let api = ReminderClient::new(settings.client_config()?).into_shared();
    let workflows = ReminderWorkflows::new(api.clone(), settings.dictation_capability());

    let code = match cli.command {
        Command::Create {
            user_id,
            text,
            dictate,
        } => create(&workflows, user_id, text, dictate).await,
        Command::List { limit } => list(&workflows, limit).await,
        Command::Clear { yes } => {
            let gate: &dyn ConfirmationGate = if yes {
                &AlwaysConfirm
            } else {
                &StdinConfirmation
            };
            clear(&workflows, gate).await
        }
        Command::Status => {
            println!("{}", view::render_health(&api.check_health().await));
            ExitCode::SUCCESS
        }
    };
    Ok(code)
}

async fn create(
    workflows: &ReminderWorkflows,
    user_id: String,
    text: Option<String>,
    dictate: bool,
) -> ExitCode {
    let creation = &workflows.creation;
    creation.edit_user_id(user_id).await;
    if let Some(text) = text {
        creation.edit_text(text).await;
    }

    if dictate {
        if creation.dictation_available() {
            println!("Listening...");
        }
        match creation.dictate().await {
            Ok(DictationOutcome::Transcript(transcript)) => println!("Heard: {transcript}"),
            Ok(DictationOutcome::Silence) => println!("No speech detected."),
            Ok(DictationOutcome::Failed { code }) => {
                eprintln!("Speech recognition error: {code}")
            }
            Ok(DictationOutcome::Busy) => {}
            Err(err) => eprintln!("{}", err.user_message("")),
        }
    }

    match creation.submit().await {
        SubmitOutcome::Created(reminder) => {
            println!("{}", view::render_created(&reminder));
            ExitCode::SUCCESS
        }
        SubmitOutcome::Rejected(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
        SubmitOutcome::NotReady => {
            eprintln!("Both a user id and reminder text are required.");
            ExitCode::FAILURE
        }
    }
}

async fn list(workflows: &ReminderWorkflows, limit: Option<usize>) -> ExitCode {
    workflows.listing.activate().await;

    let store = workflows.store().lock().await;
    let error = store.listing().error();
    if let Some(error) = error {
        eprintln!("Error: {error}");
    }
    if store.reminders().is_empty() {
        if error.is_none() {
            println!("No reminders scheduled.");
        }
    } else {
        println!("{}", view::render_table(store.reminders(), limit));
    }

    if error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn clear(workflows: &ReminderWorkflows, gate: &dyn ConfirmationGate) -> ExitCode {
    workflows.listing.activate().await;
    let listing_error = workflows
        .store()
        .lock()
        .await
        .listing()
        .error()
        .map(str::to_string);

    match workflows.bulk_clear.clear_all(gate).await {
        ClearOutcome::Disabled => match listing_error {
            Some(error) => {
                eprintln!("Error: {error}");
                ExitCode::FAILURE
            }
            None => {
                println!("No reminders to clear.");
                ExitCode::SUCCESS
            }
        },
        ClearOutcome::Declined => {
            println!("Cancelled; nothing was deleted.");
            ExitCode::SUCCESS
        }
        ClearOutcome::Cleared {
            message,
            deleted_count,
        } => {
            match deleted_count {
                Some(count) => println!("{message} ({count} deleted)"),
                None => println!("{message}"),
            }
            ExitCode::SUCCESS
        }
        ClearOutcome::Failed(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}
