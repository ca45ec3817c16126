mod config;
mod errors;
mod export;
mod models;
mod prediction_client;
mod session;
mod transcript;
mod view;

use std::future::Future;
use std::io::{Stdout, Write};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::ExportSettings;
use crate::models::BirthForm;
use crate::prediction_client::HttpPredictionService;
use crate::session::{ChatSession, Ignored, Outcome};
use crate::view::terminal::TerminalRenderer;

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries the conversation.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting JyotishAI client v{}", env!("CARGO_PKG_VERSION"));

    let service = HttpPredictionService::new(&config.endpoint_base, config.request_timeout)?;
    info!("Prediction service at {}", config.endpoint_base);

    let session = ChatSession::new(
        Arc::new(service),
        ExportSettings::new(config.report_path()),
    );
    let mut terminal = TerminalRenderer::new(std::io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    terminal.render(&session.view(), &[])?;

    loop {
        let Some(form) = read_form(&mut lines).await? else {
            return Ok(());
        };
        session.update_form(form);

        let outcome = drive(&session, &mut terminal, {
            let session = session.clone();
            async move { session.submit_birth_details().await }
        })
        .await?;

        match outcome {
            Outcome::Completed => break,
            Outcome::Ignored(Ignored::InvalidForm(e)) => println!("Please check the form: {e}"),
            _ => {}
        }
    }

    println!("Ask a question, /export to save your report, /quit to leave.");
    while let Some(line) = prompt(&mut lines, ">").await? {
        match line.trim() {
            "/quit" => break,
            "/export" => {
                drive(&session, &mut terminal, {
                    let session = session.clone();
                    async move { session.export_transcript().await }
                })
                .await?;
            }
            _ => {
                session.set_input(line);
                drive(&session, &mut terminal, {
                    let session = session.clone();
                    async move { session.handle_key("Enter").await }
                })
                .await?;
            }
        }
    }

    info!("Session closed");
    Ok(())
}

/// Runs one handler while keeping the terminal in step: a first render shows the
/// optimistic echo and busy line, a second one the result and any notices.
async fn drive<F>(
    session: &ChatSession,
    terminal: &mut TerminalRenderer<Stdout>,
    handler: F,
) -> Result<Outcome>
where
    F: Future<Output = Outcome> + Send + 'static,
{
    let task = tokio::spawn(handler);
    tokio::task::yield_now().await;
    terminal.render(&session.view(), &[])?;

    let outcome = task.await?;
    terminal.render(&session.view(), &session.take_notices())?;
    Ok(outcome)
}

/// Asks for the five birth fields. `None` on end of input.
async fn read_form(lines: &mut InputLines) -> Result<Option<BirthForm>> {
    let mut values = Vec::with_capacity(5);
    for label in [
        "Full name:",
        "Gender (male/female/other, blank to skip):",
        "Date of birth (YYYY-MM-DD):",
        "Time of birth (HH:MM):",
        "Place of birth:",
    ] {
        match prompt(lines, label).await? {
            Some(value) => values.push(value),
            None => return Ok(None),
        }
    }
    let [name, gender, birth_date, birth_time, birth_place]: [String; 5] = values
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected five form fields"))?;

    Ok(Some(BirthForm {
        name,
        gender,
        birth_date,
        birth_time,
        birth_place,
    }))
}

async fn prompt(lines: &mut InputLines, label: &str) -> Result<Option<String>> {
    print!("{label} ");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}
