use crate::cli::commands::{Cli, Commands};
use adoptar::Config;
use adoptar::client::{FormSession, PathPicker, SubmitOutcome};
use adoptar::form::AnswerSet;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Read answers from a flat TOML table. Scalars are stringified; ids outside
/// the questionnaire are ignored.
pub fn load_answers(path: &Path) -> Result<AnswerSet> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file {}", path.display()))?;
    parse_answers(&contents).with_context(|| format!("Invalid answers file {}", path.display()))
}

fn parse_answers(contents: &str) -> Result<AnswerSet> {
    let table: toml::Table = toml::from_str(contents).context("Failed to parse answers")?;
    let mut fields = Vec::with_capacity(table.len());
    for (id, value) in table {
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => String::from(if b { "Sí" } else { "No" }),
            other => bail!("answer `{id}` must be a scalar, found {}", other.type_str()),
        };
        fields.push((id, text));
    }
    Ok(AnswerSet::from_fields(fields))
}

fn run_render(answers: &Path, out: &Path, attached: usize) -> Result<()> {
    let mut answers = load_answers(answers)?;
    answers.set_attached_files(attached);

    let pdf = adoptar::pipeline::render_document(&answers)?;
    std::fs::write(out, &pdf).with_context(|| format!("Failed to write {}", out.display()))?;
    info!(out = %out.display(), bytes = pdf.len(), "questionnaire rendered");
    println!("Wrote {} ({} bytes)", out.display(), pdf.len());
    Ok(())
}

async fn run_submit(
    config: &Config,
    answers: &Path,
    photos: Vec<PathBuf>,
    endpoint: Option<String>,
) -> Result<()> {
    let answers = load_answers(answers)?;

    let mut config = config.clone();
    if let Some(endpoint) = endpoint {
        config.client.endpoint = endpoint;
    }
    let mut session = FormSession::from_config(&config)?;
    for (question, value) in answers.iter() {
        session.set_answer(question.id, value);
    }

    if !photos.is_empty() {
        let mut picker = PathPicker::new(photos);
        let report = session.pick_photos(&mut picker, |percent| {
            info!(percent, "compressing photos");
        });
        if let Some(message) = report.message() {
            eprintln!("{message}");
        }
        println!("{} photo(s) staged", session.photos().len());
    }

    let outcome = session.submit().await;
    match &outcome {
        SubmitOutcome::Invalid(report) => {
            for error in &report.errors {
                eprintln!("{}: {}", error.field, error.message);
            }
            bail!("questionnaire is incomplete");
        }
        SubmitOutcome::Ignored => bail!("a submission is already in progress"),
        SubmitOutcome::Success { .. } => {
            if let Some(message) = outcome.user_message() {
                println!("{message}");
            }
            Ok(())
        }
        SubmitOutcome::TransportFailure { .. } | SubmitOutcome::ServerReportedFailure { .. } => {
            bail!(outcome.user_message().unwrap_or_default())
        }
    }
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let mut config = (*config).clone();
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            let (host, port) = (config.gateway.host.clone(), config.gateway.port);
            if port == 0 {
                info!("Starting adoptar gateway on {host} (random port)");
            } else {
                info!("Starting adoptar gateway on {host}:{port}");
            }
            adoptar::gateway::run_gateway(Arc::new(config)).await
        }

        Commands::Render {
            answers,
            out,
            attached,
        } => run_render(&answers, &out, attached),

        Commands::Submit {
            answers,
            photos,
            endpoint,
        } => run_submit(&config, &answers, photos, endpoint).await,
    }
}
