use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `adoptar` - pre-adoption questionnaire intake.
#[derive(Parser, Debug)]
#[command(name = "adoptar")]
#[command(author = "refugio-dev")]
#[command(version = "0.1.0")]
#[command(about = "Collects pre-adoption questionnaires and mails them as PDF.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the submission gateway
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Render a questionnaire to PDF without sending anything
    Render {
        /// TOML file with one `id = "answer"` entry per question
        #[arg(long)]
        answers: PathBuf,

        /// Where to write the PDF
        #[arg(long)]
        out: PathBuf,

        /// Number of photos to report as attached
        #[arg(long, default_value = "0")]
        attached: usize,
    },

    /// Stage photos and submit a questionnaire to a running gateway
    Submit {
        /// TOML file with one `id = "answer"` entry per question
        #[arg(long)]
        answers: PathBuf,

        /// Photo to attach (repeatable)
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,

        /// Submission endpoint (defaults to [client] endpoint in config.toml)
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn submit_accepts_repeated_photos() {
        let cli = Cli::try_parse_from([
            "adoptar",
            "submit",
            "--answers",
            "respuestas.toml",
            "--photo",
            "patio.jpg",
            "--photo",
            "cucha.png",
        ])
        .unwrap();

        let Commands::Submit {
            photos, endpoint, ..
        } = cli.command
        else {
            panic!("expected submit");
        };
        assert_eq!(photos.len(), 2);
        assert!(endpoint.is_none());
    }

    #[test]
    fn render_defaults_to_no_attachments() {
        let cli = Cli::try_parse_from([
            "adoptar",
            "render",
            "--answers",
            "a.toml",
            "--out",
            "a.pdf",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Render { attached: 0, .. }));
    }
}
