//! quizform CLI — drives the quiz form workflow from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizform", version, about = "Quiz worksheet generation front-end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the grades offered for a subject
    Grades {
        /// Subject (math or english)
        #[arg(long)]
        subject: String,
    },

    /// Fetch the units for a subject and grade
    Units {
        /// Subject (math or english)
        #[arg(long)]
        subject: String,

        /// Grade label (e.g. "中学1年")
        #[arg(long)]
        grade: String,

        /// Use the built-in mock backend instead of the server
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a problem set and write its preview
    Generate(commands::generate::GenerateArgs),

    /// Export a saved problem set to PDF
    Export {
        /// Saved problem set (problems.json)
        #[arg(long)]
        input: PathBuf,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Use the built-in mock backend instead of the server
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Re-render a saved problem set as an HTML page
    Preview {
        /// Saved problem set (problems.json)
        #[arg(long)]
        input: PathBuf,

        /// HTML file to write
        #[arg(long, default_value = "preview.html")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizform=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grades { subject } => commands::grades::execute(subject),
        Commands::Units {
            subject,
            grade,
            offline,
            config,
        } => commands::units::execute(subject, grade, offline, config).await,
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Export {
            input,
            output,
            offline,
            config,
        } => commands::export::execute(input, output, offline, config).await,
        Commands::Preview { input, output } => commands::preview::execute(input, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
