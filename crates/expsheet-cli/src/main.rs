mod commands;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "expsheet",
    version,
    about = "Turn expense documents into a datasheet spreadsheet using a language model"
)]
struct Cli {
    /// Log more detail to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read documents, ask the model for a datasheet and save it as xlsx
    Generate {
        /// PDF, text or xlsx files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Spreadsheet to write (default: export.file_name from config)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// TOML configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// API key for the chat-completions service
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,

        /// Base URL of an OpenAI-compatible API
        #[arg(long)]
        base_url: Option<String>,

        /// Maximum characters of document text sent to the model
        #[arg(long, value_name = "N")]
        max_chars: Option<usize>,

        /// Also save the raw model response to this file
        #[arg(long, value_name = "FILE")]
        save_response: Option<PathBuf>,
    },
    /// Parse a saved model response into a datasheet (no API call)
    Parse {
        /// Text file containing the model response
        response_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the datasheet to this xlsx file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Sheet name for --out
        #[arg(long, default_value = "Sheet1")]
        sheet_name: String,
    },
    /// Print the document text that would be sent to the model
    Extract {
        /// PDF, text or xlsx files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// TOML configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Maximum characters of document text
        #[arg(long, value_name = "N")]
        max_chars: Option<usize>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            files,
            out,
            output,
            config,
            api_key,
            model,
            base_url,
            max_chars,
            save_response,
        } => commands::generate::run(commands::generate::GenerateArgs {
            files,
            out,
            output_format: output,
            config,
            api_key,
            model,
            base_url,
            max_chars,
            save_response,
        }),
        Commands::Parse {
            response_file,
            output,
            out,
            sheet_name,
        } => commands::parse::run(response_file, &output, out, &sheet_name),
        Commands::Extract {
            files,
            config,
            max_chars,
        } => commands::extract::run(&files, config, max_chars),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
