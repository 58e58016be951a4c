use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use diff_context::{AddedLines, Config, ContextExtractor, DiffLineMap, ExtractionResult, FileDiff};
use serde::Serialize;
use std::path::{Path, PathBuf};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[command(name = "diff-context")]
#[command(about = "Find the smallest enclosing function, method or class for every added line", long_about = None)]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Log progress to stderr")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print the old/new line map of a unified diff as JSON")]
    Lines {
        #[arg(long, value_name = "FILE", help = "Diff file, or - for stdin")]
        diff: PathBuf,

        #[arg(long, help = "Fail on malformed hunk headers or a diff without hunks")]
        strict: bool,
    },
    #[command(about = "Extract the code context of one changed file")]
    Extract {
        #[arg(long, value_name = "FILE", help = "Diff file, or - for stdin")]
        diff: PathBuf,

        #[arg(long, help = "Path of the changed file as named in the diff")]
        path: String,

        #[arg(long, default_value = ".", help = "Project root relative paths resolve against")]
        root: PathBuf,

        #[arg(long, env = "DIFF_CONTEXT_CONFIG", help = "TOML configuration file")]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    #[command(about = "Print the JSON schema of the extraction result")]
    Schema,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Serialize)]
struct LinesOutput {
    added_lines: AddedLines,
    #[serde(flatten)]
    map: DiffLineMap,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match cli.command {
        Commands::Lines { diff, strict } => {
            let text = read_diff(&diff).await?;
            let map = if strict {
                DiffLineMap::build_strict(&text)
                    .with_context(|| format!("Rejected diff {}", diff.display()))?
            } else {
                DiffLineMap::build(&text)
            };
            let output = LinesOutput {
                added_lines: map.added_lines(),
                map,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Extract {
            diff,
            path,
            root,
            config,
            format,
        } => {
            let config = load_config(config.as_deref())?;
            let extractor = ContextExtractor::new(config)?;
            let file = FileDiff {
                path,
                diff: read_diff(&diff).await?,
            };

            let result = extractor.extract_diff(&file, &root).await;
            print_result(&result, format)?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(ExtractionResult);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

async fn read_diff(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read diff from stdin");
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read diff file {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides();
            config.validate()?;
            config
        }
        None => Config::new()?,
    };
    Ok(config)
}

fn print_result(result: &ExtractionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => {
            for tag in result.errors.iter().chain(&result.warnings) {
                eprintln!("{}: {}", result.file_path, tag);
            }
            print!("{}", result.render_context());
        }
    }
    Ok(())
}
