mod schema;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use compflag::{Error as FlagError, FlagSet};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::schema::{
    ArgType, ArgumentSchema, DEFAULT_SCHEMA_NAME, FlagSchema, FlagType, Nargs, Schema,
};

#[derive(Parser)]
#[command(name = "flagctl")]
#[command(version, about = "Parse arguments and complete command lines from a flag schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter flagset.json
    Init(InitArgs),

    /// Print usage text for the schema
    Usage(UsageArgs),

    /// Parse arguments against the schema and print the result as JSON
    Parse(ParseArgs),

    /// Print completion candidates for the word under the cursor
    Compgen(CompgenArgs),
}

#[derive(Args)]
struct SchemaArgs {
    /// Path to the JSON flag schema
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_SCHEMA_NAME)]
    schema: PathBuf,
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Command name recorded in the schema
    #[arg(short, long, default_value = "my-cli")]
    name: String,
}

#[derive(Parser)]
struct UsageArgs {
    #[command(flatten)]
    schema: SchemaArgs,
}

#[derive(Parser)]
struct ParseArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Print compact JSON on one line
    #[arg(long)]
    compact: bool,

    /// Arguments to parse, given after `--`
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct CompgenArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Index into WORDS of the word being completed
    #[arg(long, value_name = "N")]
    cword: usize,

    /// The command line so far, command name first, given after `--`
    #[arg(last = true, value_name = "WORDS")]
    words: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Usage(args) => usage(args),
        Commands::Parse(args) => parse(args),
        Commands::Compgen(args) => compgen(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let schema_path = dir.join(DEFAULT_SCHEMA_NAME);
    if schema_path.exists() {
        bail!("{DEFAULT_SCHEMA_NAME} already exists in {}", dir.display());
    }

    let schema = Schema {
        name: Some(args.name),
        flags: vec![
            FlagSchema {
                name: "verbose".to_string(),
                ty: FlagType::Bool,
                default: None,
                usage: "Print more output".to_string(),
                complete: Vec::new(),
            },
            FlagSchema {
                name: "format".to_string(),
                ty: FlagType::String,
                default: Some(serde_json::Value::String("text".to_string())),
                usage: "Output format".to_string(),
                complete: vec!["text".to_string(), "json".to_string()],
            },
        ],
        arguments: vec![ArgumentSchema {
            name: "file".to_string(),
            ty: ArgType::String,
            nargs: Nargs::Notation("+".to_string()),
            usage: "Input files".to_string(),
            complete: Vec::new(),
        }],
    };

    let json_content = serde_json::to_string_pretty(&schema)?;
    fs::write(&schema_path, format!("{json_content}\n"))
        .with_context(|| format!("failed to write {}", schema_path.display()))?;

    eprintln!("Created: {}", schema_path.display());
    Ok(())
}

fn usage(args: UsageArgs) -> Result<()> {
    tracing::debug!("executing usage command");
    let fs = load_flagset(&args.schema.schema)?;
    print!("{}", fs.usage());
    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    tracing::debug!(args = args.args.len(), "executing parse command");
    let mut fs = load_flagset(&args.schema.schema)?;

    match fs.parse(&args.args) {
        Ok(result) => {
            let json = if args.compact {
                serde_json::to_string(&result)?
            } else {
                serde_json::to_string_pretty(&result)?
            };
            println!("{json}");
            Ok(())
        }
        Err(FlagError::HelpRequested) => {
            eprint!("{}", fs.usage());
            Ok(())
        }
        Err(err) if err.is_parse_error() => {
            eprintln!("error: {err}");
            eprint!("{}", fs.usage());
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

fn compgen(args: CompgenArgs) -> Result<()> {
    tracing::debug!(cword = args.cword, words = args.words.len(), "executing compgen command");
    let fs = load_flagset(&args.schema.schema)?;
    let candidates = fs
        .compgen(args.cword, &args.words)
        .context("completion failed")?;
    println!("{candidates}");
    Ok(())
}

fn load_flagset(path: &Path) -> Result<FlagSet> {
    let schema = Schema::from_file(path)?;
    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("command");
    schema.build(fallback)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
