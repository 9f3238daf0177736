//! OEConvert CLI - registration exports to OE2010 import CSV
//!
//! # Main Commands
//!
//! ```bash
//! oeconvert convert kayitlar.xlsx             # Write OE2010_Import_Final.csv next to the input
//! oeconvert convert kayitlar.csv -o out.csv   # Explicit output path
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! oeconvert classify kayitlar.xlsx   # Show which column got which role
//! oeconvert parse kayitlar.csv       # Dump the loaded table as JSON
//! oeconvert rules                    # Print the classifier rule table
//! oeconvert guess Ayşe Deniz Umut    # Estimate sex from first names
//! ```
//!
//! `--rules` and `--names` work with every command and override
//! `OECONVERT_RULES` / `OECONVERT_NAME_DICT`.

use clap::{Parser, Subcommand};
use oeconvert::{
    default_output_path, load_table, Classifier, ConvertMessage, Converter, GenderError,
    LoadError, LogBroadcaster, RuleTable, RulesError, Settings,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser)]
#[command(name = "oeconvert")]
#[command(about = "Convert registration form exports to the OE2010 entry import format", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Classifier rule table (JSON)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Name dictionary for sex estimation (Name<TAB>category per line)
    #[arg(long, global = true)]
    names: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a registration export to an OE2010 import CSV
    Convert {
        /// Input file (csv, tsv, txt, xlsx, xls, xlsb, ods)
        input: PathBuf,

        /// Output file (default: OE2010_Import_Final.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the role detected for every column
    Classify {
        /// Input file
        input: PathBuf,
    },

    /// Load a file and output its rows as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the classifier rule table as JSON
    Rules,

    /// Estimate the sex for one or more first names
    Guess {
        /// Names to look up
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    /// Conversion failed; the message is already user-facing.
    #[error("{0}")]
    Failed(String),

    /// A required dependency could not be initialized.
    #[error("{0}")]
    Fatal(String),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Fatal(_) => 2,
            _ => 1,
        }
    }
}

impl From<GenderError> for CliError {
    fn from(err: GenderError) -> Self {
        CliError::Fatal(format!("Error: Gender lookup unavailable: {}", err))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let settings = Settings::from_env().with_overrides(cli.rules, cli.names);

    let result = match cli.command {
        Commands::Convert { input, output } => cmd_convert(&input, output, &settings).await,
        Commands::Classify { input } => cmd_classify(&input, &settings),
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),
        Commands::Rules => cmd_rules(&settings),
        Commands::Guess { names } => cmd_guess(&names, &settings),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    let output = output.unwrap_or_else(|| default_output_path(input));
    eprintln!("📄 Processing: {}", input.display());

    let classifier = settings.classifier()?;
    let estimator = settings.gender_estimator();

    // Load the name dictionary while the input is being read
    let warmup = tokio::task::spawn_blocking({
        let estimator = estimator.clone();
        move || estimator.ensure_ready().map(|_| ())
    });

    let broadcaster = Arc::new(LogBroadcaster::new());
    let mut rx = broadcaster.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(entry) => eprintln!("{}", entry),
                Err(RecvError::Lagged(n)) => eprintln!("   ... {} log lines skipped", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let conversion = tokio::task::spawn_blocking({
        let sink = Arc::clone(&broadcaster);
        let input = input.to_path_buf();
        let output = output.clone();
        move || Converter::new(&classifier, estimator).run(&input, &output, &*sink)
    });

    let (warmed, converted) = tokio::join!(warmup, conversion);
    drop(broadcaster);
    printer.await?;

    // A failed dictionary load ends the process even if this input never needed it
    warmed??;

    match converted? {
        Ok(report) => {
            println!("{}", ConvertMessage::success(&report.output));
            Ok(())
        }
        Err(err) => {
            let message = ConvertMessage::from_error(&err).to_string();
            if err.is_fatal() {
                Err(CliError::Fatal(message))
            } else {
                Err(CliError::Failed(message))
            }
        }
    }
}

fn cmd_classify(input: &Path, settings: &Settings) -> Result<(), CliError> {
    eprintln!("🔎 Classifying: {}", input.display());

    let classifier = settings.classifier()?;
    let loaded = load_table(input)?;
    let headers = &loaded.table.headers;
    let mapping = classifier.map_columns(headers);

    for (index, header) in headers.iter().enumerate() {
        let claimed = mapping.iter().find(|(_, col)| *col == index);
        let label = match (claimed, classifier.classify(header)) {
            (Some((role, _)), _) => role.label().to_string(),
            (None, Some(role)) => format!("{} (already taken, ignored)", role.label()),
            (None, None) => "-".to_string(),
        };
        println!("{:>3}  {:<40} {}", index + 1, header, label);
    }

    eprintln!("✅ {} of {} columns recognised", mapping.len(), headers.len());
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), CliError> {
    eprintln!("📄 Parsing: {}", input.display());

    let loaded = load_table(input)?;
    if let Some(encoding) = loaded.encoding {
        eprintln!("   Encoding: {}", encoding);
    }
    if let Some(delimiter) = loaded.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    eprintln!("   Columns: {}", loaded.table.headers.join(", "));
    eprintln!("✅ Parsed {} rows", loaded.table.len());

    let json = serde_json::to_string_pretty(&loaded.table.to_records())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_rules(settings: &Settings) -> Result<(), CliError> {
    let table = match &settings.rules_path {
        Some(path) => RuleTable::from_file(path)?,
        None => RuleTable::builtin(),
    };
    // Reject tables that would not compile
    Classifier::new(&table)?;
    println!("{}", table.to_json()?);
    Ok(())
}

fn cmd_guess(names: &[String], settings: &Settings) -> Result<(), CliError> {
    let estimator = settings.gender_estimator();
    let dictionary = estimator.ensure_ready()?;
    eprintln!("📖 {} names in dictionary", dictionary.len());

    for name in names {
        let sex = estimator.estimate_sex(name)?;
        println!("{}\t{}", name, sex);
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
