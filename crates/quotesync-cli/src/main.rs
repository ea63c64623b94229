//! quotesync CLI — quote collection with remote sync

mod logging;
mod watch;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use quotesync::app::spawn_controller;
use quotesync::config::network::DEFAULT_REMOTE_URL;
use quotesync::config::storage::EXPORT_FILE;
use quotesync::config::sync::DEFAULT_SYNC_INTERVAL_SECS;
use quotesync::config::ui::NO_QUOTES_MESSAGE;
use quotesync::data::{read_text, write_text, CategoryFilter, FileStore, MemoryStore, Quote, QuoteStore};
use quotesync::error::{QuoteError, Result};
use quotesync::network::HttpClient;
use quotesync::remote::{HttpQuoteSource, QuoteSource};
use quotesync::sync::{Conflict, Resolution};

#[derive(Parser)]
#[command(name = "quotesync", about = "Random quotes with local storage and remote sync", version)]
struct Cli {
    /// Directory holding the persisted quotes (defaults to the platform data dir)
    #[arg(long, env = "QUOTESYNC_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Remote endpoint returning a JSON array of quotes
    #[arg(long, env = "QUOTESYNC_URL", default_value = DEFAULT_REMOTE_URL, global = true)]
    url: String,

    /// Ignore proxy environment variables
    #[arg(long, global = true)]
    no_proxy: bool,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a random quote from the selected category
    Show {
        /// Show the last viewed quote instead
        #[arg(long)]
        last: bool,
    },
    /// Add a quote
    Add { text: String, category: String },
    /// List quotes, optionally switching the selected category
    List {
        /// Category to select ("all" for every quote)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List the known categories
    Categories,
    /// Write every quote to a JSON file
    Export {
        #[arg(short, long, default_value = EXPORT_FILE)]
        output: PathBuf,
    },
    /// Append quotes from a JSON file
    Import { file: PathBuf },
    /// Fetch remote quotes and merge them
    Sync {
        /// Keep local versions of every conflicting quote
        #[arg(long, conflicts_with = "use_remote")]
        keep_local: bool,
        /// Take the server version of every conflicting quote
        #[arg(long)]
        use_remote: bool,
    },
    /// Interactive session with periodic sync
    Watch {
        /// Seconds between automatic syncs (0 disables)
        #[arg(long, default_value_t = DEFAULT_SYNC_INTERVAL_SECS)]
        interval: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut store = open_store(&cli)?;

    match &cli.command {
        Command::Show { last } => {
            let quote = if *last {
                store.last_viewed_quote()?
            } else {
                store.show_random()?
            };
            match quote {
                Some(quote) => println!("{quote}"),
                None if *last => println!("No quote viewed yet."),
                None => println!("{NO_QUOTES_MESSAGE}"),
            }
        }
        Command::Add { text, category } => {
            store.add(text, category)?;
            println!("New quote added successfully!");
        }
        Command::List { category } => {
            let quotes = match category {
                Some(name) => store.filter_by_category(CategoryFilter::from(name.as_str()))?,
                None => store.visible(),
            };
            print_quotes(&quotes);
        }
        Command::Categories => {
            let selected = store.selected_category().clone();
            let options = std::iter::once(CategoryFilter::All)
                .chain(store.categories().into_iter().map(CategoryFilter::Named));
            for option in options {
                let marker = if option == selected { "*" } else { " " };
                println!("{marker} {option}");
            }
        }
        Command::Export { output } => {
            write_text(output, &store.export_snapshot()?)?;
            println!("Exported {} quotes to {}", store.len(), output.display());
        }
        Command::Import { file } => {
            let payload = read_text(file)?
                .ok_or_else(|| QuoteError::NotFound(file.display().to_string()))?;
            let count = store.import_snapshot(&payload)?;
            println!("Imported {count} quotes successfully!");
        }
        Command::Sync { keep_local, use_remote } => {
            let preset = if *keep_local {
                Some(Resolution::KeepLocal)
            } else if *use_remote {
                Some(Resolution::UseRemote)
            } else {
                None
            };
            sync(&mut store, &remote_source(&cli)?, preset)?;
        }
        Command::Watch { interval } => {
            let interval = (*interval > 0).then(|| Duration::from_secs(*interval));
            let source: Arc<dyn QuoteSource> = Arc::new(remote_source(&cli)?);
            let handle = spawn_controller(store, source, interval)?;
            watch::run(handle)?;
        }
    }

    Ok(())
}

fn open_store(cli: &Cli) -> Result<QuoteStore> {
    let durable = match &cli.data_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default_location()?,
    };
    QuoteStore::open(Box::new(durable), Box::new(MemoryStore::new()))
}

fn remote_source(cli: &Cli) -> Result<HttpQuoteSource> {
    let client = if cli.no_proxy {
        HttpClient::direct()?
    } else {
        HttpClient::new()?
    };
    Ok(HttpQuoteSource::with_client(client, cli.url.as_str()))
}

fn print_quotes(quotes: &[&Quote]) {
    if quotes.is_empty() {
        println!("{NO_QUOTES_MESSAGE}");
        return;
    }
    for (i, quote) in quotes.iter().enumerate() {
        match &quote.id {
            Some(id) => println!("{:>3}. [{id}] {quote}", i + 1),
            None => println!("{:>3}. {quote}", i + 1),
        }
    }
}

/// One sync pass, then settle every conflict it raised
fn sync(store: &mut QuoteStore, source: &HttpQuoteSource, preset: Option<Resolution>) -> Result<()> {
    println!("Syncing with {}...", source.url());
    let remote = source.fetch()?;
    let report = store.sync(remote)?;
    for message in report.messages() {
        println!("{message}");
    }

    while let Some(conflict) = store.pending_conflict().cloned() {
        let resolution = match preset {
            Some(resolution) => resolution,
            None => prompt_resolution(&conflict)?,
        };
        store.resolve_conflict(resolution)?;
        match resolution {
            Resolution::KeepLocal => println!("Kept local version."),
            Resolution::UseRemote => println!("Using server version."),
        }
    }
    Ok(())
}

/// Ask on stdin which side of a conflict wins; end of input keeps local
fn prompt_resolution(conflict: &Conflict) -> Result<Resolution> {
    let id = conflict
        .id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!();
    println!("Conflict on quote {id}:");
    println!("  local:  {}", conflict.local);
    println!("  server: {}", conflict.remote);

    let stdin = io::stdin();
    loop {
        print!("Keep [l]ocal or use [r]emote? ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(Resolution::KeepLocal);
        }
        match line.trim().to_lowercase().as_str() {
            "l" | "local" => return Ok(Resolution::KeepLocal),
            "r" | "remote" => return Ok(Resolution::UseRemote),
            _ => println!("Please answer 'l' or 'r'."),
        }
    }
}
