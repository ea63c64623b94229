//! Interactive session
//!
//! Reads commands line by line from stdin, forwards them to the
//! controller and prints whatever changed in its snapshot.

use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{unbounded, RecvTimeoutError};

use quotesync::app::{ControllerHandle, Notice, QuoteCommand, QuoteSnapshot, Severity};
use quotesync::data::{read_text, CategoryFilter, Quote};
use quotesync::error::Result;
use quotesync::sync::{Conflict, Resolution};

/// How often the screen is refreshed while waiting for input
const REFRESH: Duration = Duration::from_millis(200);

/// A parsed input line
#[derive(Debug, PartialEq)]
enum Input {
    Command(QuoteCommandSpec),
    /// Import needs the file read before it becomes a command
    Import(String),
    List,
    Categories,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Commands that map directly onto `QuoteCommand`
#[derive(Debug, PartialEq)]
enum QuoteCommandSpec {
    Next,
    Add { text: String, category: String },
    Filter(CategoryFilter),
    Sync,
    Resolve(Resolution),
    Dismiss,
}

impl From<QuoteCommandSpec> for QuoteCommand {
    fn from(spec: QuoteCommandSpec) -> Self {
        match spec {
            QuoteCommandSpec::Next => QuoteCommand::ShowRandom,
            QuoteCommandSpec::Add { text, category } => QuoteCommand::AddQuote { text, category },
            QuoteCommandSpec::Filter(filter) => QuoteCommand::SelectCategory(filter),
            QuoteCommandSpec::Sync => QuoteCommand::Sync,
            QuoteCommandSpec::Resolve(resolution) => QuoteCommand::ResolveConflict(resolution),
            QuoteCommandSpec::Dismiss => QuoteCommand::DismissNotice,
        }
    }
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "" => Input::Empty,
        "n" | "new" => Input::Command(QuoteCommandSpec::Next),
        "add" => match rest.split_once('|') {
            // Empty halves are passed through; the store rejects them
            Some((text, category)) => Input::Command(QuoteCommandSpec::Add {
                text: text.trim().to_string(),
                category: category.trim().to_string(),
            }),
            None => Input::Unknown("usage: add <text> | <category>".to_string()),
        },
        "filter" if !rest.is_empty() => {
            Input::Command(QuoteCommandSpec::Filter(CategoryFilter::from(rest)))
        }
        "sync" | "s" => Input::Command(QuoteCommandSpec::Sync),
        "local" | "l" => Input::Command(QuoteCommandSpec::Resolve(Resolution::KeepLocal)),
        "remote" | "r" => Input::Command(QuoteCommandSpec::Resolve(Resolution::UseRemote)),
        "ok" | "dismiss" => Input::Command(QuoteCommandSpec::Dismiss),
        "import" if !rest.is_empty() => Input::Import(rest.to_string()),
        "list" | "ls" => Input::List,
        "categories" => Input::Categories,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        _ => Input::Unknown(format!("unknown command: {line}")),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  new                      show another random quote");
    println!("  add <text> | <category>  add a quote");
    println!("  filter <category|all>    select a category");
    println!("  list / categories        show quotes or categories");
    println!("  import <file>            append quotes from a JSON file");
    println!("  sync                     merge quotes from the server");
    println!("  local / remote           settle the pending conflict");
    println!("  ok                       dismiss messages");
    println!("  quit");
}

/// What has already been printed
#[derive(Default)]
struct Printed {
    current: Option<Option<Quote>>,
    notices: Vec<Notice>,
    conflict: Option<Conflict>,
}

fn print_changes(snapshot: &QuoteSnapshot, printed: &mut Printed) {
    if printed.current.as_ref() != Some(&snapshot.current) {
        println!();
        println!("  {}", snapshot.display_text());
        println!();
        printed.current = Some(snapshot.current.clone());
    }

    if printed.notices != snapshot.notices {
        for notice in &snapshot.notices {
            let tag = match notice.severity {
                Severity::Info => "info",
                Severity::Success => "ok",
                Severity::Warning => "warn",
                Severity::Error => "error",
            };
            println!("[{tag}] {}", notice.message);
        }
        printed.notices = snapshot.notices.clone();
    }

    if printed.conflict != snapshot.pending_conflict {
        if let Some(conflict) = &snapshot.pending_conflict {
            println!("Conflict ({} queued):", snapshot.conflicts_queued);
            println!("  local:  {}", conflict.local);
            println!("  server: {}", conflict.remote);
            println!("Type 'local' or 'remote'.");
        }
        printed.conflict = snapshot.pending_conflict.clone();
    }
}

fn print_list(snapshot: &QuoteSnapshot) {
    println!("Category: {} ({} of {})", snapshot.selected_category, snapshot.visible.len(), snapshot.total);
    for quote in &snapshot.visible {
        println!("  {quote}");
    }
}

fn read_import(path: &str) -> Option<String> {
    match read_text(Path::new(path)) {
        Ok(Some(payload)) => Some(payload),
        Ok(None) => {
            println!("[error] No such file: {path}");
            None
        }
        Err(e) => {
            println!("[error] {e}");
            None
        }
    }
}

/// Drive the controller until `quit` or end of input
pub fn run(handle: ControllerHandle) -> Result<()> {
    let (line_tx, line_rx) = unbounded();
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    print_help();
    let mut printed = Printed::default();

    loop {
        let snapshot = handle.snapshot();
        print_changes(&snapshot, &mut printed);

        let line = match line_rx.recv_timeout(REFRESH) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match parse_line(&line) {
            Input::Command(spec) => {
                if !handle.send(spec.into()) {
                    break;
                }
            }
            Input::Import(path) => {
                if let Some(payload) = read_import(&path) {
                    handle.send(QuoteCommand::Import(payload));
                }
            }
            Input::List => print_list(&snapshot),
            Input::Categories => {
                for option in snapshot.category_options() {
                    let marker = if option == snapshot.selected_category.as_str() { "*" } else { " " };
                    println!("{marker} {option}");
                }
            }
            Input::Help => print_help(),
            Input::Quit => break,
            Input::Empty => {}
            Input::Unknown(message) => println!("{message}"),
        }
    }

    handle.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse_line("add Be kind | Wisdom"),
            Input::Command(QuoteCommandSpec::Add {
                text: "Be kind".to_string(),
                category: "Wisdom".to_string(),
            })
        );
        assert!(matches!(parse_line("add no separator"), Input::Unknown(_)));
    }

    #[test]
    fn test_parse_add_keeps_empty_fields() {
        assert_eq!(
            parse_line("add | Wisdom"),
            Input::Command(QuoteCommandSpec::Add {
                text: String::new(),
                category: "Wisdom".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_line("filter all"),
            Input::Command(QuoteCommandSpec::Filter(CategoryFilter::All))
        );
        assert_eq!(
            parse_line("FILTER  Motivation "),
            Input::Command(QuoteCommandSpec::Filter(CategoryFilter::from("Motivation")))
        );
        assert!(matches!(parse_line("filter"), Input::Unknown(_)));
    }

    #[test]
    fn test_parse_conflict_choices() {
        assert_eq!(
            parse_line("local"),
            Input::Command(QuoteCommandSpec::Resolve(Resolution::KeepLocal))
        );
        assert_eq!(
            parse_line("r"),
            Input::Command(QuoteCommandSpec::Resolve(Resolution::UseRemote))
        );
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_line("  "), Input::Empty);
        assert_eq!(parse_line("q"), Input::Quit);
        assert_eq!(parse_line("import quotes.json"), Input::Import("quotes.json".to_string()));
        assert!(matches!(parse_line("dance"), Input::Unknown(_)));
    }

    #[test]
    fn test_spec_to_command() {
        let cmd: QuoteCommand = QuoteCommandSpec::Sync.into();
        assert!(matches!(cmd, QuoteCommand::Sync));
    }
}
