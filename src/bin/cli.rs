//! PicoDB CLI
//!
//! Interactive shell for PicoDB. Statements come from `-e` flags or, without
//! them, one per line on stdin.

use std::io::{self, BufRead, Write};

use clap::Parser;
use picodb::protocol::parse_command;
use picodb::{Config, Engine, IndexMode};
use tracing_subscriber::{fmt, EnvFilter};

/// PicoDB shell
#[derive(Parser, Debug)]
#[command(name = "picodb")]
#[command(about = "File-backed table store with hash and B+Tree indexes")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Index used for every lookup (hash | bptree)
    #[arg(short, long, default_value = "hash")]
    index: IndexMode,

    /// Statement to run instead of starting the prompt (repeatable)
    #[arg(short, long = "execute", value_name = "STATEMENT")]
    execute: Vec<String>,
}

const PROMPT: &str = "picodb> ";

fn main() {
    // Logs go to stderr so table output on stdout stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,picodb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .index_mode(args.index)
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open data directory {}: {}", args.data_dir, e);
            std::process::exit(1);
        }
    };

    tracing::debug!(
        "PicoDB v{} using {} index in {}",
        picodb::VERSION,
        args.index,
        args.data_dir
    );

    if !args.execute.is_empty() {
        let mut failed = false;
        for statement in &args.execute {
            failed |= !run_statement(&engine, statement);
        }
        if failed {
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = repl(&engine) {
        tracing::error!("Input error: {}", e);
        std::process::exit(1);
    }
}

/// Read statements until EXIT/QUIT or end of input
fn repl(engine: &Engine) -> io::Result<()> {
    println!("PicoDB v{} ({} index)", picodb::VERSION, engine.index_mode());
    println!("Type EXIT to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line?;
        let statement = line.trim();
        if statement.is_empty() {
            continue;
        }
        if is_exit(statement) {
            return Ok(());
        }
        run_statement(engine, statement);
    }
}

/// Execute one statement, printing its result or error; returns success
fn run_statement(engine: &Engine, statement: &str) -> bool {
    let result = parse_command(statement).and_then(|command| engine.execute(command));
    match result {
        Ok(response) => {
            println!("{}", response);
            true
        }
        Err(e) => {
            println!("[ERROR] {}", e);
            false
        }
    }
}

fn is_exit(statement: &str) -> bool {
    let word = statement.trim_end_matches(';').trim();
    word.eq_ignore_ascii_case("exit") || word.eq_ignore_ascii_case("quit")
}
