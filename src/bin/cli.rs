//! bkv CLI
//!
//! Command-line interface for working with a bkv database file. This is a
//! thin layer: it turns text into bytes and back, and the engine does the
//! rest.

use std::path::PathBuf;
use std::process;

use bkv::{Engine, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// bkv CLI
#[derive(Parser, Debug)]
#[command(name = "bkv-cli")]
#[command(about = "Minimal embedded key-value store on a single append-only log")]
#[command(version)]
struct Args {
    /// Database file path
    #[arg(short, long)]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database file, or verify an existing one opens cleanly
    Init,

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List all keys
    List,

    /// Rewrite the log, dropping deleted and superseded records
    Compact,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut db = Engine::open_path(args.path)?;

    // Run the command, then close on every path (including errors) so the
    // lock file never outlives the process.
    let result = execute(&mut db, args.command);
    let closed = db.close();
    result.and(closed)
}

fn execute(db: &mut Engine, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Initialized database at {}", db.path().display());
        }
        Commands::Set { key, value } => {
            db.set(&key, value.as_bytes())?;
            println!("Set {} => {}", key, value);
        }
        Commands::Get { key } => match db.get(&key)? {
            Some(value) => println!("{} => {}", key, String::from_utf8_lossy(&value)),
            None => println!("Key not found: {}", key),
        },
        Commands::Del { key } => {
            db.delete(&key)?;
            println!("Deleted {}", key);
        }
        Commands::List => {
            for key in db.keys() {
                println!("- {}", key);
            }
        }
        Commands::Compact => {
            let before = db.file_size()?;
            db.compact()?;
            let after = db.file_size()?;
            println!("Compacted: {} -> {} bytes", before, after);
        }
    }
    Ok(())
}
