use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::core::connection_manager::ConnectionManager;
use crate::core::errors::{Error, Result};
use crate::core::project::{Forwarded, ProjectHandle};
use crate::sdk::document::Document;
use crate::sdk::errors::SdkError;
use crate::sdk::memory::MemoryDriver;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "search-bridge", version, subcommand_required = true)]
pub struct Args {
    /// JSON connection config (ini_directory, charset, configs, ini_overwrite, aliases)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding `{project}.ini` files; takes precedence over the config file
    #[arg(long)]
    pub ini_dir: Option<PathBuf>,

    /// Default charset of the projects
    #[arg(long)]
    pub charset: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the SDK version
    Version,
    /// Print the effective top-level configuration of a project
    Config { project: String },
    /// Split text with the project's default tokenizer
    Tokenize {
        project: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Query a project, optionally loading documents first
    Search {
        project: String,
        /// JSON-lines file with one document object per line
        #[arg(long)]
        load: Option<PathBuf>,
        /// Maximum number of documents to print
        #[arg(long, default_value_t = 10)]
        limit: u64,
        query: Vec<String>,
    },
    /// Forward a raw operation to the project's client, index or searcher
    Call {
        project: String,
        operation: String,
        /// Arguments; each is parsed as JSON and falls back to a plain string
        args: Vec<String>,
    },
}

pub fn run_cli(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ConnectionConfig::from_file(path)?,
        None => ConnectionConfig::default(),
    };
    if let Some(dir) = args.ini_dir {
        config.ini_directory = dir;
    }
    if let Some(charset) = args.charset {
        config.charset = Some(charset);
    }

    let manager = ConnectionManager::new(config, Arc::new(MemoryDriver::new()))?;
    manager.on_before_open(|event| info!("Opening project '{}'", event.project));

    let outcome = run_command(&manager, args.command);
    manager.shutdown();
    outcome
}

fn run_command(manager: &ConnectionManager, command: Command) -> Result<()> {
    match command {
        Command::Version => {
            println!("{}", manager.version()?);
        }
        Command::Config { project } => {
            let handle = manager.project(&project)?;
            print_forwarded(handle.call("get_configs", &[])?);
        }
        Command::Tokenize { project, text } => {
            let handle = manager.project(&project)?;
            let tokens = handle.tokenizer()?.tokenize(&text.join(" "));
            println!("{}", tokens.join(" / "));
        }
        Command::Search {
            project,
            load,
            limit,
            query,
        } => {
            let handle = manager.project(&project)?;
            if let Some(path) = load {
                let loaded = load_documents(&handle, &path)?;
                info!("Loaded {} documents into '{}'", loaded, project);
            }
            let query = query.join(" ");
            let searcher = handle.searcher()?;
            handle.call("set_limit", &[Value::from(limit)])?;
            let hits = searcher.search(Some(&query))?;
            for doc in &hits {
                println!("{}", doc.to_json());
            }
            println!("-- {} of {} matches", hits.len(), searcher.count(Some(&query))?);
        }
        Command::Call {
            project,
            operation,
            args,
        } => {
            let handle = manager.project(&project)?;
            let args: Vec<Value> = args
                .iter()
                .map(|a| serde_json::from_str(a).unwrap_or_else(|_| Value::from(a.as_str())))
                .collect();
            print_forwarded(handle.call(&operation, &args)?);
        }
    }
    Ok(())
}

fn print_forwarded(result: Forwarded<'_>) {
    match result {
        Forwarded::Handle(handle) => println!("<{}>", handle.name()),
        Forwarded::Value(value) => println!("{value:#}"),
    }
}

/// Add every document of a JSON-lines file; returns how many were added.
fn load_documents(handle: &ProjectHandle, path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path).map_err(SdkError::from)?;
    let mut count = 0;
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| {
            Error::Sdk(SdkError::invalid_argument(format!(
                "{}:{}: {e}",
                path.display(),
                idx + 1
            )))
        })?;
        handle.update(Document::from_json(&value, handle.charset())?, false)?;
        count += 1;
    }
    Ok(count)
}
