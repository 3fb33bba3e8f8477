//! `dashgate` demo driver: runs text commands against a shell.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use dashgate::handlers::run_line;
use dashgate::{Shell, ShellConfig, StorageLocation};

/// Drive the dashboard shell with text commands (one per line).
#[derive(Parser, Debug)]
#[command(name = "dashgate", version, about)]
struct Args {
    /// Storage file for persisted preferences
    #[arg(long, value_name = "PATH", conflicts_with = "in_memory")]
    storage: Option<PathBuf>,

    /// Do not persist anything
    #[arg(long)]
    in_memory: bool,

    /// Read commands from FILE instead of stdin
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> ShellConfig {
        let config = ShellConfig::from_env();
        if self.in_memory {
            config.with_storage(StorageLocation::Memory)
        } else if let Some(path) = &self.storage {
            config.with_storage(StorageLocation::File(path.clone()))
        } else {
            config
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let shell = match Shell::new(args.config()) {
        Ok(shell) => shell,
        Err(err) => {
            error!("failed to start shell: {err}");
            return ExitCode::FAILURE;
        }
    };

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(err) => {
                error!("cannot open script {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    for (number, line) in input.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!("failed to read input: {err}");
                break;
            }
        };
        match run_line(&shell, &line) {
            Ok(output) => output.iter().for_each(|l| println!("{l}")),
            Err(err) => error!("line {}: {err}", number + 1),
        }
    }

    match shell.shutdown() {
        Ok(()) => {
            info!("bye");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("failed to flush storage: {err}");
            ExitCode::FAILURE
        }
    }
}
