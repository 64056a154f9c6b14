/* This file is part of the YouTube Interaction Manager project
*
*  Copyright (C) 2025 YouTube Interaction Manager contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use std::{fs, io::{self, Write}, path::PathBuf};

use clap::{Parser, Subcommand};
use cloneable_errors::{ErrorContext, ResContext};
use env_logger::Env;
use interaction_engine::{constants::APP_NAME, lists::ListKind, MemoryStore, SettingsStore};
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

mod commands;
mod config;
mod file_store;
mod simulate;

use config::{AppConfig, CONFIG_PATH};
use file_store::JsonFileStore;

#[derive(Parser)]
#[command(version, about = "Manage the auto like/dislike settings store")]
struct Args {
    /// Path to the config file, created with defaults if missing
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the effective settings
    Status,
    /// Store a value, given as JSON or as a plain string
    Set { key: String, value: String },
    /// Manage the whitelist and blacklist
    List {
        #[command(subcommand)]
        command: ListCommand,
    },
    /// Show what would happen on a video from this channel
    Check { channel: String },
    /// Show the activity log, newest first
    Log,
    /// Write a backup of the whole store
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Restore a backup written by `export`
    Import { file: PathBuf },
    /// Rewrite legacy settings under the current keys
    Migrate,
    /// Play a scripted session through the controller
    Simulate {
        script: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        /// Don't write anything back to the store
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum ListCommand {
    Add {
        list: ListKind,
        name: String,
        #[arg(long)]
        url: Option<String>,
    },
    Remove {
        list: ListKind,
        name: String,
    },
    Show {
        list: Option<ListKind>,
    },
}

fn main() -> Result<(), ErrorContext> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let args = Args::parse();
    let config = AppConfig::load_or_create(&args.config)?;
    let mut store = JsonFileStore::open(&config.store_path)?;
    debug!("Using settings store at {}", store.path().display());
    let mut out = io::stdout().lock();

    match args.command {
        Command::Status => commands::status(&store, &mut out)?,
        Command::Set { key, value } => {
            let changed = commands::set(&mut store, &key, &value)?;
            if changed.is_empty() {
                info!("{key} was already set to that value");
            }
        },
        Command::List { command } => match command {
            ListCommand::Add { list, name, url } => commands::list_add(&mut store, list, &name, url.as_deref(), &mut out)?,
            ListCommand::Remove { list, name } => commands::list_remove(&mut store, list, &name, &mut out)?,
            ListCommand::Show { list } => commands::list_show(&store, list, &mut out)?,
        },
        Command::Check { channel } => commands::check(&store, &channel, &mut out)?,
        Command::Log => commands::show_log(&store, &mut out)?,
        Command::Export { output } => {
            let path = commands::export(&store, output.as_deref(), &config.backup_dir)?;
            info!("Backup written to {}", path.display());
        },
        Command::Import { file } => {
            let changed = commands::import(&mut store, &file)?;
            info!("Import complete, {} keys changed", changed.len());
        },
        Command::Migrate => {
            let changed = commands::migrate(&mut store)?;
            info!("Migrated {} keys", changed.len());
        },
        Command::Simulate { script, seed, dry_run } => {
            let text = fs::read_to_string(&script).with_context(|| format!("Failed to read {}", script.display()))?;
            let script = simulate::Script::parse(&text)?;
            let rng = match seed.or(script.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            info!("{APP_NAME}: simulating {} videos", script.videos.len());
            let reports = if dry_run {
                let scratch = MemoryStore::with_data(store.get_all()?);
                simulate::run(&script, &config.selectors, scratch, rng)?.0
            } else {
                simulate::run(&script, &config.selectors, store, rng)?.0
            };
            for report in reports {
                let channel = report.channel.as_deref().unwrap_or("-");
                writeln!(out, "{} {channel}: {:?}, pressed {:?}, badge {:?}", report.id, report.outcome, report.pressed, report.badge)
                    .context("Failed to write output")?;
            }
        },
    }

    Ok(())
}
