//! Command-line entry point for podcast script files.
//!
//! # Responsibility
//! - Inspect, validate and normalize script JSON files through the core
//!   data manager.
//! - Publish and read viewer handoff snapshots in a SQLite store.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use podscript_core::db::open_db;
use podscript_core::{
    default_log_level, init_logging, parse_script_text, sanitize_export_filename,
    validate_script, DataManager, EditorConfig, LogFacadeLogger, ScriptPersistence, ScriptViewer,
    SqliteKeyValueStore,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Podcast script toolkit
#[derive(Parser, Debug)]
#[clap(name = "podscript")]
#[clap(about = "Inspect and convert podcast script files", version)]
struct Args {
    /// Log level (trace|debug|info|warn|error)
    #[clap(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[clap(long, global = true, value_name = "DIR")]
    log_dir: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core linkage info
    Ping,
    /// Print statistics for a script file
    Stats {
        #[clap(value_name = "FILE")]
        file: PathBuf,
    },
    /// Check a script file's structure
    Validate {
        #[clap(value_name = "FILE")]
        file: PathBuf,
    },
    /// Re-export a script file with recomputed fields and a sanitized name
    Normalize {
        #[clap(value_name = "FILE")]
        file: PathBuf,
        /// Output file name (sanitized, `.json` forced)
        #[clap(long)]
        name: Option<String>,
        /// Output directory
        #[clap(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// Publish a script file as the viewer handoff snapshot
    Handoff {
        #[clap(value_name = "FILE")]
        file: PathBuf,
        /// SQLite store path
        #[clap(long, value_name = "DB")]
        db: PathBuf,
    },
    /// Print the viewer handoff snapshot
    View {
        /// SQLite store path
        #[clap(long, value_name = "DB")]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let config = EditorConfig::default();
    match args.command {
        Command::Ping => {
            println!("podscript_core ping={}", podscript_core::ping());
            println!("podscript_core version={}", podscript_core::core_version());
        }
        Command::Stats { file } => {
            let manager = load_manager(&file, &config)?;
            let stats = manager.statistics();
            println!("roles:     {}", stats.role_count);
            println!("replicas:  {}", stats.replica_count);
            println!("words:     {}", stats.total_words);
            println!("duration:  {}", stats.total_duration_formatted);
        }
        Command::Validate { file } => {
            let text = read_file(&file)?;
            let data = parse_script_text(&text)?;
            validate_script(&data)?;
            println!("{}: ok", file.display());
        }
        Command::Normalize {
            file,
            name,
            out_dir,
        } => {
            let manager = load_manager(&file, &config)?;
            let requested = match name {
                Some(name) => name,
                None => file
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            let file_name = sanitize_export_filename(&requested, &config.default_export_stem);
            let target = out_dir.join(file_name);
            std::fs::write(&target, manager.export_json()?)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!("event=normalize module=cli status=ok target={}", target.display());
            println!("{}", target.display());
        }
        Command::Handoff { file, db } => {
            let manager = load_manager(&file, &config)?;
            let conn = open_db(&db)?;
            let persistence = ScriptPersistence::new(SqliteKeyValueStore::try_new(&conn)?, &config);
            persistence.write_viewer_handoff(&manager)?;
            println!("handoff written to {}", db.display());
        }
        Command::View { db } => {
            let conn = open_db(&db)?;
            let store = SqliteKeyValueStore::try_new(&conn)?;
            let Some(viewer) = ScriptViewer::load(&store, &config.viewer_key, &config)? else {
                bail!("no viewer snapshot in {}", db.display());
            };
            for line in viewer.lines() {
                let speaker = line.role_name.as_deref().unwrap_or("(unassigned)");
                println!("[{:>6.1}s] {speaker}: {}", line.estimated_seconds, line.text);
            }
            println!("total {}", viewer.statistics().total_duration_formatted);
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_manager(path: &Path, config: &EditorConfig) -> Result<DataManager> {
    let text = read_file(path)?;
    let mut manager = DataManager::new(config.clone(), Rc::new(LogFacadeLogger));
    manager
        .import_json(&text)
        .with_context(|| format!("failed to import {}", path.display()))?;
    Ok(manager)
}
