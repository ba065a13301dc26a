use chrono::Utc;
use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use rotor::domain::{
    AuthContext, Identity, LegacyDefinition, QuotaTarget, SourceProgress, TrainingMarks, TrainingType, UserId,
    WeeklyQuota,
};
use rotor::rotation::Resolver;
use rotor::store::{QuotaStore, SqliteStore};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, ItemCommands, QuotaCommands};
use config::Config;

fn setup_logging(config: &Config) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rotor")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("rotor.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let rust_log = std::env::var("RUST_LOG").ok();
    let mut builder = env_logger::Builder::new();
    if let Some(filters) = config.log_filters(rust_log.as_deref()) {
        builder.parse_filters(filters);
    }
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Build the caller's auth context from CLI flags, falling back to the config session.
fn auth_context(cli: &Cli, config: &Config) -> Result<AuthContext> {
    let user_id = match (cli.as_user, config.session.user_id) {
        (Some(user), _) => Some(user),
        (None, Some(raw)) => Some(UserId::new(raw).context("Invalid session.user_id in config")?),
        (None, None) => None,
    };
    let role = cli.role.unwrap_or(config.session.role);

    Ok(match user_id {
        Some(user_id) => AuthContext::authenticated(Identity::new(user_id, role)),
        None => AuthContext::anonymous(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let db_path = cli.db.as_ref().unwrap_or(&config.storage.db_path);
    let store = SqliteStore::open(db_path).context("Failed to open quota store")?;
    let auth = auth_context(cli, config)?;
    match auth.identity() {
        Some(identity) => info!("Acting as user {} ({})", identity.user_id, identity.role),
        None => info!("Acting anonymously"),
    }

    match &cli.command {
        Commands::Next {
            training_type,
            for_user,
        } => {
            let resolver = Resolver::new(&store).with_window(config.rotation.count_window);
            info!("Resolving next {} source with {} window", training_type, resolver.window());
            let next = match for_user {
                Some(user) => resolver.next_active_source_for(&auth, *user, *training_type)?,
                None => resolver.next_active_source(&auth, *training_type)?,
            };
            handle_next(next, cli.json)
        }
        Commands::Progress {
            training_type,
            for_user,
        } => {
            let resolver = Resolver::new(&store).with_window(config.rotation.count_window);
            info!("Reporting {} progress with {} window", training_type, resolver.window());
            let report = match for_user {
                Some(user) => resolver.progress_report_for(&auth, *user, *training_type)?,
                None => resolver.progress_report(&auth, *training_type)?,
            };
            handle_progress(&report, cli.json)
        }
        Commands::Quota { command } => handle_quota_command(command, &store, &auth, cli.json),
        Commands::Import { file } => handle_import_command(file, &store, &auth, cli.json),
        Commands::Item { command } => handle_item_command(command, &store, cli.json),
        Commands::Train { item, like, category } => {
            let identity = auth.require()?;
            if store.get_item(*item)?.is_none() {
                return Err(eyre!("Content item {} not found", item));
            }
            let marks = training_marks(*like, *category)?;
            let record = store.record_training(identity.user_id, *item, &marks, Utc::now())?;
            if cli.json {
                return print_json(&record);
            }
            println!("{} training {} on item {}", "Recorded".green(), record.id, item);
            Ok(())
        }
    }
}

/// Marks for a `train` command; at least one training type must be marked.
fn training_marks(like: Option<i64>, category: Option<i64>) -> Result<TrainingMarks> {
    let marks = TrainingMarks { like, category };
    if !TrainingType::all().iter().any(|t| marks.is_marked(*t)) {
        return Err(eyre!("Nothing to record: pass --like or --category"));
    }
    Ok(marks)
}

/// Quotas of `for_user` (or the caller), optionally of one training type.
fn collect_quotas(
    store: &SqliteStore,
    auth: &AuthContext,
    for_user: Option<UserId>,
    training_type: Option<TrainingType>,
) -> Result<(UserId, Vec<WeeklyQuota>)> {
    let identity = auth.require()?;
    let user_id = for_user.unwrap_or(identity.user_id);
    auth.require_self_or_admin(user_id)?;

    let types = match training_type {
        Some(t) => vec![t],
        None => TrainingType::all().to_vec(),
    };
    let mut quotas = Vec::new();
    for t in types {
        quotas.extend(store.list_quotas(user_id, t)?);
    }
    Ok((user_id, quotas))
}

fn handle_next(next: Option<QuotaTarget>, json: bool) -> Result<()> {
    if json {
        return print_json(&next);
    }
    match next {
        Some(target) => println!(
            "{} source {} (weekly limit {})",
            "Next:".green(),
            target.source_id,
            target.weekly_limit
        ),
        None => println!("{}", "No active source: all quotas met or none configured".cyan()),
    }
    Ok(())
}

fn handle_progress(report: &[SourceProgress], json: bool) -> Result<()> {
    if json {
        return print_json(&report);
    }
    if report.is_empty() {
        println!("{}", "No quotas configured".cyan());
        return Ok(());
    }
    for row in report {
        let marker = if row.active { "*".green() } else { " ".normal() };
        let state = if row.progress.is_completed {
            "done".green()
        } else {
            format!("{} left", row.progress.remaining()).as_str().yellow()
        };
        println!(
            "{} source {:>6}  {:>5}/{:<5}  {}",
            marker, row.target.source_id, row.progress.completed, row.progress.total, state
        );
    }
    Ok(())
}

fn handle_quota_command(command: &QuotaCommands, store: &SqliteStore, auth: &AuthContext, json: bool) -> Result<()> {
    info!("Handling quota command: {:?}", command);
    match command {
        QuotaCommands::List {
            for_user,
            training_type,
        } => {
            let (user_id, quotas) = collect_quotas(store, auth, *for_user, *training_type)?;

            if json {
                return print_json(&quotas);
            }
            if quotas.is_empty() {
                println!("{} {}", "No quotas for user".cyan(), user_id);
            }
            for quota in quotas {
                println!(
                    "  {:<12} source {:>6}  limit {}",
                    quota.training_type, quota.source_id, quota.weekly_limit
                );
            }
            Ok(())
        }
        QuotaCommands::Export {
            for_user,
            training_type,
        } => {
            let (user_id, quotas) = collect_quotas(store, auth, *for_user, *training_type)?;
            let rows: Vec<LegacyDefinition> = quotas.iter().map(LegacyDefinition::from_quota).collect();
            info!("Exporting {} quota(s) for user {}", rows.len(), user_id);
            if json {
                return print_json(&rows);
            }
            print!("{}", serde_yaml::to_string(&rows)?);
            Ok(())
        }
        QuotaCommands::Set {
            user,
            training_type,
            source,
            limit,
        } => {
            let quota = WeeklyQuota::new(*user, *training_type, *source, *limit);
            store.set_quota(auth, &quota)?;
            if json {
                return print_json(&quota);
            }
            println!(
                "{} {} quota for user {} source {} = {}",
                "Set".green(),
                training_type,
                user,
                source,
                limit
            );
            Ok(())
        }
        QuotaCommands::Remove {
            user,
            training_type,
            source,
        } => {
            let removed = store.remove_quota(auth, *user, *training_type, *source)?;
            if json {
                return print_json(&serde_json::json!({ "removed": removed }));
            }
            if removed {
                println!("{} {} quota for user {} source {}", "Removed".red(), training_type, user, source);
            } else {
                println!("{}", "No such quota".yellow());
            }
            Ok(())
        }
    }
}

fn handle_import_command(file: &Path, store: &SqliteStore, auth: &AuthContext, json: bool) -> Result<()> {
    info!("Importing definitions from {}", file.display());
    let content = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let rows: Vec<LegacyDefinition> =
        serde_yaml::from_str(&content).context(format!("Failed to parse {}", file.display()))?;

    let report = store.import_definitions(auth, &rows)?;
    if json {
        return print_json(&report);
    }
    println!("{} {} definition(s)", "Imported".green(), report.imported);
    for skipped in &report.skipped {
        println!("  {} {}: {}", "skipped".yellow(), skipped.name, skipped.reason);
    }
    Ok(())
}

fn handle_item_command(command: &ItemCommands, store: &SqliteStore, json: bool) -> Result<()> {
    match command {
        ItemCommands::Add { source, invalid } => {
            let item = store.add_item(*source, *invalid)?;
            if json {
                return print_json(&item);
            }
            println!("{} item {} in source {}", "Added".green(), item.id, item.source_id);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
