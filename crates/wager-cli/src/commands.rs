use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use wager_core::{JsonFileStore, Page, Store, UserId, Wager};
use wager_server::{ServerConfig, WagerServer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.data),
        Command::Ledger => cmd_ledger(&open(cli.data.as_deref())?, format),
        Command::User { action } => cmd_user(&open(cli.data.as_deref())?, action, format),
        Command::Game { action } => cmd_game(&open(cli.data.as_deref())?, action, format),
        Command::Reconcile(args) => cmd_reconcile(&open(cli.data.as_deref())?, args, format),
    }
}

fn open(data: Option<&Path>) -> anyhow::Result<Wager<JsonFileStore>> {
    let Some(path) = data else {
        bail!("--data <FILE> is required for this command");
    };
    tracing::debug!(path = %path.display(), "opening data file");
    let store = JsonFileStore::open(path)
        .with_context(|| format!("opening data file {}", path.display()))?;
    Ok(Wager::new(store))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_serve(args: ServeArgs, data: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if data.is_some() {
        config.data_path = data;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    match config.data_path.clone() {
        Some(path) => {
            let store = JsonFileStore::open(&path)
                .with_context(|| format!("opening data file {}", path.display()))?;
            println!("Wager server on {} (data: {})", config.bind_addr.to_string().bold(), path.display());
            runtime.block_on(serve(config, store))
        }
        None => {
            println!("Wager server on {} ({})", config.bind_addr.to_string().bold(), "in memory".yellow());
            runtime.block_on(serve(config, wager_core::InMemoryStore::new()))
        }
    }
}

async fn serve<S: Store + 'static>(config: ServerConfig, store: S) -> anyhow::Result<()> {
    WagerServer::new(config, Wager::new(store)).serve().await?;
    Ok(())
}

fn cmd_ledger<S: Store>(wager: &Wager<S>, format: OutputFormat) -> anyhow::Result<()> {
    let ledger = wager.current_global_ledger()?;
    if format == OutputFormat::Json {
        return print_json(&ledger);
    }

    let names: BTreeMap<UserId, String> = wager
        .users()?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();
    let name = |id: UserId| names.get(&id).cloned().unwrap_or_else(|| id.to_string());

    if !ledger.has_any_debt() {
        println!("Nobody owes anybody.");
        return Ok(());
    }
    for (ower, owee, amount) in ledger.debts() {
        println!(
            "  {} owes {} {}",
            name(ower).bold(),
            name(owee).bold(),
            amount.to_string().yellow()
        );
    }
    Ok(())
}

fn cmd_user<S: Store>(wager: &Wager<S>, action: UserAction, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        UserAction::Add { name } => {
            let user = wager.register_user(&name)?;
            match format {
                OutputFormat::Json => print_json(&user),
                OutputFormat::Text => {
                    println!("{} Registered {} as {}", "✓".green().bold(), user.name.bold(), user.id.to_string().cyan());
                    Ok(())
                }
            }
        }
        UserAction::List => {
            let users = wager.users()?;
            if format == OutputFormat::Json {
                return print_json(&users);
            }
            for user in users {
                println!("  {} {}", user.id.to_string().cyan(), user.name);
            }
            Ok(())
        }
    }
}

fn cmd_game<S: Store>(wager: &Wager<S>, action: GameAction, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        GameAction::Add { name } => {
            let game = wager.create_game(&name)?;
            match format {
                OutputFormat::Json => print_json(&game),
                OutputFormat::Text => {
                    println!("{} Added {} as {}", "✓".green().bold(), game.name.bold(), game.id.to_string().cyan());
                    Ok(())
                }
            }
        }
        GameAction::List => {
            let games = wager.games(Page::all())?;
            if format == OutputFormat::Json {
                return print_json(&games);
            }
            for game in games {
                println!("  {} {}", game.id.to_string().cyan(), game.name);
            }
            Ok(())
        }
    }
}

fn cmd_reconcile<S: Store>(wager: &Wager<S>, args: ReconcileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = if args.repair {
        wager.repair()?
    } else {
        wager.reconcile()?
    };
    if format == OutputFormat::Json {
        return print_json(&report);
    }

    if report.is_consistent() {
        println!("{} {} ledgers consistent.", "✓".green().bold(), report.checked);
        return Ok(());
    }
    let verb = if args.repair { "repaired" } else { "drifted" };
    for drift in &report.drifts {
        println!("  {} {}", verb.red(), drift.scope.to_string().yellow());
    }
    println!("{} of {} ledgers {}.", report.drifts.len(), report.checked, verb);
    Ok(())
}
