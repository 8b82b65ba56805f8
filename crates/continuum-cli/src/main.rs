//! # Continuum CLI
//!
//! Loads the five entity collections from a Continuum backend (or an offline
//! JSON fixture), then prints one of the tables as tab-separated rows or runs
//! the cross-collection integrity check.
//!
//! ```text
//! continuum players --sort rank --desc
//! continuum items --filter bosses="All BWL"
//! continuum --fixture guild.json loot-history --filter name=Tharlen
//! continuum check
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use continuum_client::{
    Backend, ClientError, EntityStore, LoginForm, MemoryBackend, RestClient, SessionClient,
};
use continuum_common::config::{self, AppConfig};
use continuum_common::error::LootError;
use continuum_common::models::{Item, LootHistoryRow, Player};
use continuum_common::permissions::PermissionPolicy;
use continuum_view::{LookupContext, SortDirection, TableEngine, TableEntity};

#[derive(Debug, Parser)]
#[command(name = "continuum", version, about = "Guild loot tables from the command line")]
struct Cli {
    /// Backend origin; overrides `api.base_url` from the config.
    #[arg(long)]
    base_url: Option<String>,

    /// Read collections from a JSON fixture instead of the backend.
    #[arg(long, conflicts_with = "base_url")]
    fixture: Option<PathBuf>,

    /// Log in as this character before loading.
    #[arg(long, requires = "password")]
    player: Option<String>,

    #[arg(long, env = "CONTINUUM_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the roster.
    Players(TableArgs),
    /// Print the item table.
    Items(TableArgs),
    /// Print the loot history.
    LootHistory(TableArgs),
    /// Report records that reference missing players, items or raid days.
    Check,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Column key to sort by.
    #[arg(long)]
    sort: Option<String>,

    #[arg(long, requires = "sort")]
    desc: bool,

    /// Multi-select filter, `key=value[,value...]`. Repeatable.
    #[arg(long = "filter", value_parser = parse_assignment)]
    filters: Vec<(String, String)>,

    /// Start without the table's default filters.
    #[arg(long)]
    all: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing column key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = config::load().context("failed to load configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }

    init_tracing(cli.json_logs);
    tracing::debug!(base_url = %config.api.base_url, "configuration loaded");

    let backend = backend(&cli, &config)?;
    let store = Arc::new(EntityStore::new(backend.clone()));

    if let (Some(player_name), Some(password)) = (&cli.player, &cli.password) {
        let session = SessionClient::new(backend, store.clone());
        let form = LoginForm {
            player_name: player_name.clone(),
            password: password.clone(),
        };
        if session.login(&form).await?.is_none() {
            bail!("login for '{player_name}' was not accepted");
        }
    }

    let integrity = match store.init().await {
        Ok(()) => Vec::new(),
        Err(ClientError::Loot(LootError::Integrity(report))) => report,
        Err(e) => return Err(e).context("failed to load collections"),
    };

    let ctx = LookupContext::new(store.snapshot().await);
    let mut out = io::stdout().lock();
    match &cli.command {
        Command::Players(args) => print_table::<Player>(&mut out, &ctx, &config.policy, args)?,
        Command::Items(args) => print_table::<Item>(&mut out, &ctx, &config.policy, args)?,
        Command::LootHistory(args) => {
            print_table::<LootHistoryRow>(&mut out, &ctx, &config.policy, args)?
        }
        Command::Check => {
            for problem in &integrity {
                writeln!(out, "{problem}")?;
            }
            if !integrity.is_empty() {
                bail!("{} dangling reference(s)", integrity.len());
            }
            writeln!(out, "ok")?;
        }
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "continuum=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn backend(cli: &Cli, config: &AppConfig) -> anyhow::Result<Arc<dyn Backend>> {
    match &cli.fixture {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let fixture = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            tracing::info!(path = %path.display(), "using offline fixture");
            Ok(Arc::new(MemoryBackend::from_fixture(fixture)))
        }
        None => Ok(Arc::new(RestClient::from_config(&config.api)?)),
    }
}

fn configure<T: TableEntity>(
    ctx: &LookupContext,
    policy: &PermissionPolicy,
    args: &TableArgs,
) -> anyhow::Result<TableEngine<T>> {
    let mut engine = if args.all {
        TableEngine::<T>::new(policy.clone())
    } else {
        TableEngine::<T>::with_defaults(policy.clone(), ctx)
    };

    for (key, values) in &args.filters {
        engine.set_filter_values(key, values.split(',').map(str::trim))?;
    }
    if let Some(key) = &args.sort {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        engine.sort_by(key, direction)?;
    }
    Ok(engine)
}

fn print_table<T: TableEntity>(
    out: &mut impl Write,
    ctx: &LookupContext,
    policy: &PermissionPolicy,
    args: &TableArgs,
) -> anyhow::Result<()> {
    let engine = configure::<T>(ctx, policy, args)?;

    let header: Vec<&str> = engine.columns().iter().map(|c| c.title).collect();
    writeln!(out, "{}", header.join("\t"))?;
    for row in engine.rows(ctx) {
        let cells: Vec<String> = row.cells.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn fixture_ctx() -> LookupContext {
        let backend = Arc::new(MemoryBackend::from_fixture(json!({
            "players": [
                {"id": 1, "name": "Tharlen", "class": "MG", "rank": 50, "role": "D"},
                {"id": 2, "name": "Grum", "class": "WR", "rank": 70, "role": "T"},
            ],
            "items": [],
            "loot_history": [],
            "raids": [],
            "raid_days": [],
        })));
        let store = EntityStore::new(backend);
        store.init().await.unwrap();
        LookupContext::new(store.snapshot().await)
    }

    fn args(argv: &[&str]) -> TableArgs {
        let mut full = vec!["continuum", "players"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Players(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("notes=a=b").unwrap(),
            ("notes".to_owned(), "a=b".to_owned())
        );
        assert!(parse_assignment("class").is_err());
        assert!(parse_assignment("=Mage").is_err());
    }

    #[test]
    fn desc_requires_sort() {
        assert!(Cli::try_parse_from(["continuum", "players", "--desc"]).is_err());
    }

    #[tokio::test]
    async fn prints_header_then_sorted_rows() {
        let ctx = fixture_ctx().await;
        let mut out = Vec::new();
        print_table::<Player>(&mut out, &ctx, &PermissionPolicy::default(), &args(&[])).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name\tClass\tRank\tRole\tNotes");
        assert!(lines[1].starts_with("Grum\tWarrior"));
        assert!(lines[2].starts_with("Tharlen\tMage"));
    }

    #[tokio::test]
    async fn filters_and_descending_sort_apply() {
        let ctx = fixture_ctx().await;
        let mut out = Vec::new();
        let args = args(&["--filter", "class=Mage, Warrior", "--sort", "name", "--desc"]);
        print_table::<Player>(&mut out, &ctx, &PermissionPolicy::default(), &args).unwrap();
        let names: Vec<&str> = std::str::from_utf8(&out)
            .unwrap()
            .lines()
            .skip(1)
            .filter_map(|l| l.split('\t').next())
            .collect();
        assert_eq!(names, ["Tharlen", "Grum"]);
    }

    #[tokio::test]
    async fn unknown_column_is_an_error() {
        let ctx = fixture_ctx().await;
        let result = print_table::<Player>(
            &mut Vec::new(),
            &ctx,
            &PermissionPolicy::default(),
            &args(&["--sort", "favourite_boss"]),
        );
        assert!(result.is_err());
    }
}
