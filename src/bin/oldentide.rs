#![warn(clippy::all)]
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{crate_version, Arg, ArgMatches, Command};
use oldentide::config::{read_configuration, Configuration};
use oldentide::crypt::password_hash;
use oldentide::model::migrations;
use oldentide::model::store::Store;
use oldentide::Result;
use tracing::{error, info, warn};
use tracing_log::LogTracer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

#[async_std::main]
async fn main() {
    let matches = Command::new("oldentide")
        .version(crate_version!())
        .author("Oldentide <oldentide@protonmail.com>")
        .about("Account and character administration for the Oldentide dedicated server")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .default_value("config.yaml")
                .takes_value(true),
        )
        .arg(
            Arg::new("log")
                .short('l')
                .long("log")
                .value_name("LEVEL")
                .help("Sets the log level")
                .default_value("INFO")
                .possible_values(["ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
                .takes_value(true),
        )
        .subcommand_required(true)
        .subcommand(Command::new("migrate").about("Updates the database schema"))
        .subcommand(
            Command::new("create-account")
                .about("Creates an account")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("name of the account")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("email of the account")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("password of the account")
                        .required(true)
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("activate")
                .about("Activates the account that owns a verify key")
                .arg(
                    Arg::new("key")
                        .short('k')
                        .long("key")
                        .help("verify key sent to the account owner")
                        .required(true)
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("ban").about("Bans an account").arg(
                Arg::new("name")
                    .short('n')
                    .long("name")
                    .help("name of the account")
                    .required(true)
                    .takes_value(true),
            ),
        )
        .subcommand(
            Command::new("list").about("Lists the stored records").arg(
                Arg::new("table")
                    .help("records to list")
                    .possible_values(["accounts", "players", "npcs", "items"])
                    .required(true)
                    .takes_value(true),
            ),
        )
        .get_matches();

    if let Err(e) = init_logging(&matches) {
        eprintln!("Can't initialize logging: {:?}", e);
        process::exit(1);
    }

    if let Err(e) = run_command(&matches).await {
        error!("Error while executing program: {:?}", e);
        process::exit(1);
    }
}

fn init_logging(matches: &ArgMatches) -> Result<()> {
    let level = match matches.value_of("log").unwrap_or_default() {
        "ERROR" => LevelFilter::ERROR,
        "WARN" => LevelFilter::WARN,
        "INFO" => LevelFilter::INFO,
        "DEBUG" => LevelFilter::DEBUG,
        "TRACE" => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    };

    let fmt_layer = Layer::default().with_target(true);
    let filter_layer = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("async_std=warn".parse()?)
        .add_directive("sqlx::query=warn".parse()?);

    let subscriber = Registry::default().with(filter_layer).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    LogTracer::init()?;
    Ok(())
}

async fn run_command(matches: &ArgMatches) -> Result<()> {
    let config_str = matches.value_of("config").unwrap_or("config.yaml");
    let path = PathBuf::from(config_str);
    let config =
        read_configuration(&path).context(format!("Can't read configuration file {:?}", path))?;

    match matches.subcommand() {
        Some(("migrate", _)) => migrate(&config).await,
        Some(("create-account", matches)) => create_account(matches, &config).await,
        Some(("activate", matches)) => activate(matches, &config).await,
        Some(("ban", matches)) => ban(matches, &config).await,
        Some(("list", matches)) => list(matches, &config).await,
        _ => bail!("Unknown command"),
    }
}

async fn migrate(config: &Configuration) -> Result<()> {
    info!("Updating database schema");
    migrations::apply(&config.database.server_url(), &config.database.database)
        .await
        .context("Can't update database schema")?;
    info!("Database schema is up to date");
    Ok(())
}

async fn create_account(matches: &ArgMatches, config: &Configuration) -> Result<()> {
    let store = Store::connect(&config.database).await?;

    let account_name = matches.value_of("name").unwrap_or_default();
    let email = matches.value_of("email").unwrap_or_default();
    let password = matches.value_of("password").unwrap_or_default();

    if store.account_exists(account_name).await? {
        error!("Account {} already exists", account_name);
        return Ok(());
    }
    if store.email_exists(email).await? {
        error!("Email {} is already used by another account", email);
        return Ok(());
    }

    let verify_key = store
        .generate_unique_verify(config.account.verify_key_length)
        .await?;
    let salt_key = store
        .generate_unique_salt(config.account.salt_key_length)
        .await?;
    let hash = password_hash::create_hash(password.as_bytes(), &salt_key)?;

    if !store
        .create_account(account_name, email, &verify_key, &hash, &salt_key)
        .await
    {
        bail!("Account {} could not be created", account_name);
    }
    info!(
        "Created account {}. Activate it with verify key {}",
        account_name, verify_key
    );
    Ok(())
}

async fn activate(matches: &ArgMatches, config: &Configuration) -> Result<()> {
    let store = Store::connect(&config.database).await?;
    let key = matches.value_of("key").unwrap_or_default();

    let account_name = store.get_account_name_from_verify_key(key).await?;
    if account_name.is_empty() {
        warn!("No account uses the verify key {}", key);
        return Ok(());
    }
    if !store.activate_account(&account_name).await {
        bail!("Account {} could not be activated", account_name);
    }
    info!("Activated account {}", account_name);
    Ok(())
}

async fn ban(matches: &ArgMatches, config: &Configuration) -> Result<()> {
    let store = Store::connect(&config.database).await?;
    let account_name = matches.value_of("name").unwrap_or_default();

    if store.get_account(account_name).await?.is_none() {
        warn!("Account {} doesn't exist", account_name);
        return Ok(());
    }
    if !store.ban_account(account_name).await {
        bail!("Account {} could not be banned", account_name);
    }
    info!("Banned account {}", account_name);
    Ok(())
}

async fn list(matches: &ArgMatches, config: &Configuration) -> Result<()> {
    let store = Store::connect(&config.database).await?;

    match matches.value_of("table").unwrap_or_default() {
        "accounts" => {
            for account in store.list_accounts().await? {
                println!(
                    "{:>6} | {:<24} | {:<32} | valid: {:<5} | banned: {:<5} | created: {}",
                    account.id,
                    account.accountname,
                    account.email,
                    account.valid,
                    account.banned,
                    account.created_at.format("%Y-%m-%d %H:%M:%S"),
                );
            }
        }
        "players" => {
            for pc in store.pull_pcs().await? {
                println!(
                    "{:>6} | {} {} | account {} | level {} | {} ({:.1}, {:.1}, {:.1})",
                    pc.id, pc.firstname, pc.lastname, pc.account_id, pc.plevel, pc.zone, pc.x, pc.y, pc.z,
                );
            }
        }
        "npcs" => {
            for npc in store.pull_npcs().await? {
                println!(
                    "{:>6} | {} {} | level {} | {} ({:.1}, {:.1}, {:.1})",
                    npc.id, npc.firstname, npc.lastname, npc.level, npc.zone, npc.x, npc.y, npc.z,
                );
            }
        }
        "items" => {
            for template in store.pull_item_templates().await? {
                println!(
                    "{:>6} | {:<24} | {:<12} | {:<8} | price {}",
                    template.id, template.name, template.item_type, template.slot, template.base_price,
                );
            }
        }
        table => bail!("Unknown table {}", table),
    }
    Ok(())
}
