#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that keeps the ledger of a Monopoly game.
//!
//! Every invocation loads the game from the state file, applies at most one
//! command and writes the history back.

mod config;
mod report;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use monopoly_ledger_core::{Command, Money, Party, PlayerName, PropertyName};
use monopoly_ledger_history::{apply, new_game, query, restore, transfer, History};
use monopoly_ledger_system_catalog::PropertyCatalog;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LedgerConfig;

const DEFAULT_STATE_PATH: &str = "game.ledger";

#[derive(Parser)]
#[command(name = "monopoly-ledger")]
#[command(about = "Money and property ledger for a game of Monopoly", version)]
struct Cli {
    /// Table configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// File holding the game history
    #[arg(long, global = true, default_value = DEFAULT_STATE_PATH)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game, replacing any saved one only with --force
    New {
        #[arg(long)]
        force: bool,
    },
    /// Show every participant's money and holdings
    Show,
    /// List the entries around the current one
    History {
        #[arg(long, default_value_t = 5)]
        radius: usize,
    },
    /// Net worth of a player at every entry
    Values { player: String },
    /// Step back one entry
    Undo,
    /// Step forward one entry
    Redo,
    /// Move money between participants; `ALL` means every player
    Pay {
        payer: String,
        payee: String,
        /// Negative amounts move money the other way
        #[arg(allow_negative_numbers = true)]
        amount: Money,
    },
    /// Collect the salary for passing GO
    Go { player: String },
    /// Pay the income tax
    IncomeTax { player: String },
    /// Pay the super tax
    SuperTax { player: String },
    /// Pay the fee to leave jail
    OutOfJail { player: String },
    /// Sell a property; the price defaults to its current value
    Trade {
        seller: String,
        buyer: String,
        property: String,
        #[arg(allow_negative_numbers = true)]
        price: Option<Money>,
    },
    /// Mortgage a property with the bank
    Mortgage { player: String, property: String },
    /// Lift the mortgage on a property
    Unmortgage { player: String, property: String },
    /// Buy a house on a property
    BuyHouse { player: String, property: String },
    /// Sell a house on a property back to the bank
    SellHouse { player: String, property: String },
    /// Pay rent for landing on a property
    Rent {
        payer: String,
        property: String,
        /// Dice total, used by utilities
        #[arg(long, default_value_t = 0)]
        dice: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = LedgerConfig::load(cli.config.as_deref())?;
    let catalog = config.catalog()?;

    let command = match cli.command {
        Commands::New { force } => {
            if !force && cli.state.exists() {
                bail!(
                    "{} already holds a game; pass --force to replace it",
                    cli.state.display()
                );
            }
            let history = new_game(&catalog, config.roster()?, config.setup());
            save(&cli.state, &history)?;
            print!("{}", report::standings(&history, &catalog));
            return Ok(());
        }
        Commands::Show => {
            let history = load(&cli.state, &catalog)?;
            print!("{}", report::standings(&history, &catalog));
            return Ok(());
        }
        Commands::History { radius } => {
            let history = load(&cli.state, &catalog)?;
            print!("{}", report::timeline(&history, radius));
            return Ok(());
        }
        Commands::Values { player } => {
            let history = load(&cli.state, &catalog)?;
            print!("{}", report::values(&history, &player));
            return Ok(());
        }
        Commands::Undo => Command::Backward,
        Commands::Redo => Command::Forward,
        Commands::Pay {
            payer,
            payee,
            amount,
        } => Command::Pay {
            payer: Party::parse(&payer),
            payee: Party::parse(&payee),
            amount,
        },
        Commands::Go { player } => Command::PassGo {
            player: PlayerName::new(player),
        },
        Commands::IncomeTax { player } => Command::IncomeTax {
            player: PlayerName::new(player),
        },
        Commands::SuperTax { player } => Command::SuperTax {
            player: PlayerName::new(player),
        },
        Commands::OutOfJail { player } => Command::OutOfJail {
            player: PlayerName::new(player),
        },
        Commands::Trade {
            seller,
            buyer,
            property,
            price,
        } => {
            let price = match price {
                Some(price) => price,
                None => {
                    let history = load(&cli.state, &catalog)?;
                    query::trade_quote(&history, &catalog, &seller, &property)
                        .with_context(|| format!("{seller} does not hold {property}"))?
                }
            };
            Command::Trade {
                seller: PlayerName::new(seller),
                buyer: PlayerName::new(buyer),
                property: PropertyName::new(property),
                price,
            }
        }
        Commands::Mortgage { player, property } => Command::Mortgage {
            player: PlayerName::new(player),
            property: PropertyName::new(property),
        },
        Commands::Unmortgage { player, property } => Command::Unmortgage {
            player: PlayerName::new(player),
            property: PropertyName::new(property),
        },
        Commands::BuyHouse { player, property } => Command::BuyHouse {
            player: PlayerName::new(player),
            property: PropertyName::new(property),
        },
        Commands::SellHouse { player, property } => Command::SellHouse {
            player: PlayerName::new(player),
            property: PropertyName::new(property),
        },
        Commands::Rent {
            payer,
            property,
            dice,
        } => Command::PayRent {
            payer: PlayerName::new(payer),
            property: PropertyName::new(property),
            dice,
        },
    };

    let mut history = load(&cli.state, &catalog)?;
    let mut events = Vec::new();
    apply(&mut history, &catalog, command, &mut events);
    save(&cli.state, &history)?;
    print!("{}", report::events(&events));
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load(path: &Path, catalog: &PropertyCatalog) -> Result<History> {
    let blob = fs::read_to_string(path).with_context(|| {
        format!(
            "failed to read game state at {}; start one with `monopoly-ledger new`",
            path.display()
        )
    })?;
    restore(catalog, &blob)
        .with_context(|| format!("game state at {} is corrupt", path.display()))
}

fn save(path: &Path, history: &History) -> Result<()> {
    let blob = transfer::encode(history);
    fs::write(path, blob + "\n")
        .with_context(|| format!("failed to write game state at {}", path.display()))?;
    tracing::debug!(path = %path.display(), entries = history.len(), "saved game state");
    Ok(())
}
