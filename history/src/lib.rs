#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative history management for the Monopoly ledger.
//!
//! A [`History`] owns every snapshot of one game. Adapters hand it to
//! [`apply`] together with a [`Command`]; the command either moves the
//! pointer, commits a freshly valued snapshot produced by the transaction
//! system, or is reported as ignored. The history is passed around as a
//! value and persisted through [`transfer`], so independent games never
//! share state.

pub mod query;
mod timeline;
pub mod transfer;

use monopoly_ledger_core::{
    BuildingRule, Command, Event, GameSnapshot, Money, PlayerAccount, Roster,
};
use monopoly_ledger_system_catalog::PropertyCatalog;
use monopoly_ledger_system_transactions::{self as transactions, Outcome};
use monopoly_ledger_system_valuation as valuation;

pub use timeline::{History, HistoryEntry, HistoryWindow, Progress, START_DESCRIPTION};
pub use transfer::TransferError;

/// Cash handed to each human player at the start of a game.
pub const STARTING_MONEY: Money = 1500;

/// Total cash in the box: thirty notes of every denomination.
pub const BANK_RESERVE: Money = 30 * (500 + 100 + 50 + 20 + 10 + 5 + 1);

/// Money distribution used to open a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableSetup {
    /// Cash handed to each human player.
    pub starting_money: Money,
    /// Total cash split between the players and the bank.
    pub bank_reserve: Money,
}

impl Default for TableSetup {
    fn default() -> Self {
        Self {
            starting_money: STARTING_MONEY,
            bank_reserve: BANK_RESERVE,
        }
    }
}

/// Opens a game: every human player holds the starting money, the bank holds
/// the remaining reserve and every property, unmortgaged and unbuilt.
#[must_use]
pub fn new_game(catalog: &PropertyCatalog, roster: Roster, setup: TableSetup) -> History {
    let mut snapshot = GameSnapshot::new();
    for human in roster.humans() {
        let _ = snapshot.insert(human.clone(), PlayerAccount::with_money(setup.starting_money));
    }

    let humans = Money::try_from(roster.humans().len()).unwrap_or(Money::MAX);
    let mut bank =
        PlayerAccount::with_money(setup.bank_reserve - humans.saturating_mul(setup.starting_money));
    bank.holdings = catalog
        .iter()
        .map(|definition| (definition.name.clone(), Default::default()))
        .collect();
    let _ = snapshot.insert(roster.bank().clone(), bank);

    valuation::revalue(catalog, &mut snapshot);
    History::new(roster, snapshot)
}

/// Decodes a persisted history and checks it against the catalog.
pub fn restore(catalog: &PropertyCatalog, blob: &str) -> Result<History, TransferError> {
    let history = transfer::decode(blob)?;
    for (index, entry) in history.entries().iter().enumerate() {
        for (_, account) in entry.snapshot().accounts() {
            for (property, holding) in &account.holdings {
                let Some(definition) = catalog.definition(property.as_str()) else {
                    return Err(TransferError::UnknownProperty {
                        index,
                        property: property.clone(),
                    });
                };
                if holding.is_built() && definition.rule != BuildingRule::Normal {
                    return Err(TransferError::InvalidHolding {
                        index,
                        property: property.clone(),
                    });
                }
            }
        }
    }
    Ok(history)
}

/// Applies the provided command to the history.
///
/// Navigation moves the pointer and never commits. Transactions run against
/// a clone of the current snapshot; on success every account is revalued
/// and the clone is committed, otherwise the history is left untouched and
/// [`Event::CommandIgnored`] reports why.
pub fn apply(
    history: &mut History,
    catalog: &PropertyCatalog,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::Backward => step(history, -1, out_events),
        Command::Forward => step(history, 1, out_events),
        Command::Refresh => {}
        Command::Pay {
            payer,
            payee,
            amount,
        } => execute(history, catalog, out_events, |snapshot, roster, _| {
            transactions::pay(snapshot, roster, &payer, &payee, amount)
        }),
        Command::PassGo { player } => {
            execute(history, catalog, out_events, |snapshot, roster, _| {
                transactions::pass_go(snapshot, roster, &player)
            })
        }
        Command::IncomeTax { player } => {
            execute(history, catalog, out_events, |snapshot, roster, _| {
                transactions::income_tax(snapshot, roster, &player)
            })
        }
        Command::SuperTax { player } => {
            execute(history, catalog, out_events, |snapshot, roster, _| {
                transactions::super_tax(snapshot, roster, &player)
            })
        }
        Command::OutOfJail { player } => {
            execute(history, catalog, out_events, |snapshot, roster, _| {
                transactions::out_of_jail(snapshot, roster, &player)
            })
        }
        Command::Trade {
            seller,
            buyer,
            property,
            price,
        } => execute(history, catalog, out_events, |snapshot, _, _| {
            transactions::trade(snapshot, &seller, &buyer, &property, price)
        }),
        Command::Mortgage { player, property } => {
            execute(history, catalog, out_events, |snapshot, roster, catalog| {
                transactions::mortgage(snapshot, roster, catalog, &player, &property)
            })
        }
        Command::Unmortgage { player, property } => {
            execute(history, catalog, out_events, |snapshot, roster, catalog| {
                transactions::unmortgage(snapshot, roster, catalog, &player, &property)
            })
        }
        Command::BuyHouse { player, property } => {
            execute(history, catalog, out_events, |snapshot, roster, catalog| {
                transactions::buy_house(snapshot, roster, catalog, &player, &property)
            })
        }
        Command::SellHouse { player, property } => {
            execute(history, catalog, out_events, |snapshot, roster, catalog| {
                transactions::sell_house(snapshot, roster, catalog, &player, &property)
            })
        }
        Command::PayRent {
            payer,
            property,
            dice,
        } => execute(history, catalog, out_events, |snapshot, _, catalog| {
            transactions::pay_rent(snapshot, catalog, &payer, &property, dice)
        }),
    }
}

fn step(history: &mut History, delta: isize, out_events: &mut Vec<Event>) {
    let from = history.pointer();
    let to = history.move_by(delta);
    if from != to {
        tracing::debug!(from, to, "moved history pointer");
        out_events.push(Event::PointerMoved { from, to });
    }
}

fn execute<F>(
    history: &mut History,
    catalog: &PropertyCatalog,
    out_events: &mut Vec<Event>,
    transaction: F,
) where
    F: FnOnce(&mut GameSnapshot, &Roster, &PropertyCatalog) -> Outcome,
{
    let mut snapshot = history.current().clone();
    match transaction(&mut snapshot, history.roster(), catalog) {
        Ok(description) => {
            valuation::revalue(catalog, &mut snapshot);
            let index = history.commit(snapshot, description.clone());
            tracing::info!(index, %description, "committed ledger entry");
            out_events.push(Event::EntryCommitted { index, description });
        }
        Err(reason) => {
            tracing::debug!(%reason, "command left the ledger unchanged");
            out_events.push(Event::CommandIgnored { reason });
        }
    }
}
