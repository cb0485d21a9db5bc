//! Query functions that provide read-only, display-ready views of the
//! current entry.

use monopoly_ledger_core::{Money, PlayerAccount, PlayerName, PropertyHolding, PropertyName};
use monopoly_ledger_system_catalog::{DisplayStyle, PropertyCatalog, RentQuote};

use crate::History;

/// Holding of one property as shown in a participant's column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoldingView {
    /// Property held.
    pub property: PropertyName,
    /// Mortgage and house state.
    pub holding: PropertyHolding,
    /// Display hints, absent for properties missing from the catalog.
    pub style: Option<DisplayStyle>,
}

/// Money, net worth and holdings of one participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standing {
    /// Participant described.
    pub name: PlayerName,
    /// Cash balance.
    pub money: Money,
    /// Net worth cached with the entry.
    pub total_value: Money,
    /// Holdings sorted by ascending price.
    pub holdings: Vec<HoldingView>,
}

/// Which mortgage actions are currently possible for a holding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MortgageOptions {
    /// The holding can be mortgaged.
    pub can_mortgage: bool,
    /// The mortgage on the holding can be lifted.
    pub can_unmortgage: bool,
}

/// Standings of the human players followed by the bank.
#[must_use]
pub fn standings(history: &History, catalog: &PropertyCatalog) -> Vec<Standing> {
    let snapshot = history.current();
    history
        .roster()
        .participants()
        .filter_map(|name| {
            let account = snapshot.account(name.as_str())?;
            let holdings = catalog
                .sorted_by_price(account.holdings.keys())
                .into_iter()
                .filter_map(|property| {
                    let holding = *account.holdings.get(property.as_str())?;
                    Some(HoldingView {
                        property: property.clone(),
                        holding,
                        style: catalog.display_style(property.as_str(), &holding),
                    })
                })
                .collect();
            Some(Standing {
                name: name.clone(),
                money: account.money,
                total_value: account.total_value,
                holdings,
            })
        })
        .collect()
}

/// Properties the player may sell or mortgage, cheapest first.
#[must_use]
pub fn tradable(history: &History, catalog: &PropertyCatalog, player: &str) -> Vec<PropertyName> {
    with_account(history, player, |account| {
        let holdings = catalog.tradable_holdings(account);
        sorted(catalog, holdings.keys())
    })
}

/// Properties the player may build on, cheapest first.
#[must_use]
pub fn buildable(history: &History, catalog: &PropertyCatalog, player: &str) -> Vec<PropertyName> {
    with_account(history, player, |account| {
        let holdings = catalog.buildable_holdings(account);
        sorted(catalog, holdings.keys())
    })
}

/// Properties on which the payer could owe rent to another human player,
/// cheapest first.
#[must_use]
pub fn rent_eligible(
    history: &History,
    catalog: &PropertyCatalog,
    payer: &str,
) -> Vec<PropertyName> {
    let holdings =
        catalog.rent_eligible_holdings(payer, history.roster().humans(), history.current());
    sorted(catalog, holdings.keys())
}

/// Rent due on the property for the dice total, if anyone owns it.
#[must_use]
pub fn rent_quote(
    history: &History,
    catalog: &PropertyCatalog,
    property: &str,
    dice: u32,
) -> Option<RentQuote> {
    catalog.rent_for(property, dice, history.current())
}

/// Suggested trade price: the catalog value of the seller's holding.
#[must_use]
pub fn trade_quote(
    history: &History,
    catalog: &PropertyCatalog,
    seller: &str,
    property: &str,
) -> Option<Money> {
    let holding = history
        .current()
        .account(seller)?
        .holdings
        .get(property)?;
    catalog.value_of(property, holding)
}

/// Mortgage actions available for the player's holding of the property.
/// Mortgaging needs the whole color group to be free of houses.
#[must_use]
pub fn mortgage_options(
    history: &History,
    catalog: &PropertyCatalog,
    player: &str,
    property: &str,
) -> MortgageOptions {
    let Some(account) = history.current().account(player) else {
        return MortgageOptions::default();
    };
    match account.holdings.get(property) {
        Some(holding) => MortgageOptions {
            can_mortgage: !holding.mortgaged
                && catalog.contains(property)
                && !catalog.group_has_houses(account, property),
            can_unmortgage: holding.mortgaged,
        },
        None => MortgageOptions::default(),
    }
}

fn with_account(
    history: &History,
    player: &str,
    view: impl FnOnce(&PlayerAccount) -> Vec<PropertyName>,
) -> Vec<PropertyName> {
    history.current().account(player).map(view).unwrap_or_default()
}

fn sorted<'a>(
    catalog: &PropertyCatalog,
    names: impl IntoIterator<Item = &'a PropertyName>,
) -> Vec<PropertyName> {
    catalog
        .sorted_by_price(names)
        .into_iter()
        .cloned()
        .collect()
}
