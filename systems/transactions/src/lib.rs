#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure transaction system implementing every ledger action.
//!
//! Each action receives a snapshot that the caller owns exclusively and
//! either mutates it and returns a description of the change, or returns the
//! [`NoChange`] reason without touching it. All preconditions are checked
//! before the first write. Balances are never checked for sufficient funds.

use std::collections::BTreeMap;

use monopoly_ledger_core::{
    BuildingRule, GameSnapshot, Money, NoChange, Party, PlayerName, PropertyDefinition,
    PropertyHolding, PropertyName, Roster, HOTEL,
};
use monopoly_ledger_system_catalog::PropertyCatalog;

/// Result of a transaction: the description of the change or why nothing happened.
pub type Outcome = Result<String, NoChange>;

/// Payer, payee and amount of one money movement.
type Leg<'a> = (&'a PlayerName, &'a PlayerName, Money);

/// Salary paid by the bank when a player passes GO.
pub const GO_SALARY: Money = 200;
/// Income tax paid to the bank.
pub const INCOME_TAX: Money = 200;
/// Super tax paid to the bank.
pub const SUPER_TAX: Money = 100;
/// Fee paid to the bank to leave jail.
pub const JAIL_FEE: Money = 50;

/// Transfers `amount` from `payer` to `payee`.
///
/// [`Party::Everyone`] fans the payment out over the human players, one
/// transfer of `amount` per player: as payer every human pays the payee, as
/// payee the payer pays every human.
pub fn pay(
    snapshot: &mut GameSnapshot,
    roster: &Roster,
    payer: &Party,
    payee: &Party,
    amount: Money,
) -> Outcome {
    for party in [payer, payee] {
        match party {
            Party::Player(name) => require_participant(snapshot, name)?,
            Party::Everyone => {
                for human in roster.humans() {
                    require_participant(snapshot, human)?;
                }
            }
        }
    }
    if payer == payee {
        return Err(NoChange::SameParty);
    }
    if amount == 0 {
        return Err(NoChange::ZeroAmount);
    }

    let legs: Vec<Leg<'_>> = match (payer, payee) {
        (Party::Everyone, Party::Player(to)) => roster
            .humans()
            .iter()
            .map(|human| (human, to, amount))
            .collect(),
        (Party::Player(from), Party::Everyone) => roster
            .humans()
            .iter()
            .map(|human| (from, human, amount))
            .collect(),
        (Party::Player(from), Party::Player(to)) => vec![(from, to, amount)],
        (Party::Everyone, Party::Everyone) => return Err(NoChange::SameParty),
    };
    transfer(snapshot, &legs)?;

    Ok(format!("{payer} gives {payee} {amount}M$"))
}

/// Pays the GO salary from the bank to the player.
pub fn pass_go(snapshot: &mut GameSnapshot, roster: &Roster, player: &PlayerName) -> Outcome {
    settle_with_bank(snapshot, roster, player, GO_SALARY)?;
    Ok(format!("{player} passes GO"))
}

/// Charges income tax in favour of the bank.
pub fn income_tax(snapshot: &mut GameSnapshot, roster: &Roster, player: &PlayerName) -> Outcome {
    settle_with_bank(snapshot, roster, player, -INCOME_TAX)?;
    Ok(format!("{player} pays Income Tax"))
}

/// Charges super tax in favour of the bank.
pub fn super_tax(snapshot: &mut GameSnapshot, roster: &Roster, player: &PlayerName) -> Outcome {
    settle_with_bank(snapshot, roster, player, -SUPER_TAX)?;
    Ok(format!("{player} pays Super Tax"))
}

/// Charges the jail fee in favour of the bank.
pub fn out_of_jail(snapshot: &mut GameSnapshot, roster: &Roster, player: &PlayerName) -> Outcome {
    settle_with_bank(snapshot, roster, player, -JAIL_FEE)?;
    Ok(format!("{player} gets out of jail"))
}

/// Sells a property from `seller` to `buyer`, carrying its mortgage and
/// house state along.
pub fn trade(
    snapshot: &mut GameSnapshot,
    seller: &PlayerName,
    buyer: &PlayerName,
    property: &PropertyName,
    price: Money,
) -> Outcome {
    require_property_name(property)?;
    require_participant(snapshot, seller)?;
    require_participant(snapshot, buyer)?;
    if seller == buyer {
        return Err(NoChange::SameParty);
    }
    if price == 0 {
        return Err(NoChange::ZeroAmount);
    }
    let moved = holding(snapshot, seller, property)?;

    transfer(snapshot, &[(buyer, seller, price)])?;
    if let Some(account) = snapshot.account_mut(seller.as_str()) {
        let _ = account.holdings.remove(property.as_str());
    }
    if let Some(account) = snapshot.account_mut(buyer.as_str()) {
        let _ = account.holdings.insert(property.clone(), moved);
    }

    Ok(format!("{seller} sells {property} to {buyer} for {price}M$"))
}

/// Mortgages a property whose color group carries no houses; the bank pays
/// half its price.
pub fn mortgage(
    snapshot: &mut GameSnapshot,
    roster: &Roster,
    catalog: &PropertyCatalog,
    player: &PlayerName,
    property: &PropertyName,
) -> Outcome {
    let (definition, current) = owned_property(snapshot, roster, catalog, player, property)?;
    if current.mortgaged {
        return Err(NoChange::AlreadyMortgaged);
    }
    let group_built = snapshot
        .account(player.as_str())
        .is_some_and(|account| catalog.group_has_houses(account, property.as_str()));
    if current.is_built() || group_built {
        return Err(NoChange::HasHouses);
    }

    let proceeds = definition.mortgage_proceeds();
    transfer(snapshot, &[(roster.bank(), player, proceeds)])?;
    update_holding(snapshot, player, property, |holding| holding.mortgaged = true);
    Ok(format!("{player} mortgages {property} for {proceeds}M$"))
}

/// Lifts the mortgage on a property; the player pays the price plus interest.
pub fn unmortgage(
    snapshot: &mut GameSnapshot,
    roster: &Roster,
    catalog: &PropertyCatalog,
    player: &PlayerName,
    property: &PropertyName,
) -> Outcome {
    let (definition, current) = owned_property(snapshot, roster, catalog, player, property)?;
    if !current.mortgaged {
        return Err(NoChange::NotMortgaged);
    }

    let cost = definition.redemption_cost();
    transfer(snapshot, &[(player, roster.bank(), cost)])?;
    update_holding(snapshot, player, property, |holding| holding.mortgaged = false);
    Ok(format!("{player} unmortgages {property} for {cost}M$"))
}

/// Buys one house from the bank; the fifth house is the hotel.
pub fn buy_house(
    snapshot: &mut GameSnapshot,
    roster: &Roster,
    catalog: &PropertyCatalog,
    player: &PlayerName,
    property: &PropertyName,
) -> Outcome {
    let (definition, current) = owned_property(snapshot, roster, catalog, player, property)?;
    if current.houses >= HOTEL {
        return Err(NoChange::FullyBuilt);
    }
    if definition.rule != BuildingRule::Normal || current.mortgaged {
        return Err(NoChange::NotBuildable);
    }

    let price = definition.house_price;
    transfer(snapshot, &[(player, roster.bank(), price)])?;
    update_holding(snapshot, player, property, |holding| holding.houses += 1);
    Ok(format!("{player} buys a house on {property} for {price}M$"))
}

/// Sells one house back to the bank at half its price.
pub fn sell_house(
    snapshot: &mut GameSnapshot,
    roster: &Roster,
    catalog: &PropertyCatalog,
    player: &PlayerName,
    property: &PropertyName,
) -> Outcome {
    let (definition, current) = owned_property(snapshot, roster, catalog, player, property)?;
    if !current.is_built() {
        return Err(NoChange::NoHouses);
    }

    let price = definition.house_price / 2;
    transfer(snapshot, &[(roster.bank(), player, price)])?;
    update_holding(snapshot, player, property, |holding| holding.houses -= 1);
    Ok(format!("{player} sells a house on {property} for {price}M$"))
}

/// Pays the rent due on a property to its owner.
pub fn pay_rent(
    snapshot: &mut GameSnapshot,
    catalog: &PropertyCatalog,
    payer: &PlayerName,
    property: &PropertyName,
    dice: u32,
) -> Outcome {
    require_property_name(property)?;
    require_participant(snapshot, payer)?;
    if !catalog.contains(property.as_str()) {
        return Err(NoChange::UnknownProperty);
    }
    let quote = catalog
        .rent_for(property.as_str(), dice, snapshot)
        .ok_or(NoChange::Unowned)?;
    if &quote.owner == payer || quote.rent == 0 {
        return Err(NoChange::NoRentDue);
    }

    transfer(snapshot, &[(payer, &quote.owner, quote.rent)])?;
    Ok(format!(
        "{payer} pays rent on {property} to {} for {}M$",
        quote.owner, quote.rent
    ))
}

fn require_participant(snapshot: &GameSnapshot, name: &PlayerName) -> Result<(), NoChange> {
    if name.is_blank() {
        Err(NoChange::NotReady)
    } else if snapshot.contains(name.as_str()) {
        Ok(())
    } else {
        Err(NoChange::UnknownParticipant)
    }
}

fn require_property_name(property: &PropertyName) -> Result<(), NoChange> {
    if property.is_blank() {
        Err(NoChange::NotReady)
    } else {
        Ok(())
    }
}

fn holding(
    snapshot: &GameSnapshot,
    player: &PlayerName,
    property: &PropertyName,
) -> Result<PropertyHolding, NoChange> {
    snapshot
        .account(player.as_str())
        .and_then(|account| account.holdings.get(property.as_str()))
        .copied()
        .ok_or(NoChange::NotHeld)
}

fn owned_property<'c>(
    snapshot: &GameSnapshot,
    roster: &Roster,
    catalog: &'c PropertyCatalog,
    player: &PlayerName,
    property: &PropertyName,
) -> Result<(&'c PropertyDefinition, PropertyHolding), NoChange> {
    require_property_name(property)?;
    require_participant(snapshot, player)?;
    require_participant(snapshot, roster.bank())?;
    let definition = catalog
        .definition(property.as_str())
        .ok_or(NoChange::UnknownProperty)?;
    let current = holding(snapshot, player, property)?;
    Ok((definition, current))
}

fn settle_with_bank(
    snapshot: &mut GameSnapshot,
    roster: &Roster,
    player: &PlayerName,
    amount: Money,
) -> Result<(), NoChange> {
    require_participant(snapshot, player)?;
    require_participant(snapshot, roster.bank())?;
    transfer(snapshot, &[(roster.bank(), player, amount)])
}

fn update_holding(
    snapshot: &mut GameSnapshot,
    player: &PlayerName,
    property: &PropertyName,
    change: impl FnOnce(&mut PropertyHolding),
) {
    if let Some(holding) = snapshot
        .account_mut(player.as_str())
        .and_then(|account| account.holdings.get_mut(property.as_str()))
    {
        change(holding);
    }
}

/// Moves money along every leg, or leaves every balance untouched when one
/// of them would overflow.
fn transfer(snapshot: &mut GameSnapshot, legs: &[Leg<'_>]) -> Result<(), NoChange> {
    let mut balances: BTreeMap<&PlayerName, Money> = BTreeMap::new();
    for &(from, to, amount) in legs {
        for (name, delta) in [(from, amount.checked_neg()), (to, Some(amount))] {
            let delta = delta.ok_or(NoChange::AmountOutOfRange)?;
            let balance = match balances.get(name) {
                Some(balance) => *balance,
                None => snapshot
                    .account(name.as_str())
                    .map(|account| account.money)
                    .ok_or(NoChange::UnknownParticipant)?,
            };
            let updated = balance
                .checked_add(delta)
                .ok_or(NoChange::AmountOutOfRange)?;
            let _ = balances.insert(name, updated);
        }
    }

    for (name, balance) in balances {
        if let Some(account) = snapshot.account_mut(name.as_str()) {
            account.money = balance;
        }
    }
    Ok(())
}
