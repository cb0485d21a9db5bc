#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure valuation system that derives each participant's net worth.

use monopoly_ledger_core::{GameSnapshot, Money, PlayerAccount};
use monopoly_ledger_system_catalog::PropertyCatalog;

/// Net worth of an account: cash plus the value of every holding and half
/// the cost of the houses standing on it.
///
/// Holdings missing from the catalog contribute nothing. The sum saturates
/// at the bounds of [`Money`].
#[must_use]
pub fn total_value(catalog: &PropertyCatalog, account: &PlayerAccount) -> Money {
    account
        .holdings
        .iter()
        .filter_map(|(name, holding)| {
            let definition = catalog.definition(name.as_str())?;
            let buildings = Money::from(holding.houses).saturating_mul(definition.house_price) / 2;
            Some(definition.value(holding).saturating_add(buildings))
        })
        .fold(account.money, Money::saturating_add)
}

/// Recomputes and caches the total value of every account in the snapshot.
pub fn revalue(catalog: &PropertyCatalog, snapshot: &mut GameSnapshot) {
    for (_, account) in snapshot.accounts_mut() {
        account.total_value = total_value(catalog, account);
    }
}
