#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Monopoly ledger.
//!
//! This crate defines the data model and the message surface that connects
//! adapters, the authoritative history, and pure systems. Adapters submit
//! [`Command`] values describing desired ledger changes, the history executes
//! them via its `apply` entry point, and reports the outcome as [`Event`]
//! values. Systems operate on [`GameSnapshot`] values and never hold state of
//! their own.

use std::{borrow::Borrow, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amount of money expressed in whole M$. Balances may go negative.
pub type Money = i64;

/// Number of houses that represents a hotel.
pub const HOTEL: u8 = 5;

/// Reserved party name that addresses every human player at once.
pub const ALL_PLAYERS: &str = "ALL";

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps the provided string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrows the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Reports whether the name is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

name_type!(
    /// Name of a participant: a human player or the bank.
    PlayerName
);

name_type!(
    /// Name of a property; the catalog key.
    PropertyName
);

name_type!(
    /// Color group shared by properties that form a set.
    ColorGroup
);

/// Property category that selects the rent formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingRule {
    /// Street that doubles rent for a full set and accepts houses.
    Normal,
    /// Station whose rent scales with the number of stations owned.
    Station,
    /// Utility whose rent is a multiple of the dice value.
    Utility,
}

/// Immutable description of a property as loaded from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Catalog key of the property.
    pub name: PropertyName,
    /// Purchase price.
    pub price: Money,
    /// Color group the property belongs to.
    pub color: ColorGroup,
    /// Rent formula applied to the property.
    pub rule: BuildingRule,
    /// Rent charged without houses.
    pub rent: Money,
    /// Rent charged with one to four houses and with a hotel.
    #[serde(rename = "houses", default)]
    pub rent_tiers: [Money; 5],
    /// Cost of a single house.
    #[serde(default)]
    pub house_price: Money,
}

impl PropertyDefinition {
    /// Value of the property for the given holding; mortgaged properties
    /// are worth 45% of the price.
    #[must_use]
    pub fn value(&self, holding: &PropertyHolding) -> Money {
        if holding.mortgaged {
            self.price.saturating_mul(45) / 100
        } else {
            self.price
        }
    }

    /// Money received when the property is mortgaged.
    #[must_use]
    pub fn mortgage_proceeds(&self) -> Money {
        self.price / 2
    }

    /// Money paid to lift the mortgage, including 10% interest.
    #[must_use]
    pub fn redemption_cost(&self) -> Money {
        self.price.saturating_mul(11) / 20
    }

    /// Rent tier for the provided number of houses, if any are built.
    #[must_use]
    pub fn rent_with_houses(&self, houses: u8) -> Option<Money> {
        match houses {
            0 => None,
            count => self.rent_tiers.get(usize::from(count) - 1).copied(),
        }
    }
}

/// Mutable per-owner state of a single property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyHolding {
    /// Whether the property is currently mortgaged.
    #[serde(rename = "mortgage")]
    pub mortgaged: bool,
    /// Houses built on the property; [`HOTEL`] stands for a hotel.
    pub houses: u8,
}

impl PropertyHolding {
    /// Reports whether any house or a hotel stands on the property.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.houses > 0
    }
}

/// Money and properties held by one participant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAccount {
    /// Cash balance.
    pub money: Money,
    /// Properties held, keyed by name.
    #[serde(rename = "properties")]
    pub holdings: BTreeMap<PropertyName, PropertyHolding>,
    /// Net worth cached when the snapshot was committed.
    pub total_value: Money,
}

impl PlayerAccount {
    /// Creates an account holding only cash.
    #[must_use]
    pub fn with_money(money: Money) -> Self {
        Self {
            money,
            ..Self::default()
        }
    }

    /// Reports whether the account holds the named property.
    #[must_use]
    pub fn holds(&self, property: &str) -> bool {
        self.holdings.contains_key(property)
    }
}

/// Full state of every account at one point in history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameSnapshot {
    accounts: BTreeMap<PlayerName, PlayerAccount>,
}

impl GameSnapshot {
    /// Creates a snapshot without any accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account, returning the previous one.
    pub fn insert(&mut self, name: PlayerName, account: PlayerAccount) -> Option<PlayerAccount> {
        self.accounts.insert(name, account)
    }

    /// Account of the named participant.
    #[must_use]
    pub fn account(&self, name: &str) -> Option<&PlayerAccount> {
        self.accounts.get(name)
    }

    /// Mutable account of the named participant.
    pub fn account_mut(&mut self, name: &str) -> Option<&mut PlayerAccount> {
        self.accounts.get_mut(name)
    }

    /// Reports whether the named participant has an account.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Iterator over all accounts in name order.
    pub fn accounts(&self) -> impl Iterator<Item = (&PlayerName, &PlayerAccount)> {
        self.accounts.iter()
    }

    /// Mutable iterator over all accounts in name order.
    pub fn accounts_mut(&mut self) -> impl Iterator<Item = (&PlayerName, &mut PlayerAccount)> {
        self.accounts.iter_mut()
    }

    /// First participant whose holdings contain the property.
    #[must_use]
    pub fn owner_of(&self, property: &str) -> Option<&PlayerName> {
        self.accounts
            .iter()
            .find(|(_, account)| account.holds(property))
            .map(|(name, _)| name)
    }
}

/// Human players and the bank taking part in one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    humans: Vec<PlayerName>,
    bank: PlayerName,
}

impl Roster {
    /// Creates a validated roster.
    pub fn new(humans: Vec<PlayerName>, bank: PlayerName) -> Result<Self, RosterError> {
        let roster = Self { humans, bank };
        roster.validate()?;
        Ok(roster)
    }

    /// Checks the roster invariants; used after deserialisation.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.humans.is_empty() {
            return Err(RosterError::NoPlayers);
        }
        let mut seen = Vec::with_capacity(self.humans.len());
        for name in self.participants() {
            if name.is_blank() {
                return Err(RosterError::BlankName);
            }
            if name.as_str() == ALL_PLAYERS {
                return Err(RosterError::ReservedName);
            }
            if seen.contains(&name) {
                return Err(RosterError::DuplicateParticipant(name.clone()));
            }
            seen.push(name);
        }
        Ok(())
    }

    /// Human players in seating order.
    #[must_use]
    pub fn humans(&self) -> &[PlayerName] {
        &self.humans
    }

    /// Participant acting as the bank.
    #[must_use]
    pub const fn bank(&self) -> &PlayerName {
        &self.bank
    }

    /// Human players followed by the bank.
    pub fn participants(&self) -> impl Iterator<Item = &PlayerName> {
        self.humans.iter().chain(std::iter::once(&self.bank))
    }

    /// Reports whether the name belongs to a human player.
    #[must_use]
    pub fn is_human(&self, name: &str) -> bool {
        self.humans.iter().any(|human| human.as_str() == name)
    }
}

/// Reasons a roster is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RosterError {
    /// No human players were listed.
    #[error("at least one human player is required")]
    NoPlayers,
    /// A participant name was empty.
    #[error("participant names must not be blank")]
    BlankName,
    /// A participant used the reserved `ALL` name.
    #[error("`ALL` is reserved and cannot name a participant")]
    ReservedName,
    /// The same name appeared twice, possibly as both a player and the bank.
    #[error("participant `{0}` is listed more than once")]
    DuplicateParticipant(PlayerName),
}

/// Side of a payment: a single participant or every human player.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Party {
    /// A single named participant.
    Player(PlayerName),
    /// Every human player, one transfer each.
    Everyone,
}

impl Party {
    /// Interprets [`ALL_PLAYERS`] as [`Party::Everyone`] and anything else as a name.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == ALL_PLAYERS {
            Self::Everyone
        } else {
            Self::Player(PlayerName::new(value))
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(name) => write!(f, "{name}"),
            Self::Everyone => f.write_str(ALL_PLAYERS),
        }
    }
}

/// Commands that express all permissible ledger changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Steps the history pointer one entry back.
    Backward,
    /// Steps the history pointer one entry forward.
    Forward,
    /// Re-reads the current state without changing anything.
    Refresh,
    /// Transfers money between two parties.
    Pay {
        /// Party handing over the money.
        payer: Party,
        /// Party receiving the money.
        payee: Party,
        /// Amount transferred per transfer.
        amount: Money,
    },
    /// Pays the GO salary from the bank.
    PassGo {
        /// Player passing GO.
        player: PlayerName,
    },
    /// Charges income tax in favour of the bank.
    IncomeTax {
        /// Player paying the tax.
        player: PlayerName,
    },
    /// Charges super tax in favour of the bank.
    SuperTax {
        /// Player paying the tax.
        player: PlayerName,
    },
    /// Charges the fee for leaving jail.
    OutOfJail {
        /// Player leaving jail.
        player: PlayerName,
    },
    /// Sells a property from one participant to another.
    Trade {
        /// Current holder of the property.
        seller: PlayerName,
        /// Participant acquiring the property.
        buyer: PlayerName,
        /// Property changing hands.
        property: PropertyName,
        /// Agreed price.
        price: Money,
    },
    /// Mortgages a property with the bank.
    Mortgage {
        /// Holder of the property.
        player: PlayerName,
        /// Property to mortgage.
        property: PropertyName,
    },
    /// Lifts the mortgage on a property.
    Unmortgage {
        /// Holder of the property.
        player: PlayerName,
        /// Property to redeem.
        property: PropertyName,
    },
    /// Builds one house on a property.
    BuyHouse {
        /// Holder of the property.
        player: PlayerName,
        /// Property receiving the house.
        property: PropertyName,
    },
    /// Sells one house on a property back to the bank.
    SellHouse {
        /// Holder of the property.
        player: PlayerName,
        /// Property losing the house.
        property: PropertyName,
    },
    /// Pays rent to the owner of a property.
    PayRent {
        /// Player landing on the property.
        payer: PlayerName,
        /// Property landed on.
        property: PropertyName,
        /// Dice total rolled to get there.
        dice: u32,
    },
}

/// Events reported by the history after processing a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new snapshot was committed to the history.
    EntryCommitted {
        /// Index of the committed entry.
        index: usize,
        /// Human-readable description of the change.
        description: String,
    },
    /// The history pointer moved to another entry.
    PointerMoved {
        /// Pointer before the move.
        from: usize,
        /// Pointer after the move.
        to: usize,
    },
    /// The command was valid input but changed nothing.
    CommandIgnored {
        /// Precondition that was not met.
        reason: NoChange,
    },
}

/// Reasons a transaction leaves the ledger unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoChange {
    /// A required participant or property was not supplied.
    NotReady,
    /// A participant named in the command has no account.
    UnknownParticipant,
    /// The property is not part of the catalog.
    UnknownProperty,
    /// Both sides of the transfer are the same party.
    SameParty,
    /// The amount or price is zero.
    ZeroAmount,
    /// The participant does not hold the property.
    NotHeld,
    /// The property is already mortgaged.
    AlreadyMortgaged,
    /// The property is not mortgaged.
    NotMortgaged,
    /// Houses stand on the property.
    HasHouses,
    /// The property already carries a hotel.
    FullyBuilt,
    /// No houses stand on the property.
    NoHouses,
    /// Houses cannot be built on this property in its current state.
    NotBuildable,
    /// Nobody owns the property.
    Unowned,
    /// No rent is due: the payer owns the property or the rent is zero.
    NoRentDue,
    /// Applying the amount would overflow a balance.
    AmountOutOfRange,
}

impl fmt::Display for NoChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotReady => "required input is missing",
            Self::UnknownParticipant => "participant is not part of the game",
            Self::UnknownProperty => "property is not in the catalog",
            Self::SameParty => "payer and payee are the same",
            Self::ZeroAmount => "amount is zero",
            Self::NotHeld => "property is not held by that participant",
            Self::AlreadyMortgaged => "property is already mortgaged",
            Self::NotMortgaged => "property is not mortgaged",
            Self::HasHouses => "property has houses",
            Self::FullyBuilt => "property already has a hotel",
            Self::NoHouses => "property has no houses",
            Self::NotBuildable => "houses cannot be built on that property",
            Self::Unowned => "property has no owner",
            Self::NoRentDue => "no rent is due",
            Self::AmountOutOfRange => "amount does not fit in a balance",
        };
        f.write_str(text)
    }
}
