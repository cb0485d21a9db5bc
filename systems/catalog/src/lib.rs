#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure property-rules system: static property definitions and the queries
//! that derive prices, eligibility and rent from them.
//!
//! The catalog is loaded once and shared read-only for the lifetime of the
//! process. Every query takes the account or snapshot it inspects as an
//! argument, so the catalog itself never observes game state.

mod standard;

use std::collections::{BTreeMap, HashMap, HashSet};

use monopoly_ledger_core::{
    BuildingRule, ColorGroup, GameSnapshot, Money, PlayerAccount, PlayerName, PropertyDefinition,
    PropertyHolding, PropertyName,
};
use serde::Deserialize;
use thiserror::Error;

/// Station rent multipliers indexed by the number of stations owned minus one.
const STATION_RENT: [Money; 4] = [1, 2, 4, 8];

/// Utility dice multipliers indexed by the number of utilities owned minus one.
const UTILITY_RENT: [Money; 2] = [4, 10];

/// Color groups whose labels are drawn in white.
const LIGHT_FOREGROUND: [&str; 3] = ["Brown", "Dark Blue", "Black"];

/// Rent owed for landing on a property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RentQuote {
    /// Participant collecting the rent.
    pub owner: PlayerName,
    /// Amount due.
    pub rent: Money,
}

/// Display hints for rendering a holding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayStyle {
    /// Background color name, derived from the color group.
    pub background: String,
    /// Foreground color name that stays legible on the background.
    pub foreground: &'static str,
    /// Whether the holding should be drawn faded because it is mortgaged.
    pub faded: bool,
}

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be parsed.
    #[error("could not parse property catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// The catalog contained no properties.
    #[error("property catalog is empty")]
    Empty,
    /// A property name appeared more than once.
    #[error("property `{0}` is defined more than once")]
    Duplicate(PropertyName),
    /// A station or utility declared house prices or house rents.
    #[error("property `{0}` declares houses but only streets can be built on")]
    UnexpectedBuildings(PropertyName),
    /// A property declared a negative price or rent.
    #[error("property `{0}` declares a negative amount")]
    NegativeAmount(PropertyName),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "property")]
    properties: Vec<PropertyDefinition>,
}

/// Immutable set of property definitions with derived group sizes.
#[derive(Clone, Debug)]
pub struct PropertyCatalog {
    definitions: Vec<PropertyDefinition>,
    positions: HashMap<PropertyName, usize>,
    group_sizes: HashMap<ColorGroup, usize>,
}

impl PropertyCatalog {
    /// Catalog of the standard London board.
    #[must_use]
    pub fn standard() -> Self {
        Self::index(standard::definitions())
    }

    /// Builds a catalog from definitions, preserving their order.
    pub fn from_definitions(definitions: Vec<PropertyDefinition>) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(definitions.len());
        for definition in &definitions {
            if !seen.insert(&definition.name) {
                return Err(CatalogError::Duplicate(definition.name.clone()));
            }
            if definition.price < 0
                || definition.rent < 0
                || definition.house_price < 0
                || definition.rent_tiers.iter().any(|rent| *rent < 0)
            {
                return Err(CatalogError::NegativeAmount(definition.name.clone()));
            }
            let declares_buildings =
                definition.house_price != 0 || definition.rent_tiers.iter().any(|rent| *rent != 0);
            if definition.rule != BuildingRule::Normal && declares_buildings {
                return Err(CatalogError::UnexpectedBuildings(definition.name.clone()));
            }
        }

        Ok(Self::index(definitions))
    }

    /// Parses a catalog from `[[property]]` TOML tables.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::from_definitions(file.properties)
    }

    fn index(definitions: Vec<PropertyDefinition>) -> Self {
        let positions = definitions
            .iter()
            .enumerate()
            .map(|(position, definition)| (definition.name.clone(), position))
            .collect();
        let mut group_sizes = HashMap::new();
        for definition in &definitions {
            *group_sizes.entry(definition.color.clone()).or_insert(0) += 1;
        }
        Self {
            definitions,
            positions,
            group_sizes,
        }
    }

    /// Definition of the named property.
    #[must_use]
    pub fn definition(&self, property: &str) -> Option<&PropertyDefinition> {
        self.positions
            .get(property)
            .map(|position| &self.definitions[*position])
    }

    /// Reports whether the catalog defines the named property.
    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.positions.contains_key(property)
    }

    /// All definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.definitions.iter()
    }

    /// Number of properties in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Reports whether the catalog is empty. Catalogs built through the
    /// public constructors never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Current value of a holding: the price, or 45% of it when mortgaged.
    #[must_use]
    pub fn value_of(&self, property: &str, holding: &PropertyHolding) -> Option<Money> {
        self.definition(property)
            .map(|definition| definition.value(holding))
    }

    /// Money raised by mortgaging the property.
    #[must_use]
    pub fn mortgage_proceeds(&self, property: &str) -> Option<Money> {
        self.definition(property)
            .map(PropertyDefinition::mortgage_proceeds)
    }

    /// Money required to lift the mortgage on the property.
    #[must_use]
    pub fn redemption_cost(&self, property: &str) -> Option<Money> {
        self.definition(property)
            .map(PropertyDefinition::redemption_cost)
    }

    /// Price of one house on the property.
    #[must_use]
    pub fn house_price(&self, property: &str) -> Option<Money> {
        self.definition(property)
            .map(|definition| definition.house_price)
    }

    /// Number of catalog properties sharing the color group.
    #[must_use]
    pub fn group_size(&self, color: &ColorGroup) -> usize {
        self.group_sizes.get(color).copied().unwrap_or(0)
    }

    /// Reports whether any holding of the account in the property's color
    /// group carries houses. Unknown properties report `false`.
    #[must_use]
    pub fn group_has_houses(&self, account: &PlayerAccount, property: &str) -> bool {
        let Some(color) = self.definition(property).map(|definition| &definition.color) else {
            return false;
        };
        account.holdings.iter().any(|(name, holding)| {
            holding.is_built()
                && self
                    .definition(name.as_str())
                    .is_some_and(|definition| &definition.color == color)
        })
    }

    /// Holdings that may be sold or mortgaged: those whose color group has no
    /// houses anywhere in the account.
    #[must_use]
    pub fn tradable_holdings(
        &self,
        account: &PlayerAccount,
    ) -> BTreeMap<PropertyName, PropertyHolding> {
        account
            .holdings
            .iter()
            .filter(|(name, _)| {
                self.contains(name.as_str()) && !self.group_has_houses(account, name.as_str())
            })
            .map(|(name, holding)| (name.clone(), *holding))
            .collect()
    }

    /// Street holdings in color groups of which the account holds every
    /// member, none of them mortgaged.
    #[must_use]
    pub fn buildable_holdings(
        &self,
        account: &PlayerAccount,
    ) -> BTreeMap<PropertyName, PropertyHolding> {
        let mut owned: HashMap<&ColorGroup, usize> = HashMap::new();
        for (name, holding) in &account.holdings {
            let Some(definition) = self.definition(name.as_str()) else {
                continue;
            };
            if definition.rule == BuildingRule::Normal && !holding.mortgaged {
                *owned.entry(&definition.color).or_insert(0) += 1;
            }
        }

        account
            .holdings
            .iter()
            .filter(|(name, _)| {
                self.definition(name.as_str()).is_some_and(|definition| {
                    let group = &definition.color;
                    owned.get(group).copied() == Some(self.group_size(group))
                })
            })
            .map(|(name, holding)| (name.clone(), *holding))
            .collect()
    }

    /// Orders property names by ascending price; equal prices keep catalog
    /// order and unknown names sort last.
    #[must_use]
    pub fn sorted_by_price<'a, I>(&self, names: I) -> Vec<&'a PropertyName>
    where
        I: IntoIterator<Item = &'a PropertyName>,
    {
        let mut sorted: Vec<&PropertyName> = names.into_iter().collect();
        sorted.sort_by_key(|name| match self.positions.get(name.as_str()) {
            Some(position) => (0, self.definitions[*position].price, *position),
            None => (1, 0, 0),
        });
        sorted
    }

    /// Unmortgaged holdings of every listed player except `excluded`.
    #[must_use]
    pub fn rent_eligible_holdings(
        &self,
        excluded: &str,
        players: &[PlayerName],
        snapshot: &GameSnapshot,
    ) -> BTreeMap<PropertyName, PropertyHolding> {
        players
            .iter()
            .filter(|player| player.as_str() != excluded)
            .filter_map(|player| snapshot.account(player.as_str()))
            .flat_map(|account| account.holdings.iter())
            .filter(|(_, holding)| !holding.mortgaged)
            .map(|(name, holding)| (name.clone(), *holding))
            .collect()
    }

    /// Rent due for landing on the property with the given dice total.
    ///
    /// Returns `None` when the property is unknown or nobody holds it.
    #[must_use]
    pub fn rent_for(
        &self,
        property: &str,
        dice: u32,
        snapshot: &GameSnapshot,
    ) -> Option<RentQuote> {
        let definition = self.definition(property)?;
        let owner = snapshot.owner_of(property)?;
        let account = snapshot.account(owner.as_str())?;
        let holding = account.holdings.get(property)?;

        let rent = if holding.mortgaged {
            0
        } else if let Some(rent) = definition.rent_with_houses(holding.houses) {
            rent
        } else {
            let owned = account
                .holdings
                .keys()
                .filter_map(|name| self.definition(name.as_str()))
                .filter(|other| other.color == definition.color)
                .count();
            match definition.rule {
                BuildingRule::Normal if owned == self.group_size(&definition.color) => {
                    definition.rent.saturating_mul(2)
                }
                BuildingRule::Normal => definition.rent,
                BuildingRule::Station => {
                    definition.rent.saturating_mul(multiplier(&STATION_RENT, owned))
                }
                BuildingRule::Utility => Money::from(dice) * multiplier(&UTILITY_RENT, owned),
            }
        };

        Some(RentQuote {
            owner: owner.clone(),
            rent,
        })
    }

    /// Display hints for a holding of the named property.
    #[must_use]
    pub fn display_style(
        &self,
        property: &str,
        holding: &PropertyHolding,
    ) -> Option<DisplayStyle> {
        let definition = self.definition(property)?;
        let group = definition.color.as_str();
        let foreground = if LIGHT_FOREGROUND.contains(&group) {
            "white"
        } else {
            "black"
        };
        Some(DisplayStyle {
            background: group.replace(' ', ""),
            foreground,
            faded: holding.mortgaged,
        })
    }
}

fn multiplier(table: &[Money], owned: usize) -> Money {
    let index = owned.saturating_sub(1).min(table.len() - 1);
    table[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_ledger_core::HOTEL;

    fn holding(mortgaged: bool, houses: u8) -> PropertyHolding {
        PropertyHolding { mortgaged, houses }
    }

    fn account(money: Money, holdings: &[(&str, PropertyHolding)]) -> PlayerAccount {
        let mut account = PlayerAccount::with_money(money);
        for (name, holding) in holdings {
            let _ = account.holdings.insert(PropertyName::from(*name), *holding);
        }
        account
    }

    fn snapshot(accounts: Vec<(&str, PlayerAccount)>) -> GameSnapshot {
        let mut snapshot = GameSnapshot::new();
        for (name, account) in accounts {
            let _ = snapshot.insert(PlayerName::from(name), account);
        }
        snapshot
    }

    #[test]
    fn standard_board_has_expected_groups() {
        let catalog = PropertyCatalog::standard();
        assert_eq!(catalog.len(), 28);
        assert_eq!(catalog.group_size(&ColorGroup::from("Brown")), 2);
        assert_eq!(catalog.group_size(&ColorGroup::from("Light Blue")), 3);
        assert_eq!(catalog.group_size(&ColorGroup::from("Dark Blue")), 2);
        assert_eq!(catalog.group_size(&ColorGroup::from("Black")), 4);
        assert_eq!(catalog.group_size(&ColorGroup::from("Gray")), 2);
        assert_eq!(catalog.group_size(&ColorGroup::from("Purple")), 0);
    }

    #[test]
    fn pricing_queries_use_floor_division() {
        let catalog = PropertyCatalog::standard();
        assert_eq!(catalog.mortgage_proceeds("Park Lane"), Some(175));
        assert_eq!(catalog.redemption_cost("Park Lane"), Some(192));
        assert_eq!(catalog.value_of("Park Lane", &holding(true, 0)), Some(157));
        assert_eq!(catalog.value_of("Park Lane", &holding(false, 0)), Some(350));
        assert_eq!(catalog.house_price("Park Lane"), Some(200));
        assert_eq!(catalog.value_of("Baker Street", &holding(false, 0)), None);
    }

    #[test]
    fn built_group_is_not_tradable() {
        let catalog = PropertyCatalog::standard();
        let account = account(
            0,
            &[
                ("Old Kent Road", holding(false, 1)),
                ("Whitechapel Road", holding(false, 0)),
                ("Strand", holding(true, 0)),
            ],
        );

        let tradable = catalog.tradable_holdings(&account);
        let names: Vec<&str> = tradable.keys().map(PropertyName::as_str).collect();
        assert_eq!(names, vec!["Strand"]);
    }

    #[test]
    fn buildable_requires_complete_unmortgaged_group() {
        let catalog = PropertyCatalog::standard();
        let complete = account(
            0,
            &[
                ("Park Lane", holding(false, 0)),
                ("Mayfair", holding(false, 2)),
                ("King's Cross Station", holding(false, 0)),
                ("Marylebone Station", holding(false, 0)),
                ("Fenchurch St Station", holding(false, 0)),
                ("Liverpool St Station", holding(false, 0)),
            ],
        );
        let buildable = catalog.buildable_holdings(&complete);
        let names: Vec<&str> = buildable.keys().map(PropertyName::as_str).collect();
        assert_eq!(names, vec!["Mayfair", "Park Lane"]);

        let mortgaged = account(
            0,
            &[
                ("Park Lane", holding(true, 0)),
                ("Mayfair", holding(false, 0)),
            ],
        );
        assert!(catalog.buildable_holdings(&mortgaged).is_empty());
    }

    #[test]
    fn sorting_is_stable_on_catalog_order() {
        let catalog = PropertyCatalog::standard();
        let names = [
            PropertyName::from("Mayfair"),
            PropertyName::from("Euston Road"),
            PropertyName::from("Unknown Lane"),
            PropertyName::from("The Angel Islington"),
            PropertyName::from("Old Kent Road"),
        ];
        let sorted: Vec<&str> = catalog
            .sorted_by_price(names.iter())
            .into_iter()
            .map(PropertyName::as_str)
            .collect();
        assert_eq!(
            sorted,
            vec![
                "Old Kent Road",
                "The Angel Islington",
                "Euston Road",
                "Mayfair",
                "Unknown Lane"
            ]
        );
    }

    #[test]
    fn rent_eligible_skips_excluded_and_mortgaged() {
        let catalog = PropertyCatalog::standard();
        let state = snapshot(vec![
            ("Amelie", account(0, &[("Strand", holding(false, 0))])),
            (
                "Sofia",
                account(
                    0,
                    &[
                        ("Mayfair", holding(false, 0)),
                        ("Park Lane", holding(true, 0)),
                    ],
                ),
            ),
            ("Bank", account(0, &[("Bond Street", holding(false, 0))])),
        ]);
        let players = [PlayerName::from("Amelie"), PlayerName::from("Sofia")];

        let eligible = catalog.rent_eligible_holdings("Amelie", &players, &state);
        let names: Vec<&str> = eligible.keys().map(PropertyName::as_str).collect();
        assert_eq!(names, vec!["Mayfair"]);
    }

    #[test]
    fn full_street_group_doubles_base_rent() {
        let catalog = PropertyCatalog::standard();
        let state = snapshot(vec![(
            "X",
            account(
                0,
                &[
                    ("Park Lane", holding(false, 0)),
                    ("Mayfair", holding(false, 0)),
                ],
            ),
        )]);

        let quote = catalog.rent_for("Park Lane", 7, &state).expect("owned");
        assert_eq!(quote.owner, PlayerName::from("X"));
        assert_eq!(quote.rent, 70);
    }

    #[test]
    fn partial_group_charges_base_rent() {
        let catalog = PropertyCatalog::standard();
        let state = snapshot(vec![("X", account(0, &[("Park Lane", holding(false, 0))]))]);
        assert_eq!(catalog.rent_for("Park Lane", 7, &state).map(|q| q.rent), Some(35));
    }

    #[test]
    fn houses_select_rent_tier() {
        let catalog = PropertyCatalog::standard();
        let state = snapshot(vec![(
            "X",
            account(
                0,
                &[
                    ("Park Lane", holding(false, 2)),
                    ("Mayfair", holding(false, HOTEL)),
                ],
            ),
        )]);
        assert_eq!(catalog.rent_for("Park Lane", 7, &state).map(|q| q.rent), Some(500));
        assert_eq!(catalog.rent_for("Mayfair", 7, &state).map(|q| q.rent), Some(2000));
    }

    #[test]
    fn mortgaged_property_charges_nothing() {
        let catalog = PropertyCatalog::standard();
        let state = snapshot(vec![("X", account(0, &[("Strand", holding(true, 0))]))]);
        assert_eq!(catalog.rent_for("Strand", 7, &state).map(|q| q.rent), Some(0));
    }

    #[test]
    fn station_rent_scales_with_count() {
        let catalog = PropertyCatalog::standard();
        let stations = [
            "King's Cross Station",
            "Marylebone Station",
            "Fenchurch St Station",
            "Liverpool St Station",
        ];
        for (count, expected) in [(1, 25), (2, 50), (3, 100), (4, 200)] {
            let holdings: Vec<(&str, PropertyHolding)> = stations[..count]
                .iter()
                .map(|name| (*name, holding(false, 0)))
                .collect();
            let state = snapshot(vec![("X", account(0, &holdings))]);
            let quote = catalog.rent_for("King's Cross Station", 4, &state);
            assert_eq!(quote.map(|q| q.rent), Some(expected), "{count} stations");
        }
    }

    #[test]
    fn utility_rent_multiplies_dice() {
        let catalog = PropertyCatalog::standard();
        let one = snapshot(vec![("X", account(0, &[("Water Works", holding(false, 0))]))]);
        assert_eq!(catalog.rent_for("Water Works", 7, &one).map(|q| q.rent), Some(28));

        let both = snapshot(vec![(
            "X",
            account(
                0,
                &[
                    ("Water Works", holding(false, 0)),
                    ("Electric Company", holding(false, 0)),
                ],
            ),
        )]);
        assert_eq!(catalog.rent_for("Water Works", 7, &both).map(|q| q.rent), Some(70));
    }

    #[test]
    fn unowned_property_has_no_quote() {
        let catalog = PropertyCatalog::standard();
        let state = snapshot(vec![("X", account(0, &[]))]);
        assert_eq!(catalog.rent_for("Strand", 7, &state), None);
    }

    #[test]
    fn display_style_tracks_group_and_mortgage() {
        let catalog = PropertyCatalog::standard();
        let style = catalog
            .display_style("Park Lane", &holding(true, 0))
            .expect("known property");
        assert_eq!(style.background, "DarkBlue");
        assert_eq!(style.foreground, "white");
        assert!(style.faded);

        let style = catalog
            .display_style("Piccadilly", &holding(false, 0))
            .expect("known property");
        assert_eq!(style.background, "Yellow");
        assert_eq!(style.foreground, "black");
        assert!(!style.faded);
    }

    #[test]
    fn toml_catalog_loads_in_order() {
        let catalog = PropertyCatalog::from_toml_str(
            r#"
            [[property]]
            name = "Baltic Avenue"
            price = 60
            color = "Brown"
            rule = "Normal"
            rent = 4
            houses = [20, 60, 180, 320, 450]
            house_price = 50

            [[property]]
            name = "Reading Railroad"
            price = 200
            color = "Black"
            rule = "Station"
            rent = 25
            "#,
        )
        .expect("catalog parses");

        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Baltic Avenue", "Reading Railroad"]);
        assert_eq!(catalog.house_price("Reading Railroad"), Some(0));
    }

    #[test]
    fn toml_catalog_rejects_invalid_definitions() {
        let duplicate = r#"
            [[property]]
            name = "Strand"
            price = 220
            color = "Red"
            rule = "Normal"
            rent = 18

            [[property]]
            name = "Strand"
            price = 220
            color = "Red"
            rule = "Normal"
            rent = 18
        "#;
        assert!(matches!(
            PropertyCatalog::from_toml_str(duplicate),
            Err(CatalogError::Duplicate(name)) if name.as_str() == "Strand"
        ));

        let built_station = r#"
            [[property]]
            name = "Marylebone Station"
            price = 200
            color = "Black"
            rule = "Station"
            rent = 25
            house_price = 100
        "#;
        assert!(matches!(
            PropertyCatalog::from_toml_str(built_station),
            Err(CatalogError::UnexpectedBuildings(_))
        ));

        assert!(matches!(
            PropertyCatalog::from_toml_str("property = []"),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            PropertyCatalog::from_toml_str("property = 3"),
            Err(CatalogError::Parse(_))
        ));
    }
}
