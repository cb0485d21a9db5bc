//! Property data of the standard London board.

use monopoly_ledger_core::{BuildingRule, ColorGroup, Money, PropertyDefinition, PropertyName};

struct Row {
    name: &'static str,
    price: Money,
    color: &'static str,
    rule: BuildingRule,
    rent: Money,
    houses: [Money; 5],
    house_price: Money,
}

const fn street(
    name: &'static str,
    price: Money,
    color: &'static str,
    rent: Money,
    houses: [Money; 5],
    house_price: Money,
) -> Row {
    Row {
        name,
        price,
        color,
        rule: BuildingRule::Normal,
        rent,
        houses,
        house_price,
    }
}

const fn station(name: &'static str) -> Row {
    Row {
        name,
        price: 200,
        color: "Black",
        rule: BuildingRule::Station,
        rent: 25,
        houses: [0; 5],
        house_price: 0,
    }
}

const fn utility(name: &'static str) -> Row {
    Row {
        name,
        price: 150,
        color: "Gray",
        rule: BuildingRule::Utility,
        rent: 0,
        houses: [0; 5],
        house_price: 0,
    }
}

const BOARD: [Row; 28] = [
    street("Old Kent Road", 60, "Brown", 2, [10, 30, 90, 160, 250], 50),
    street("Whitechapel Road", 60, "Brown", 4, [20, 60, 180, 320, 450], 50),
    station("King's Cross Station"),
    street("The Angel Islington", 100, "Light Blue", 6, [30, 90, 270, 400, 550], 50),
    street("Euston Road", 100, "Light Blue", 6, [30, 90, 270, 400, 550], 50),
    street("Pentonville Road", 120, "Light Blue", 8, [40, 100, 300, 450, 600], 50),
    street("Pall Mall", 140, "Pink", 10, [50, 150, 450, 625, 750], 100),
    utility("Electric Company"),
    street("Whitehall", 140, "Pink", 10, [50, 150, 450, 625, 750], 100),
    street("Northumberland Avenue", 160, "Pink", 12, [60, 180, 500, 700, 900], 100),
    station("Marylebone Station"),
    street("Bow Street", 180, "Orange", 14, [70, 200, 550, 750, 950], 100),
    street("Marlborough Street", 180, "Orange", 14, [70, 200, 550, 750, 950], 100),
    street("Vine Street", 200, "Orange", 16, [80, 220, 600, 800, 1000], 100),
    street("Strand", 220, "Red", 18, [90, 250, 700, 875, 1050], 150),
    street("Fleet Street", 220, "Red", 18, [90, 250, 700, 875, 1050], 150),
    street("Trafalgar Square", 240, "Red", 20, [100, 300, 750, 925, 1100], 150),
    station("Fenchurch St Station"),
    street("Leicester Square", 260, "Yellow", 22, [110, 330, 800, 975, 1150], 150),
    street("Coventry Street", 260, "Yellow", 22, [110, 330, 800, 975, 1150], 150),
    utility("Water Works"),
    street("Piccadilly", 280, "Yellow", 24, [120, 360, 850, 1025, 1200], 150),
    street("Regent Street", 300, "Green", 26, [130, 390, 900, 1100, 1275], 200),
    street("Oxford Street", 300, "Green", 26, [130, 390, 900, 1100, 1275], 200),
    street("Bond Street", 320, "Green", 28, [150, 450, 1000, 1200, 1400], 200),
    station("Liverpool St Station"),
    street("Park Lane", 350, "Dark Blue", 35, [175, 500, 1100, 1300, 1500], 200),
    street("Mayfair", 400, "Dark Blue", 50, [200, 600, 1400, 1700, 2000], 200),
];

/// Definitions of every property on the standard board, in board order.
pub(crate) fn definitions() -> Vec<PropertyDefinition> {
    BOARD
        .iter()
        .map(|row| PropertyDefinition {
            name: PropertyName::new(row.name),
            price: row.price,
            color: ColorGroup::new(row.color),
            rule: row.rule,
            rent: row.rent,
            rent_tiers: row.houses,
            house_price: row.house_price,
        })
        .collect()
}
