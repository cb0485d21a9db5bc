//! Plain-text rendering of ledger state for the terminal.

use std::fmt::Write as _;

use monopoly_ledger_core::{Event, PropertyHolding, HOTEL};
use monopoly_ledger_history::{query, History};
use monopoly_ledger_system_catalog::PropertyCatalog;

/// Current entry, every participant's column and their holdings.
pub(crate) fn standings(history: &History, catalog: &PropertyCatalog) -> String {
    let progress = history.progress();
    let mut out = format!(
        "[{}] {}\n",
        progress.label,
        history.current_entry().description()
    );
    for standing in query::standings(history, catalog) {
        let _ = writeln!(
            out,
            "{:<12} {:>6}M$  worth {:>6}M$",
            standing.name, standing.money, standing.total_value
        );
        for view in standing.holdings {
            let group = view
                .style
                .map(|style| style.background)
                .unwrap_or_else(|| "?".to_owned());
            let _ = writeln!(
                out,
                "    {:<24} {:<10} {}",
                view.property,
                group,
                holding_state(&view.holding)
            );
        }
    }
    out
}

/// Descriptions around the pointer, the current entry marked with `>`.
pub(crate) fn timeline(history: &History, radius: usize) -> String {
    let window = history.window(radius);
    let mut out = String::new();
    for (index, description) in window.entries {
        let marker = if index == window.pointer { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} {:>4}  {description}", index + 1);
    }
    out
}

/// Net worth of the player at every entry.
pub(crate) fn values(history: &History, player: &str) -> String {
    let mut out = String::new();
    for (index, value) in history.value_series(player).into_iter().enumerate() {
        let _ = writeln!(out, "{:>4}  {value}M$", index + 1);
    }
    out
}

/// One line per event produced by a command.
pub(crate) fn events(events: &[Event]) -> String {
    let mut out = String::new();
    for event in events {
        let _ = match event {
            Event::EntryCommitted { index, description } => {
                writeln!(out, "recorded #{}: {description}", index + 1)
            }
            Event::PointerMoved { from, to } => {
                writeln!(out, "moved from #{} to #{}", from + 1, to + 1)
            }
            Event::CommandIgnored { reason } => writeln!(out, "nothing changed: {reason}"),
        };
    }
    out
}

fn holding_state(holding: &PropertyHolding) -> String {
    match (holding.mortgaged, holding.houses) {
        (true, _) => "mortgaged".to_owned(),
        (false, 0) => String::new(),
        (false, HOTEL) => "hotel".to_owned(),
        (false, 1) => "1 house".to_owned(),
        (false, houses) => format!("{houses} houses"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_ledger_core::{Command, NoChange, PlayerName, PropertyName, Roster};
    use monopoly_ledger_history::{apply, new_game, TableSetup};

    fn game() -> (History, PropertyCatalog) {
        let catalog = PropertyCatalog::standard();
        let roster = Roster::new(
            vec![PlayerName::from("Amelie"), PlayerName::from("Sofia")],
            PlayerName::from("Bank"),
        )
        .expect("valid roster");
        (new_game(&catalog, roster, TableSetup::default()), catalog)
    }

    #[test]
    fn standings_list_every_participant() {
        let (mut history, catalog) = game();
        let mut events = Vec::new();
        apply(
            &mut history,
            &catalog,
            Command::Trade {
                seller: PlayerName::from("Bank"),
                buyer: PlayerName::from("Sofia"),
                property: PropertyName::from("Strand"),
                price: 220,
            },
            &mut events,
        );

        let text = standings(&history, &catalog);
        assert!(text.starts_with("[2 / 2] Bank sells Strand to Sofia for 220M$"));
        assert!(text.contains("Amelie"));
        assert!(text.contains("Sofia"));
        let bank_line = text
            .lines()
            .position(|line| line.starts_with("Bank"))
            .expect("bank column is shown");
        let strand_line = text
            .lines()
            .position(|line| line.contains("Strand") && line.starts_with("    "))
            .expect("Sofia's holding is shown");
        assert!(strand_line < bank_line, "players come before the bank");
    }

    #[test]
    fn timeline_marks_the_pointer() {
        let (history, _) = game();
        assert_eq!(timeline(&history, 3), ">    1  Start\n");
    }

    #[test]
    fn events_are_numbered_from_one() {
        let text = events(&[
            Event::EntryCommitted {
                index: 1,
                description: "Sofia passes GO".to_owned(),
            },
            Event::PointerMoved { from: 1, to: 0 },
            Event::CommandIgnored {
                reason: NoChange::NotHeld,
            },
        ]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "recorded #2: Sofia passes GO");
        assert_eq!(lines[1], "moved from #2 to #1");
        assert!(lines[2].starts_with("nothing changed: "));
    }

    #[test]
    fn holding_state_names_buildings() {
        let built = |houses| PropertyHolding {
            mortgaged: false,
            houses,
        };
        assert_eq!(holding_state(&built(0)), "");
        assert_eq!(holding_state(&built(1)), "1 house");
        assert_eq!(holding_state(&built(3)), "3 houses");
        assert_eq!(holding_state(&built(HOTEL)), "hotel");
        assert_eq!(
            holding_state(&PropertyHolding {
                mortgaged: true,
                houses: 0
            }),
            "mortgaged"
        );
    }
}
