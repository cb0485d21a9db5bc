//! Navigable sequence of committed snapshots.

use monopoly_ledger_core::{GameSnapshot, Money, Roster};
use serde::{Deserialize, Serialize};

/// Description attached to the seed entry of every history.
pub const START_DESCRIPTION: &str = "Start";

/// One committed snapshot together with the change that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub(crate) snapshot: GameSnapshot,
    pub(crate) description: String,
}

impl HistoryEntry {
    /// State of every account after the change.
    #[must_use]
    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    /// Human-readable description of the change.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Position of the pointer within the history.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    /// Share of the history up to and including the pointer, in `(0, 1]`.
    pub fraction: f64,
    /// One-based `"i / n"` label.
    pub label: String,
}

/// Descriptions surrounding the pointer, for bounded display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryWindow<'a> {
    /// Index and description of every entry within the window, in order.
    pub entries: Vec<(usize, &'a str)>,
    /// Index of the current entry.
    pub pointer: usize,
}

/// Linear undo/redo history owning every snapshot of one game.
///
/// The stack is never empty and the pointer always addresses one of its
/// entries. Committing while the pointer is behind the tail discards the
/// entries after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub(crate) roster: Roster,
    pub(crate) pointer: usize,
    pub(crate) stack: Vec<HistoryEntry>,
}

impl History {
    /// Seeds a history with the opening snapshot.
    #[must_use]
    pub fn new(roster: Roster, initial: GameSnapshot) -> Self {
        Self {
            roster,
            pointer: 0,
            stack: vec![HistoryEntry {
                snapshot: initial,
                description: START_DESCRIPTION.to_owned(),
            }],
        }
    }

    /// Participants of the game.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Snapshot at the pointer.
    #[must_use]
    pub fn current(&self) -> &GameSnapshot {
        &self.current_entry().snapshot
    }

    /// Entry at the pointer.
    #[must_use]
    pub fn current_entry(&self) -> &HistoryEntry {
        &self.stack[self.pointer]
    }

    /// All entries in commit order.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.stack
    }

    /// Number of entries, including the seed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Always `false`; a history holds at least its seed entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Index of the current entry.
    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Drops every entry after the pointer, appends the snapshot and moves
    /// the pointer onto it. Returns the new pointer.
    pub fn commit(&mut self, snapshot: GameSnapshot, description: String) -> usize {
        self.stack.truncate(self.pointer + 1);
        self.stack.push(HistoryEntry {
            snapshot,
            description,
        });
        self.pointer += 1;
        self.pointer
    }

    /// Moves the pointer by `delta`, clamped to the stack. Returns the new pointer.
    pub fn move_by(&mut self, delta: isize) -> usize {
        let upper = self.stack.len() - 1;
        self.pointer = self.pointer.saturating_add_signed(delta).min(upper);
        self.pointer
    }

    /// Pointer position as a fraction and a `"i / n"` label.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let position = self.pointer + 1;
        let total = self.stack.len();
        Progress {
            fraction: position as f64 / total as f64,
            label: format!("{position} / {total}"),
        }
    }

    /// Descriptions of the entries within `radius` of the pointer.
    #[must_use]
    pub fn window(&self, radius: usize) -> HistoryWindow<'_> {
        let first = self.pointer.saturating_sub(radius);
        let last = self.pointer.saturating_add(radius);
        let entries = self
            .stack
            .iter()
            .enumerate()
            .filter(|(index, _)| (first..=last).contains(index))
            .map(|(index, entry)| (index, entry.description.as_str()))
            .collect();
        HistoryWindow {
            entries,
            pointer: self.pointer,
        }
    }

    /// Cached total value of the player in every entry, in stack order.
    #[must_use]
    pub fn value_series(&self, player: &str) -> Vec<Money> {
        self.stack
            .iter()
            .filter_map(|entry| entry.snapshot.account(player))
            .map(|account| account.total_value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_ledger_core::{PlayerAccount, PlayerName};

    fn snapshot(money: Money) -> GameSnapshot {
        let mut snapshot = GameSnapshot::new();
        let mut account = PlayerAccount::with_money(money);
        account.total_value = money;
        let _ = snapshot.insert(PlayerName::from("Amelie"), account);
        let _ = snapshot.insert(PlayerName::from("Bank"), PlayerAccount::with_money(0));
        snapshot
    }

    fn history() -> History {
        let roster = Roster::new(vec![PlayerName::from("Amelie")], PlayerName::from("Bank"))
            .expect("valid roster");
        History::new(roster, snapshot(1500))
    }

    #[test]
    fn seeded_history_starts_at_zero() {
        let history = history();
        assert_eq!(history.len(), 1);
        assert_eq!(history.pointer(), 0);
        assert_eq!(history.current_entry().description(), START_DESCRIPTION);
        assert!(!history.is_empty());
    }

    #[test]
    fn progress_is_one_based() {
        let mut history = history();
        let _ = history.commit(snapshot(1400), "a".to_owned());
        let _ = history.commit(snapshot(1300), "b".to_owned());
        let _ = history.commit(snapshot(1200), "c".to_owned());
        let _ = history.move_by(-2);

        let progress = history.progress();
        assert_eq!(progress.label, "2 / 4");
        assert!((progress.fraction - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn window_is_bounded_by_radius() {
        let mut history = history();
        for step in 1..=6 {
            let _ = history.commit(snapshot(1500 - step), format!("step {step}"));
        }
        let _ = history.move_by(-3);

        let window = history.window(1);
        assert_eq!(window.pointer, 3);
        assert_eq!(window.entries, vec![(2, "step 2"), (3, "step 3"), (4, "step 4")]);

        let _ = history.move_by(-10);
        let window = history.window(2);
        assert_eq!(window.entries, vec![(0, "Start"), (1, "step 1"), (2, "step 2")]);
    }

    #[test]
    fn value_series_follows_stack_order() {
        let mut history = history();
        let _ = history.commit(snapshot(1700), "up".to_owned());
        let _ = history.commit(snapshot(900), "down".to_owned());
        assert_eq!(history.value_series("Amelie"), vec![1500, 1700, 900]);
        assert!(history.value_series("Nobody").is_empty());
    }
}
