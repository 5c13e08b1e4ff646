//! Planning for journal reconciliation.
//!
//! A debit repays the oldest remembered credits first. The planner walks the
//! visible window with a running remainder and stops at the first entry the
//! debit cannot fully absorb; everything newer stays untouched. Planning is
//! pure so the walk can be tested without a store.

use tally_models::JournalEntry;

/// One write the reconciliation walk decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalAction {
    /// The entry was fully repaid and goes away.
    Delete(i32),
    /// The entry was partially repaid and keeps the remainder.
    SetAmount {
        /// Entry to rewrite
        id: i32,
        /// Remaining not-yet-repaid amount
        amount: i64,
    },
}

/// Plan the journal writes for a debit.
///
/// `oldest_first` is the visible window ordered oldest entry first; `delta`
/// is the negative delta being applied. Entries whose amounts the debit
/// swallows whole are deleted; the first entry with something left over is
/// rewritten to the remainder and ends the walk.
///
/// The walk only ever sees the visible window. A debit larger than the
/// window's sum empties the journal and the excess is forgotten.
pub fn consume_plan(oldest_first: &[JournalEntry], delta: i64) -> Vec<JournalAction> {
    let mut actions = Vec::new();
    let mut remaining = delta;
    for entry in oldest_first {
        remaining += entry.amount;
        if remaining < 0 {
            actions.push(JournalAction::Delete(entry.id));
        } else if remaining == 0 {
            actions.push(JournalAction::Delete(entry.id));
            break;
        } else {
            actions.push(JournalAction::SetAmount {
                id: entry.id,
                amount: remaining,
            });
            break;
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn entry(id: i32, amount: i64, description: &str) -> JournalEntry {
        JournalEntry {
            id,
            player_id: 1,
            amount,
            description: description.to_string(),
            recorded_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn partial_repayment_rewrites_the_first_surviving_entry() {
        let window = [entry(1, 10_000, "Trash-AFK"), entry(2, 60_000, "Boss reset fail :(")];

        let plan = consume_plan(&window, -30_000);

        assert_eq!(
            plan,
            vec![
                JournalAction::Delete(1),
                JournalAction::SetAmount {
                    id: 2,
                    amount: 40_000
                },
            ]
        );
    }

    #[test]
    fn walk_stops_before_newer_entries() {
        let window = [
            entry(1, 10_000, "wipe"),
            entry(2, 60_000, "repair bill"),
            entry(3, 5_000, "late"),
        ];

        let plan = consume_plan(&window, -30_000);

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan[1],
            JournalAction::SetAmount {
                id: 2,
                amount: 40_000
            }
        );
    }

    #[test]
    fn exact_repayment_deletes_without_rewrites() {
        let window = [entry(1, 10_000, "wipe"), entry(2, 20_000, "repair bill")];

        let plan = consume_plan(&window, -30_000);

        assert_eq!(
            plan,
            vec![JournalAction::Delete(1), JournalAction::Delete(2)]
        );
    }

    #[test]
    fn oversized_debit_empties_the_window() {
        let window = [entry(1, 1_000, "wipe"), entry(2, 2_000, "late")];

        let plan = consume_plan(&window, -50_000);

        assert_eq!(
            plan,
            vec![JournalAction::Delete(1), JournalAction::Delete(2)]
        );
    }

    #[test]
    fn empty_window_plans_nothing() {
        assert!(consume_plan(&[], -10_000).is_empty());
    }

    #[test]
    fn small_debit_touches_only_the_oldest_entry() {
        let window = [entry(1, 10_000, "wipe"), entry(2, 20_000, "late")];

        let plan = consume_plan(&window, -4_000);

        assert_eq!(
            plan,
            vec![JournalAction::SetAmount {
                id: 1,
                amount: 6_000
            }]
        );
    }
}
