//! Turning an ambiguous drop gesture into a concrete move intent.
//!
//! Drop coordinates resolve to a container id outside the engine (the
//! `TargetProbe` capability); the resolver only reasons over container
//! ids and the board's display order. It never mutates anything: the
//! caller applies the returned intent, or drops it on `NoOp`.

use serde::{Deserialize, Serialize};

use stow_core::{ItemId, LocationId};

use crate::board::Board;

/// A user-initiated move: an item plus the container the drop resolved
/// to, if any. `target: None` is a gesture that ended outside every
/// container — a cancellation, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveGesture {
    pub item: ItemId,
    pub target: Option<LocationId>,
}

/// The unambiguous move derived from a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMove {
    pub item: ItemId,
    pub from: LocationId,
    pub to: LocationId,
}

/// Terminal outcome of resolution. `NoOp` is a valid answer, not an
/// error: the gesture is abandoned and no update is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Move(ResolvedMove),
    NoOp,
}

impl MoveOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, MoveOutcome::NoOp)
    }
}

/// Spatial lookup capability supplied by the rendering surface: maps a
/// pointer position to the container under it.
pub trait TargetProbe {
    fn container_at(&self, x: f64, y: f64) -> Option<LocationId>;
}

/// Build a gesture from raw pointer coordinates via the injected probe.
pub fn gesture_at<P: TargetProbe>(probe: &P, item: ItemId, x: f64, y: f64) -> MoveGesture {
    MoveGesture {
        item,
        target: probe.container_at(x, y),
    }
}

/// Resolve a gesture against the item's explicit assignment (if any)
/// and the board.
///
/// A drop that lands back on the column the item is assigned to is not
/// taken at face value: the drop geometry is ambiguous, so the nearest
/// different column in display order is tried first. Only when no
/// other column exists does the gesture collapse to `NoOp`.
///
/// An unassigned item is merely displayed in the fallback column, so a
/// drop there is unambiguous: it pins the item to that column.
pub fn resolve_move(
    gesture: &MoveGesture,
    current: Option<LocationId>,
    board: &Board,
) -> MoveOutcome {
    let Some(target) = gesture.target else {
        return MoveOutcome::NoOp;
    };

    let to = if current == Some(target) {
        match board.nearest_other_column(target) {
            Some(other) => other,
            None => return MoveOutcome::NoOp,
        }
    } else {
        target
    };

    let Some(from) = current.or_else(|| board.fallback_column()) else {
        return MoveOutcome::NoOp;
    };

    MoveOutcome::Move(ResolvedMove {
        item: gesture.item,
        from,
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use stow_core::Location;
    use uuid::Uuid;

    fn board_of(names: &[&str]) -> Board {
        let mut containers: Vec<Location> = names.iter().map(|n| Location::new(n)).collect();
        if let Some(first) = containers.first_mut() {
            first.is_default = true;
        }
        Board::build(&[], &containers)
    }

    fn ids(board: &Board) -> Vec<LocationId> {
        board.columns.iter().map(|c| c.location.id).collect()
    }

    #[test]
    fn distinct_target_resolves_directly() {
        let board = board_of(&["Unassigned", "Attic"]);
        let ids = ids(&board);
        let item = Uuid::new_v4();

        let outcome = resolve_move(
            &MoveGesture {
                item,
                target: Some(ids[1]),
            },
            Some(ids[0]),
            &board,
        );
        assert_eq!(
            outcome,
            MoveOutcome::Move(ResolvedMove {
                item,
                from: ids[0],
                to: ids[1],
            })
        );
    }

    #[test]
    fn unassigned_item_drop_on_fallback_pins_it_there() {
        let board = board_of(&["Unassigned", "Attic"]);
        let ids = ids(&board);
        let item = Uuid::new_v4();

        // No explicit assignment: the item is only displayed in the
        // default column, so dropping it there is a plain move, not an
        // ambiguous same-container drop to divert.
        let outcome = resolve_move(
            &MoveGesture {
                item,
                target: Some(ids[0]),
            },
            None,
            &board,
        );
        assert_eq!(
            outcome,
            MoveOutcome::Move(ResolvedMove {
                item,
                from: ids[0],
                to: ids[0],
            })
        );
    }

    #[rstest]
    #[case(0, 1)] // first column: sibling after it
    #[case(1, 2)] // middle column: nearest following
    #[case(2, 1)] // last column: nearest preceding
    fn same_container_drop_diverts_to_nearest_other(#[case] current: usize, #[case] expect: usize) {
        let board = board_of(&["Unassigned", "Attic", "Garage"]);
        let ids = ids(&board);
        let item = Uuid::new_v4();

        let outcome = resolve_move(
            &MoveGesture {
                item,
                target: Some(ids[current]),
            },
            Some(ids[current]),
            &board,
        );
        match outcome {
            MoveOutcome::Move(mv) => {
                assert_eq!(mv.to, ids[expect]);
                assert_ne!(mv.to, mv.from, "must never target the original column");
            }
            MoveOutcome::NoOp => panic!("expected a diverted move"),
        }
    }

    #[test]
    fn same_container_drop_with_single_column_is_noop() {
        let board = board_of(&["Unassigned"]);
        let only = board.columns[0].location.id;

        let outcome = resolve_move(
            &MoveGesture {
                item: Uuid::new_v4(),
                target: Some(only),
            },
            Some(only),
            &board,
        );
        assert!(outcome.is_noop());
    }

    #[test]
    fn gesture_outside_any_container_is_noop() {
        let board = board_of(&["Unassigned", "Attic"]);
        let outcome = resolve_move(
            &MoveGesture {
                item: Uuid::new_v4(),
                target: None,
            },
            Some(board.columns[0].location.id),
            &board,
        );
        assert!(outcome.is_noop());
    }

    struct GridProbe {
        cells: Vec<(f64, LocationId)>,
    }

    impl TargetProbe for GridProbe {
        // Columns are 100 wide, laid out left to right.
        fn container_at(&self, x: f64, _y: f64) -> Option<LocationId> {
            self.cells
                .iter()
                .find(|(left, _)| x >= *left && x < left + 100.0)
                .map(|(_, id)| *id)
        }
    }

    #[test]
    fn probe_feeds_gesture_resolution() {
        let board = board_of(&["Unassigned", "Attic"]);
        let ids = ids(&board);
        let probe = GridProbe {
            cells: vec![(0.0, ids[0]), (100.0, ids[1])],
        };
        let item = Uuid::new_v4();

        let gesture = gesture_at(&probe, item, 150.0, 10.0);
        assert_eq!(gesture.target, Some(ids[1]));

        let cancelled = gesture_at(&probe, item, 500.0, 10.0);
        assert_eq!(cancelled.target, None);
        assert!(resolve_move(&cancelled, Some(ids[0]), &board).is_noop());
    }

    #[test]
    fn resolved_move_serde_round_trip() {
        let mv = MoveOutcome::Move(ResolvedMove {
            item: Uuid::new_v4(),
            from: Uuid::new_v4(),
            to: Uuid::new_v4(),
        });
        let json = serde_json::to_string(&mv).unwrap();
        let back: MoveOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(mv, back);
    }
}
