//! Property-based invariant tests for the tour run state machine.
//!
//! 1. `is_active()` holds exactly when a tour is set and the index is in bounds.
//! 2. Operations while idle change nothing.
//! 3. A tour id lands in the completed or skipped set only through a finished run.

use std::time::Duration;

use proptest::prelude::*;
use wayfinder_core::Rect;
use wayfinder_tour::testing::{MemoryUi, RecordingPacer};
use wayfinder_tour::{MemoryStore, Tour, TourCatalog, TourEngine, TourStep};

#[derive(Debug, Clone, Copy)]
enum Op {
    Start(usize),
    Next,
    Previous,
    Skip,
    Complete,
    Advance(u64),
    Resize,
    Scroll,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Start),
        Just(Op::Next),
        Just(Op::Next),
        Just(Op::Previous),
        Just(Op::Skip),
        Just(Op::Complete),
        (0u64..1500).prop_map(Op::Advance),
        Just(Op::Resize),
        Just(Op::Scroll),
    ]
}

/// Tours with a mix of resolvable, stalled, and skip-eligible targets.
fn tours() -> Vec<Tour> {
    vec![
        Tour::new("t0", "Visible", "x")
            .step(TourStep::new("a", "A", "t", "c"))
            .step(TourStep::new("b", "B", "t", "c")),
        Tour::new("t1", "Skippy", "x")
            .step(TourStep::new("a", "ghost", "t", "c").skip_if_not_found(true))
            .step(TourStep::new("b", "A", "t", "c"))
            .step(TourStep::new("c", "ghost", "t", "c").skip_if_not_found(true)),
        Tour::new("t2", "Stalls", "x")
            .step(TourStep::new("a", "ghost", "t", "c"))
            .step(TourStep::new("b", "B", "t", "c").wait(50)),
    ]
}

const IDS: [&str; 4] = ["t0", "t1", "t2", "missing"];

proptest! {
    #[test]
    fn active_iff_index_in_bounds(ops in proptest::collection::vec(op(), 0..60)) {
        let ui = MemoryUi::default();
        ui.insert("A", Rect::new(50, 50, 100, 30));
        ui.insert("B", Rect::new(600, 400, 80, 80));
        let mut engine = TourEngine::builder(ui)
            .pacer(RecordingPacer::new())
            .catalog(TourCatalog::with_built_ins(tours(), MemoryStore::new()))
            .build();

        for op in ops {
            let was_active = engine.is_active();
            let finished_before = engine.completed_tours().len() + engine.skipped_tours().len();
            match op {
                Op::Start(i) => {
                    engine.start_tour(IDS[i]);
                }
                Op::Next => {
                    let _ = engine.next_step();
                }
                Op::Previous => engine.previous_step(),
                Op::Skip => engine.skip_tour(),
                Op::Complete => engine.complete_tour(),
                Op::Advance(ms) => engine.advance(Duration::from_millis(ms)),
                Op::Resize => engine.on_viewport_resized(),
                Op::Scroll => engine.on_scrolled(),
            }

            let active = engine.is_active();
            let in_bounds = match (engine.current_tour(), engine.current_step_index()) {
                (Some(tour), Some(index)) => index < tour.steps.len(),
                _ => false,
            };
            prop_assert_eq!(active, in_bounds);
            prop_assert_eq!(active, engine.step_view().is_some());

            let finished_after = engine.completed_tours().len() + engine.skipped_tours().len();
            if !was_active && !matches!(op, Op::Start(_)) {
                prop_assert!(!active);
                prop_assert_eq!(finished_before, finished_after);
            }
            prop_assert!(!engine.completed_tours().contains("missing"));
        }
    }
}
