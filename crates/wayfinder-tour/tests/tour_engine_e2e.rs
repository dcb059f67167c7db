//! End-to-end tour runs against the in-memory host doubles.

use std::time::Duration;

use wayfinder_core::{Rect, Size};
use wayfinder_tour::builtin::{ATTENDANCE_TOUR_ID, ONBOARDING_TOUR_ID};
use wayfinder_tour::store::{COMPLETED_TOURS_KEY, FileStore, KeyValueStore};
use wayfinder_tour::testing::{MemoryUi, NavCall, RecordingNavigator, RecordingPacer, UiCall};
use wayfinder_tour::{
    KvProgressStore, MemoryStore, StepAction, StepView, TooltipPosition, Tour, TourCatalog,
    TourConfig, TourEngine, TourEvent, TourStep,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn catalog(tours: Vec<Tour>) -> TourCatalog {
    TourCatalog::with_built_ins(tours, MemoryStore::new())
}

/// Step 0 resolves; step 1 is skip-eligible, never resolves, and carries a
/// long `wait` that must never run.
#[test]
fn resolved_then_unresolvable_last_step_auto_completes() {
    let tour = Tour::new("e2e", "E2E", "Two steps.")
        .step(TourStep::new("first", "A", "First", "Resolves."))
        .step(
            TourStep::new("second", "B", "Second", "Never resolves.")
                .wait(5000)
                .skip_if_not_found(true),
        );
    let ui = MemoryUi::new(Size::new(1000, 600));
    ui.insert("A", Rect::new(400, 100, 100, 50));
    let pacer = RecordingPacer::new();
    let store = MemoryStore::new();

    let mut engine = TourEngine::builder(ui.clone())
        .pacer(pacer.clone())
        .progress(KvProgressStore::new(store.clone()))
        .catalog(catalog(vec![tour]))
        .build();

    assert!(engine.start_tour("e2e"));
    assert_eq!(
        engine.step_view(),
        Some(StepView::Visible {
            anchor: Rect::new(400, 100, 100, 50),
            tooltip: TooltipPosition { top: 174, left: 290 },
        })
    );

    engine.next_step().expect("none action");
    assert_eq!(engine.current_step_index(), Some(1));
    assert_eq!(
        engine.step_view(),
        Some(StepView::AwaitingSkip { deadline: ms(1000) })
    );

    engine.advance(ms(500));
    assert!(engine.is_active());
    engine.advance(ms(500));

    assert!(!engine.is_active());
    assert_eq!(engine.current_step_index(), None);
    assert!(engine.is_completed("e2e"));
    assert!(store.get(COMPLETED_TOURS_KEY).expect("get").is_some());
    assert!(
        pacer.pauses().iter().all(|p| *p < ms(1000)),
        "wait action must not run: {:?}",
        pacer.pauses()
    );

    let events = engine.drain_events();
    assert_eq!(
        events.last(),
        Some(&TourEvent::Completed {
            tour_id: "e2e".into()
        })
    );
    assert!(events.contains(&TourEvent::StepAutoSkipped {
        tour_id: "e2e".into(),
        index: 1,
        step_id: "second".into(),
    }));
}

#[test]
fn consecutive_unresolvable_steps_each_wait_their_grace() {
    let tour = Tour::new("chain", "Chain", "x")
        .step(TourStep::new("a", "ghost-1", "t", "c").skip_if_not_found(true))
        .step(TourStep::new("b", "ghost-2", "t", "c").skip_if_not_found(true))
        .step(TourStep::new("c", "ghost-3", "t", "c").skip_if_not_found(true));
    let mut engine = TourEngine::builder(MemoryUi::default())
        .pacer(RecordingPacer::new())
        .catalog(catalog(vec![tour]))
        .build();

    engine.start_tour("chain");
    engine.advance(ms(1000));
    assert_eq!(engine.current_step_index(), Some(1));
    engine.advance(ms(1000));
    assert_eq!(engine.current_step_index(), Some(2));
    engine.advance(ms(999));
    assert!(engine.is_active());
    engine.advance(ms(1));
    assert!(engine.is_completed("chain"));
}

#[test]
fn actions_run_in_order_with_paced_affordances() {
    let tour = Tour::new("actions", "Actions", "x")
        .step(TourStep::new("menu", "menu", "Menu", "Click it.").action(StepAction::Click, "menu"))
        .step(
            TourStep::new("go", "menu", "Go", "Navigate.")
                .action(StepAction::Navigate, "reports"),
        )
        .step(TourStep::new("list", "list", "List", "Scroll.").action(StepAction::Scroll, "list"))
        .step(TourStep::new("pause", "list", "Pause", "Wait.").wait(250));
    let ui = MemoryUi::default();
    let menu = ui.insert("menu", Rect::new(10, 10, 80, 20));
    let list = ui.insert("list", Rect::new(10, 900, 400, 300));
    let nav = RecordingNavigator::new();
    let pacer = RecordingPacer::new();

    let mut engine = TourEngine::builder(ui.clone())
        .navigator(nav.clone())
        .pacer(pacer.clone())
        .catalog(catalog(vec![tour]))
        .build();
    engine.start_tour("actions");
    pacer.clear();

    for _ in 0..4 {
        engine.next_step().expect("action");
    }

    assert!(!engine.is_active());
    assert!(ui.calls().contains(&UiCall::Click(menu)));
    assert!(
        ui.calls()
            .iter()
            .filter(|c| **c == UiCall::Scroll(list))
            .count()
            >= 1
    );
    assert_eq!(nav.navigations(), vec!["reports".to_owned()]);
    assert_eq!(
        pacer.pauses(),
        vec![ms(100), ms(100), ms(150), ms(200), ms(250), ms(150)]
    );
    assert!(!nav.is_dimmed());
}

#[test]
fn failed_click_can_be_retried_or_skipped() {
    let tour = Tour::new("retry", "Retry", "x")
        .step(TourStep::new("save", "save", "Save", "Click.").action(StepAction::Click, "save"))
        .step(TourStep::new("done", "save", "Done", "Finished."));
    let ui = MemoryUi::default();
    let save = ui.insert("save", Rect::new(0, 0, 40, 20));
    ui.fail_clicks_on(save);

    let mut engine = TourEngine::builder(ui.clone())
        .pacer(RecordingPacer::new())
        .catalog(catalog(vec![tour]))
        .build();
    engine.start_tour("retry");

    let err = engine.next_step().expect_err("click rejected");
    assert_eq!(err.action, StepAction::Click);
    assert_eq!(engine.current_step_index(), Some(0));
    assert!(engine.next_step().is_err());
    assert_eq!(engine.current_step_index(), Some(0));

    engine.skip_tour();
    assert!(engine.is_skipped("retry"));
}

#[test]
fn built_in_onboarding_runs_against_host_views() {
    let ui = MemoryUi::default();
    for target in ["app-header", "nav-dashboard", "nav-trainings", "trainings-search"] {
        ui.insert(target, Rect::new(20, 20, 120, 32));
    }
    let nav = RecordingNavigator::new().with_current_view("dashboard");
    let mut engine = TourEngine::builder(ui)
        .navigator(nav.clone())
        .pacer(RecordingPacer::new())
        .build();

    assert!(engine.available_tours().iter().any(|t| t.id == ATTENDANCE_TOUR_ID));
    assert!(engine.start_tour(ONBOARDING_TOUR_ID));
    for _ in 0..4 {
        engine.next_step().expect("next");
    }
    assert_eq!(engine.progress_label().as_deref(), Some("5 of 5"));
    assert!(matches!(
        engine.step_view(),
        Some(StepView::AwaitingSkip { .. })
    ));
    engine.advance(ms(1000));
    assert!(engine.is_completed(ONBOARDING_TOUR_ID));
    assert!(nav.calls().contains(&NavCall::Navigate("trainings".into())));
}

#[test]
fn progress_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tour = Tour::new("persist", "Persist", "x").step(TourStep::new("a", "A", "t", "c"));
    let ui = MemoryUi::default();
    ui.insert("A", Rect::new(0, 0, 10, 10));

    {
        let store = FileStore::open(dir.path()).expect("open");
        let mut engine = TourEngine::builder(ui.clone())
            .pacer(RecordingPacer::new())
            .progress(KvProgressStore::new(store))
            .catalog(catalog(vec![tour.clone()]))
            .build();
        engine.start_tour("persist");
        engine.next_step().expect("next");
        assert!(engine.is_completed("persist"));
    }

    let store = FileStore::open(dir.path()).expect("reopen");
    let engine = TourEngine::builder(ui)
        .pacer(RecordingPacer::new())
        .progress(KvProgressStore::new(store))
        .catalog(catalog(vec![tour]))
        .build();
    assert!(engine.is_completed("persist"));
}

#[test]
fn config_controls_grace_period() {
    let config = TourConfig::from_toml_str(
        r#"
        [timing]
        auto_skip_grace_ms = 250
        "#,
    )
    .expect("config");
    let tour = Tour::new("g", "Grace", "x")
        .step(TourStep::new("a", "ghost", "t", "c").skip_if_not_found(true));
    let mut engine = TourEngine::builder(MemoryUi::default())
        .pacer(RecordingPacer::new())
        .config(config)
        .catalog(catalog(vec![tour]))
        .build();

    engine.start_tour("g");
    engine.advance(ms(250));
    assert!(engine.is_completed("g"));
}
