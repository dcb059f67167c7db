#![forbid(unsafe_code)]

//! Execution of a step's side effect.
//!
//! | action     | effect                                                            |
//! |------------|-------------------------------------------------------------------|
//! | `none`     | nothing                                                           |
//! | `click`    | pressed marker, pause, click, pause, marker removed               |
//! | `navigate` | dim, navigate to `actionTarget`, pause, undim                     |
//! | `wait`     | pause for `min(waitTime, wait_cap)`                               |
//! | `scroll`   | scroll the target into centered view, pause while it settles      |
//!
//! # Failure Modes
//!
//! - Target not found: the action degrades to a no-op and reports
//!   [`ActionOutcome::TargetNotFound`]. The caller already decided skip policy.
//! - Click or navigation rejected by the host: a [`TourError`] is returned
//!   after visual state (pressed marker, dim) has been restored.

use crate::config::TimingConfig;
use crate::error::TourError;
use crate::model::{StepAction, TourStep};
use crate::pacer::Pacer;
use crate::resolver::ElementResolver;
use crate::ui::{LiveUi, Marker, Navigator, ScrollAlign};

/// What an executed action actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The side effect was carried out.
    Performed,
    /// `none` action.
    Noop,
    /// The action's target could not be resolved.
    TargetNotFound,
    /// A `navigate` step without a destination view.
    MissingDestination,
    /// A `navigate` step while no navigator is attached.
    NoNavigator,
}

/// Borrowed collaborators for a single action.
pub struct ActionContext<'a> {
    pub ui: &'a mut dyn LiveUi,
    pub resolver: &'a mut ElementResolver,
    pub navigator: Option<&'a mut dyn Navigator>,
    pub pacer: &'a mut dyn Pacer,
}

#[derive(Debug, Clone, Default)]
pub struct StepActionExecutor {
    timing: TimingConfig,
}

impl StepActionExecutor {
    #[must_use]
    pub fn new(timing: TimingConfig) -> Self {
        Self { timing }
    }

    #[must_use]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Run `step`'s action to completion.
    pub fn execute(
        &self,
        step: &TourStep,
        cx: ActionContext<'_>,
    ) -> Result<ActionOutcome, TourError> {
        tracing::debug!(step = %step.id, action = %step.action, "executing step action");
        match step.action {
            StepAction::None => Ok(ActionOutcome::Noop),
            StepAction::Wait => {
                cx.pacer.pause(self.timing.capped_wait(step.wait_time));
                Ok(ActionOutcome::Performed)
            }
            StepAction::Click => self.click(step, cx),
            StepAction::Navigate => self.navigate(step, cx),
            StepAction::Scroll => self.scroll(step, cx),
        }
    }

    fn click(&self, step: &TourStep, cx: ActionContext<'_>) -> Result<ActionOutcome, TourError> {
        let target = element_target(step);
        let Some(resolved) = cx.resolver.resolve(&*cx.ui, target) else {
            tracing::debug!(step = %step.id, target_id = target, "click target not found");
            return Ok(ActionOutcome::TargetNotFound);
        };

        let node = resolved.node;
        cx.ui.set_marker(node, Marker::Pressed, true);
        cx.pacer.pause(self.timing.press_delay());
        let clicked = cx.ui.click(node);
        if clicked.is_ok() {
            cx.pacer.pause(self.timing.press_delay());
        }
        cx.ui.set_marker(node, Marker::Pressed, false);

        clicked.map_err(|source| TourError {
            step_id: step.id.clone(),
            action: StepAction::Click,
            source,
        })?;
        Ok(ActionOutcome::Performed)
    }

    fn navigate(&self, step: &TourStep, cx: ActionContext<'_>) -> Result<ActionOutcome, TourError> {
        let Some(view) = step.action_target.as_deref().filter(|v| !v.trim().is_empty()) else {
            tracing::warn!(step = %step.id, "navigate action has no destination view");
            return Ok(ActionOutcome::MissingDestination);
        };
        let Some(navigator) = cx.navigator else {
            tracing::warn!(step = %step.id, view, "navigate action without a navigator");
            return Ok(ActionOutcome::NoNavigator);
        };

        navigator.set_dimmed(true);
        let navigated = navigator.navigate_to(view);
        if navigated.is_ok() {
            cx.pacer.pause(self.timing.navigate_dim());
        }
        navigator.set_dimmed(false);

        navigated.map_err(|source| TourError {
            step_id: step.id.clone(),
            action: StepAction::Navigate,
            source,
        })?;
        Ok(ActionOutcome::Performed)
    }

    fn scroll(&self, step: &TourStep, cx: ActionContext<'_>) -> Result<ActionOutcome, TourError> {
        let target = element_target(step);
        let Some(resolved) = cx.resolver.resolve(&*cx.ui, target) else {
            tracing::debug!(step = %step.id, target_id = target, "scroll target not found");
            return Ok(ActionOutcome::TargetNotFound);
        };
        cx.ui.scroll_into_view(resolved.node, ScrollAlign::Center);
        cx.pacer.pause(self.timing.scroll_settle());
        Ok(ActionOutcome::Performed)
    }
}

/// `actionTarget` when present, otherwise the step's own target.
fn element_target(step: &TourStep) -> &str {
    step.action_target
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&step.target)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wayfinder_core::Rect;

    use super::*;
    use crate::testing::{MemoryUi, NavCall, RecordingNavigator, RecordingPacer, UiCall};

    struct Rig {
        ui: MemoryUi,
        resolver: ElementResolver,
        nav: RecordingNavigator,
        pacer: RecordingPacer,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                ui: MemoryUi::default(),
                resolver: ElementResolver::new(),
                nav: RecordingNavigator::new(),
                pacer: RecordingPacer::new(),
            }
        }

        fn run(&mut self, step: &TourStep, with_nav: bool) -> Result<ActionOutcome, TourError> {
            let executor = StepActionExecutor::default();
            let navigator = if with_nav {
                Some(&mut self.nav as &mut dyn Navigator)
            } else {
                None
            };
            let cx = ActionContext {
                ui: &mut self.ui,
                resolver: &mut self.resolver,
                navigator,
                pacer: &mut self.pacer,
            };
            executor.execute(step, cx)
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn none_is_noop() {
        let mut rig = Rig::new();
        let step = TourStep::new("s", "t", "x", "y");
        assert_eq!(rig.run(&step, true), Ok(ActionOutcome::Noop));
        assert!(rig.pacer.pauses().is_empty());
    }

    #[test]
    fn wait_is_capped_at_one_second() {
        let mut rig = Rig::new();
        let step = TourStep::new("s", "t", "x", "y").wait(5000);
        assert_eq!(rig.run(&step, true), Ok(ActionOutcome::Performed));
        assert_eq!(rig.pacer.pauses(), vec![ms(1000)]);

        rig.pacer.clear();
        let short = TourStep::new("s", "t", "x", "y").wait(300);
        rig.run(&short, true).expect("wait");
        assert_eq!(rig.pacer.pauses(), vec![ms(300)]);
    }

    #[test]
    fn click_presses_clicks_and_releases() {
        let mut rig = Rig::new();
        let node = rig.ui.insert("save", Rect::new(0, 0, 10, 10));
        let step = TourStep::new("s", "t", "x", "y").action(StepAction::Click, "save");

        assert_eq!(rig.run(&step, true), Ok(ActionOutcome::Performed));
        assert_eq!(
            rig.ui.calls(),
            vec![
                UiCall::Marker { node, marker: Marker::Pressed, on: true },
                UiCall::Click(node),
                UiCall::Marker { node, marker: Marker::Pressed, on: false },
            ]
        );
        assert_eq!(rig.pacer.pauses(), vec![ms(100), ms(100)]);
    }

    #[test]
    fn click_without_action_target_uses_step_target() {
        let mut rig = Rig::new();
        let node = rig.ui.insert("t", Rect::new(0, 0, 10, 10));
        let mut step = TourStep::new("s", "t", "x", "y");
        step.action = StepAction::Click;
        rig.run(&step, true).expect("click");
        assert!(rig.ui.calls().contains(&UiCall::Click(node)));
    }

    #[test]
    fn click_on_missing_target_degrades_to_noop() {
        let mut rig = Rig::new();
        let step = TourStep::new("s", "t", "x", "y").action(StepAction::Click, "ghost");
        assert_eq!(rig.run(&step, true), Ok(ActionOutcome::TargetNotFound));
        assert!(rig.ui.calls().is_empty());
    }

    #[test]
    fn failed_click_releases_marker_and_propagates() {
        let mut rig = Rig::new();
        let node = rig.ui.insert("save", Rect::new(0, 0, 10, 10));
        rig.ui.fail_clicks_on(node);
        let step = TourStep::new("s", "t", "x", "y").action(StepAction::Click, "save");

        let err = rig.run(&step, true).expect_err("click fails");
        assert_eq!(err.action, StepAction::Click);
        assert!(rig.ui.marked(Marker::Pressed).is_empty());
    }

    #[test]
    fn navigate_dims_around_navigation() {
        let mut rig = Rig::new();
        let step = TourStep::new("s", "t", "x", "y").action(StepAction::Navigate, "trainings");
        assert_eq!(rig.run(&step, true), Ok(ActionOutcome::Performed));
        assert_eq!(
            rig.nav.calls(),
            vec![
                NavCall::Dim(true),
                NavCall::Navigate("trainings".into()),
                NavCall::Dim(false),
            ]
        );
        assert_eq!(rig.pacer.pauses(), vec![ms(150)]);
    }

    #[test]
    fn navigate_failure_restores_dim_and_propagates() {
        let mut rig = Rig::new();
        rig.nav.fail_on("admin");
        let step = TourStep::new("s", "t", "x", "y").action(StepAction::Navigate, "admin");
        let err = rig.run(&step, true).expect_err("navigation fails");
        assert_eq!(err.step_id, "s");
        assert!(!rig.nav.is_dimmed());
    }

    #[test]
    fn navigate_without_navigator_or_destination_is_noop() {
        let mut rig = Rig::new();
        let step = TourStep::new("s", "t", "x", "y").action(StepAction::Navigate, "home");
        assert_eq!(rig.run(&step, false), Ok(ActionOutcome::NoNavigator));

        let mut bare = TourStep::new("s", "t", "x", "y");
        bare.action = StepAction::Navigate;
        assert_eq!(rig.run(&bare, true), Ok(ActionOutcome::MissingDestination));
        assert!(rig.nav.calls().is_empty());
    }

    #[test]
    fn scroll_centers_target_and_settles() {
        let mut rig = Rig::new();
        let node = rig.ui.insert("list", Rect::new(0, 2000, 10, 10));
        let step = TourStep::new("s", "t", "x", "y").action(StepAction::Scroll, "list");
        assert_eq!(rig.run(&step, true), Ok(ActionOutcome::Performed));
        assert_eq!(rig.ui.calls(), vec![UiCall::Scroll(node)]);
        assert_eq!(rig.pacer.pauses(), vec![ms(200)]);

        let missing = TourStep::new("s", "t", "x", "y").action(StepAction::Scroll, "nope");
        assert_eq!(rig.run(&missing, true), Ok(ActionOutcome::TargetNotFound));
    }
}
