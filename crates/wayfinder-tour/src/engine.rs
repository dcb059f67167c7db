#![forbid(unsafe_code)]

//! Tour run state machine.
//!
//! [`TourEngine`] owns the single active run, walks it step by step, and
//! persists completed and skipped tour ids.
//!
//! ```text
//!            start_tour                   complete_tour / last next_step
//!   Idle ─────────────────▶ Running ─────────────────────────────────▶ Idle
//!                             │  ▲                                     (completed set)
//!                  next_step/ │  │
//!              previous_step  └──┘      skip_tour
//!                                   ──────────────────────────────────▶ Idle
//!                                                                      (skipped set)
//! ```
//!
//! # Timing
//!
//! Short awaited pauses inside actions and transitions go through the
//! injected [`Pacer`]. Deferred work runs on the engine clock, which the host
//! drives with [`advance`](TourEngine::advance):
//!
//! - an unresolvable step marked skip-if-not-found is skipped once the
//!   auto-skip grace has elapsed;
//! - resize and scroll notifications recompute the tooltip through
//!   independent throttles, with one trailing recompute per burst.
//!
//! # Invariants
//!
//! 1. `is_active()` holds exactly when a tour is set and the step index is
//!    in bounds.
//! 2. `next_step`, `previous_step`, `skip_tour`, and `complete_tour` are
//!    no-ops while idle.
//! 3. A failed step action leaves the step index unchanged.
//! 4. Persistence failures are logged and never abort a transition.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::time::Duration;

use wayfinder_core::{Rect, Size, Throttle};

use crate::action::{ActionContext, StepActionExecutor};
use crate::catalog::TourCatalog;
use crate::config::TourConfig;
use crate::error::TourError;
use crate::model::{Tour, TourStep};
use crate::pacer::{Pacer, ThreadPacer};
use crate::placement::{TooltipPlacer, TooltipPosition};
use crate::resolver::ElementResolver;
use crate::store::{KvProgressStore, MemoryStore, ProgressStore};
use crate::ui::{LiveUi, Navigator, ScrollAlign};

/// Notifications for the host, drained with [`TourEngine::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    Started {
        tour_id: String,
    },
    StepShown {
        tour_id: String,
        index: usize,
        step_id: String,
    },
    /// The target could not be found and the step is not skip-eligible.
    StepStalled {
        tour_id: String,
        index: usize,
        step_id: String,
    },
    AutoSkipScheduled {
        tour_id: String,
        index: usize,
        deadline: Duration,
    },
    StepAutoSkipped {
        tour_id: String,
        index: usize,
        step_id: String,
    },
    Completed {
        tour_id: String,
    },
    Skipped {
        tour_id: String,
    },
}

/// Presentation state of the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepView {
    /// Between transitions.
    Pending,
    Visible {
        anchor: Rect,
        tooltip: TooltipPosition,
    },
    /// Target missing; the tour stays hidden at this step until the user
    /// moves on or skips the tour.
    Stalled,
    /// Target missing; the step is skipped when the engine clock reaches
    /// `deadline`.
    AwaitingSkip { deadline: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Completed,
    Skipped,
}

#[derive(Debug)]
struct ActiveRun {
    tour: Tour,
    index: usize,
    view: StepView,
}

impl ActiveRun {
    fn step(&self) -> Option<&TourStep> {
        self.tour.steps.get(self.index)
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.tour.steps.len()
    }
}

/// Builder for [`TourEngine`].
///
/// Every collaborator except the UI has a default: no navigator, in-memory
/// progress, built-in tours only, a thread-sleeping pacer, and default config.
pub struct TourEngineBuilder<U> {
    ui: U,
    navigator: Option<Box<dyn Navigator>>,
    progress: Option<Box<dyn ProgressStore>>,
    pacer: Option<Box<dyn Pacer>>,
    catalog: Option<TourCatalog>,
    config: TourConfig,
}

impl<U: LiveUi> TourEngineBuilder<U> {
    #[must_use]
    pub fn navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Some(Box::new(navigator));
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: impl ProgressStore + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    #[must_use]
    pub fn pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Some(Box::new(pacer));
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: TourCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn config(mut self, config: TourConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine and load the persisted progress sets.
    ///
    /// Out-of-range config values fall back to their defaults.
    pub fn build(self) -> TourEngine<U> {
        let mut progress = self
            .progress
            .unwrap_or_else(|| Box::new(KvProgressStore::new(MemoryStore::new())));
        let completed = progress.load_completed_tours();
        let skipped = progress.load_skipped_tours();
        tracing::debug!(
            completed = completed.len(),
            skipped = skipped.len(),
            "tour progress loaded"
        );

        let config = self.config.sanitized();
        let timing = &config.timing;
        TourEngine {
            resolver: ElementResolver::new(),
            executor: StepActionExecutor::new(timing.clone()),
            placer: config.placement.placer(),
            tooltip_size: config.placement.tooltip_size(),
            resize_throttle: Throttle::new(timing.resize_throttle()),
            scroll_throttle: Throttle::new(timing.scroll_throttle()),
            ui: self.ui,
            navigator: self.navigator,
            progress,
            pacer: self.pacer.unwrap_or_else(|| Box::new(ThreadPacer)),
            catalog: self
                .catalog
                .unwrap_or_else(|| TourCatalog::new(MemoryStore::new())),
            config,
            run: None,
            completed,
            skipped,
            clock: Duration::ZERO,
            events: VecDeque::new(),
        }
    }
}

pub struct TourEngine<U> {
    ui: U,
    navigator: Option<Box<dyn Navigator>>,
    progress: Box<dyn ProgressStore>,
    pacer: Box<dyn Pacer>,
    catalog: TourCatalog,
    config: TourConfig,
    resolver: ElementResolver,
    executor: StepActionExecutor,
    placer: TooltipPlacer,
    tooltip_size: Size,
    run: Option<ActiveRun>,
    completed: BTreeSet<String>,
    skipped: BTreeSet<String>,
    clock: Duration,
    resize_throttle: Throttle,
    scroll_throttle: Throttle,
    events: VecDeque<TourEvent>,
}

impl<U: fmt::Debug> fmt::Debug for TourEngine<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourEngine")
            .field("ui", &self.ui)
            .field("run", &self.run)
            .field("completed", &self.completed)
            .field("skipped", &self.skipped)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<U: LiveUi> TourEngine<U> {
    pub fn builder(ui: U) -> TourEngineBuilder<U> {
        TourEngineBuilder {
            ui,
            navigator: None,
            progress: None,
            pacer: None,
            catalog: None,
            config: TourConfig::default(),
        }
    }

    // --- lifecycle -------------------------------------------------------

    /// Start the tour `tour_id` at its first step.
    ///
    /// Unknown ids and tours without steps are ignored and return `false`.
    /// A tour that is already running is abandoned without being recorded.
    pub fn start_tour(&mut self, tour_id: &str) -> bool {
        let Some(tour) = self.catalog.get(tour_id).cloned() else {
            tracing::debug!(tour = tour_id, "ignoring start of unknown tour");
            return false;
        };
        if tour.steps.is_empty() {
            tracing::warn!(tour = tour_id, "ignoring start of tour without steps");
            return false;
        }

        if let Some(previous) = self.run.take() {
            tracing::debug!(tour = %previous.tour.id, "abandoning running tour");
            self.resolver.clear_highlights(&mut self.ui);
        }

        tracing::debug!(tour = tour_id, steps = tour.steps.len(), "tour started");
        self.transition_cue();
        self.run = Some(ActiveRun {
            tour,
            index: 0,
            view: StepView::Pending,
        });
        self.events.push_back(TourEvent::Started {
            tour_id: tour_id.to_owned(),
        });
        self.advance_to_step(0);
        true
    }

    /// Run the current step's action, then move to the next step or
    /// complete the tour after the last one.
    ///
    /// On action failure the run stays on the current step and the error
    /// is returned.
    pub fn next_step(&mut self) -> Result<(), TourError> {
        let Some(run) = self.run.as_ref() else {
            return Ok(());
        };
        let index = run.index;
        let is_last = run.is_last();
        let Some(step) = run.step().cloned() else {
            return Ok(());
        };

        let cx = ActionContext {
            ui: &mut self.ui,
            resolver: &mut self.resolver,
            navigator: self
                .navigator
                .as_mut()
                .map(|nav| nav.as_mut() as &mut dyn Navigator),
            pacer: &mut *self.pacer,
        };
        if let Err(err) = self.executor.execute(&step, cx) {
            tracing::warn!(step = %step.id, error = %err, "step action failed");
            return Err(err);
        }

        if is_last {
            self.complete_tour();
        } else {
            self.advance_to_step(index + 1);
        }
        Ok(())
    }

    /// Go back one step. Actions are not undone or re-run.
    pub fn previous_step(&mut self) {
        let Some(run) = self.run.as_ref() else {
            return;
        };
        if run.index == 0 {
            return;
        }
        let index = run.index - 1;
        self.advance_to_step(index);
    }

    /// Record the running tour as completed and return to idle.
    pub fn complete_tour(&mut self) {
        self.finish(Exit::Completed);
    }

    /// Record the running tour as skipped and return to idle.
    pub fn skip_tour(&mut self) {
        self.finish(Exit::Skipped);
    }

    /// Forget every completed and skipped tour.
    pub fn reset_progress(&mut self) {
        self.completed.clear();
        self.skipped.clear();
        self.persist(Exit::Completed);
        self.persist(Exit::Skipped);
    }

    // --- host notifications ----------------------------------------------

    /// Move the engine clock forward and run whatever became due.
    pub fn advance(&mut self, delta: Duration) {
        self.clock = self.clock.saturating_add(delta);

        let due = self
            .run
            .as_ref()
            .is_some_and(|run| {
                matches!(run.view, StepView::AwaitingSkip { deadline } if deadline <= self.clock)
            });
        if due {
            self.auto_skip();
        }

        let resized = self.resize_throttle.poll(self.clock);
        let scrolled = self.scroll_throttle.poll(self.clock);
        if resized || scrolled {
            self.recompute_geometry();
        }
    }

    /// The host viewport changed size.
    pub fn on_viewport_resized(&mut self) {
        if self.run.is_some() && self.resize_throttle.push(self.clock) {
            self.recompute_geometry();
        }
    }

    /// The host scrolled.
    pub fn on_scrolled(&mut self) {
        if self.run.is_some() && self.scroll_throttle.push(self.clock) {
            self.recompute_geometry();
        }
    }

    /// Report the measured tooltip size. Placement is recomputed at once.
    pub fn set_tooltip_size(&mut self, size: Size) {
        if self.tooltip_size != size {
            self.tooltip_size = size;
            self.recompute_geometry();
        }
    }

    // --- queries -----------------------------------------------------------

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    #[must_use]
    pub fn current_tour(&self) -> Option<&Tour> {
        self.run.as_ref().map(|run| &run.tour)
    }

    #[must_use]
    pub fn current_step_index(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.index)
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&TourStep> {
        self.run.as_ref().and_then(ActiveRun::step)
    }

    #[must_use]
    pub fn step_view(&self) -> Option<StepView> {
        self.run.as_ref().map(|run| run.view)
    }

    /// "n of m" for the current step.
    #[must_use]
    pub fn progress_label(&self) -> Option<String> {
        self.run
            .as_ref()
            .map(|run| format!("{} of {}", run.index + 1, run.tour.steps.len()))
    }

    #[must_use]
    pub fn completed_tours(&self) -> &BTreeSet<String> {
        &self.completed
    }

    #[must_use]
    pub fn skipped_tours(&self) -> &BTreeSet<String> {
        &self.skipped
    }

    #[must_use]
    pub fn is_completed(&self, tour_id: &str) -> bool {
        self.completed.contains(tour_id)
    }

    #[must_use]
    pub fn is_skipped(&self, tour_id: &str) -> bool {
        self.skipped.contains(tour_id)
    }

    /// Tours that may be passed to [`start_tour`](Self::start_tour).
    #[must_use]
    pub fn available_tours(&self) -> Vec<&Tour> {
        self.catalog.available_tours()
    }

    #[must_use]
    pub fn catalog(&self) -> &TourCatalog {
        &self.catalog
    }

    /// Catalog edits apply to future runs only.
    pub fn catalog_mut(&mut self) -> &mut TourCatalog {
        &mut self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Current engine clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock
    }

    #[must_use]
    pub fn resolver(&self) -> &ElementResolver {
        &self.resolver
    }

    #[must_use]
    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn drain_events(&mut self) -> Vec<TourEvent> {
        self.events.drain(..).collect()
    }

    // --- internals -----------------------------------------------------------

    fn advance_to_step(&mut self, index: usize) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let Some(step) = run.tour.steps.get(index).cloned() else {
            return;
        };
        run.index = index;
        run.view = StepView::Pending;
        let tour_id = run.tour.id.clone();

        self.resolver.clear_highlights(&mut self.ui);
        self.resize_throttle.reset();
        self.scroll_throttle.reset();

        self.ensure_required_view(&step);
        if let Some(hook) = &step.before_step {
            if let Err(err) = hook.run(&mut self.ui) {
                tracing::warn!(step = %step.id, error = %err, "before-step hook failed");
            }
        }

        let view = match self.resolver.resolve(&self.ui, &step.target) {
            Some(resolved) => {
                self.ui.scroll_into_view(resolved.node, ScrollAlign::Nearest);
                let anchor = self
                    .resolver
                    .current_geometry(&self.ui, &step.target)
                    .unwrap_or(resolved.geometry);
                self.resolver.highlight(&mut self.ui, &step.target);
                let tooltip = self.place(anchor, &step);
                tracing::debug!(tour = %tour_id, step = index, "step shown");
                self.events.push_back(TourEvent::StepShown {
                    tour_id,
                    index,
                    step_id: step.id.clone(),
                });
                StepView::Visible { anchor, tooltip }
            }
            None if step.skip_if_not_found => {
                let deadline = self
                    .clock
                    .saturating_add(self.config.timing.auto_skip_grace());
                tracing::debug!(
                    tour = %tour_id,
                    step = index,
                    target_id = %step.target,
                    "target not found, auto-skip scheduled"
                );
                self.events.push_back(TourEvent::AutoSkipScheduled {
                    tour_id,
                    index,
                    deadline,
                });
                StepView::AwaitingSkip { deadline }
            }
            None => {
                tracing::warn!(
                    tour = %tour_id,
                    step = index,
                    target_id = %step.target,
                    "tour step target not found"
                );
                self.events.push_back(TourEvent::StepStalled {
                    tour_id,
                    index,
                    step_id: step.id.clone(),
                });
                StepView::Stalled
            }
        };

        if let Some(run) = self.run.as_mut() {
            run.view = view;
        }
    }

    fn ensure_required_view(&mut self, step: &TourStep) {
        let Some(required) = step.required_view.as_deref() else {
            return;
        };
        let Some(navigator) = self.navigator.as_mut() else {
            return;
        };
        match navigator.current_view() {
            Some(current) if current != required => {
                tracing::debug!(from = %current, to = required, "switching to required view");
                if let Err(err) = navigator.navigate_to(required) {
                    tracing::warn!(
                        view = required,
                        error = %err,
                        "required view navigation failed"
                    );
                }
            }
            _ => {}
        }
    }

    fn auto_skip(&mut self) {
        let Some(run) = self.run.as_ref() else {
            return;
        };
        let index = run.index;
        let is_last = run.is_last();
        let event = TourEvent::StepAutoSkipped {
            tour_id: run.tour.id.clone(),
            index,
            step_id: run.step().map(|s| s.id.clone()).unwrap_or_default(),
        };
        tracing::debug!(step = index, last = is_last, "auto-skipping unresolved step");
        self.events.push_back(event);

        if is_last {
            self.complete_tour();
        } else {
            self.advance_to_step(index + 1);
        }
    }

    fn recompute_geometry(&mut self) {
        let Some(run) = self.run.as_ref() else {
            return;
        };
        if !matches!(run.view, StepView::Visible { .. }) {
            return;
        }
        let Some(step) = run.step().cloned() else {
            return;
        };
        let Some(anchor) = self.resolver.current_geometry(&self.ui, &step.target) else {
            tracing::debug!(
                target_id = %step.target,
                "visible target vanished, keeping last placement"
            );
            return;
        };
        let tooltip = self.place(anchor, &step);
        if let Some(run) = self.run.as_mut() {
            run.view = StepView::Visible { anchor, tooltip };
        }
    }

    fn place(&self, anchor: Rect, step: &TourStep) -> TooltipPosition {
        self.placer
            .place(anchor, step.position, self.tooltip_size, self.ui.viewport())
    }

    fn finish(&mut self, exit: Exit) {
        let Some(run) = self.run.take() else {
            return;
        };
        let tour_id = run.tour.id;
        match exit {
            Exit::Completed => {
                self.completed.insert(tour_id.clone());
            }
            Exit::Skipped => {
                self.skipped.insert(tour_id.clone());
            }
        }
        self.persist(exit);

        self.transition_cue();
        self.resolver.clear_highlights(&mut self.ui);
        self.resolver.clear_cache();
        self.resize_throttle.reset();
        self.scroll_throttle.reset();

        tracing::debug!(tour = %tour_id, ?exit, "tour finished");
        self.events.push_back(match exit {
            Exit::Completed => TourEvent::Completed { tour_id },
            Exit::Skipped => TourEvent::Skipped { tour_id },
        });
    }

    fn persist(&mut self, exit: Exit) {
        let saved = match exit {
            Exit::Completed => self.progress.save_completed_tours(&self.completed),
            Exit::Skipped => self.progress.save_skipped_tours(&self.skipped),
        };
        if let Err(err) = saved {
            tracing::warn!(?exit, error = %err, "failed to persist tour progress");
        }
    }

    /// Brief global dim used as the entrance and exit cue.
    fn transition_cue(&mut self) {
        let Some(navigator) = self.navigator.as_mut() else {
            return;
        };
        navigator.set_dimmed(true);
        self.pacer.pause(self.config.timing.transition_dim());
        navigator.set_dimmed(false);
    }
}
