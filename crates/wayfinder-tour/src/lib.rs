#![forbid(unsafe_code)]

//! Tour: guided walkthroughs over a live host UI.
//!
//! # Role in wayfinder
//! `wayfinder-tour` is the engine. It resolves symbolic step targets against
//! the host's live UI tree, places a tooltip next to each target, performs
//! step actions (click, navigate, wait, scroll), and tracks which tours a
//! user has completed or skipped.
//!
//! # Primary responsibilities
//! - **ElementResolver** (`resolver`): target lookup with an attachment-checked cache.
//! - **TooltipPlacer** (`placement`): pure, clamped tooltip geometry.
//! - **StepActionExecutor** (`action`): step side effects with paced affordances.
//! - **TourEngine** (`engine`): the run state machine and its deferred transitions.
//! - **TourCatalog** (`catalog`, `builtin`): built-in and user-authored tours.
//! - **Persistence** (`store`): progress and user tours behind a key-value store.
//!
//! # How it fits in the system
//! The host implements [`LiveUi`] (and optionally [`Navigator`]) for its UI
//! toolkit, builds a [`TourEngine`], forwards resize/scroll notifications and
//! frame ticks, and renders from [`TourEngine::step_view`] and the drained
//! [`TourEvent`]s.

pub mod action;
pub mod builtin;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod pacer;
pub mod placement;
pub mod resolver;
pub mod store;
pub mod ui;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use action::{ActionContext, ActionOutcome, StepActionExecutor};
pub use catalog::{CatalogError, ImportOutcome, TourCatalog, ValidationReport, validate_tour};
pub use config::{ConfigError, PlacementConfig, TimingConfig, TourConfig};
pub use engine::{StepView, TourEngine, TourEngineBuilder, TourEvent};
pub use error::{HostError, StoreError, TourError};
pub use model::{
    BeforeStepHook, RequiredRole, StepAction, StepPosition, Tour, TourCategory, TourStep,
};
pub use pacer::{NoopPacer, Pacer, ThreadPacer};
pub use placement::{TooltipPlacer, TooltipPosition};
pub use resolver::{ElementResolver, ResolvedElement, ResolverStats};
pub use store::{FileStore, KeyValueStore, KvProgressStore, MemoryStore, ProgressStore};
pub use ui::{LiveUi, Marker, Navigator, NodeHandle, ScrollAlign};
