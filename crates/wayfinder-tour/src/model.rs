#![forbid(unsafe_code)]

//! Tour and step definitions.
//!
//! These types are plain data: the catalog stores and validates them, the
//! engine reads them. A [`Tour`] is never mutated while it is being run; the
//! engine keeps its own copy for the duration of a run.
//!
//! The serialized form uses camelCase field names so tours exported by the
//! host's authoring screens round-trip unchanged.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::ui::LiveUi;

/// Desired tooltip side relative to the step target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPosition {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    /// Centered in the viewport, ignoring the target.
    Center,
}

/// Side effect performed when leaving a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    #[default]
    None,
    Click,
    Wait,
    Navigate,
    Scroll,
}

impl StepAction {
    /// Stable lowercase name, used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Click => "click",
            Self::Wait => "wait",
            Self::Navigate => "navigate",
            Self::Scroll => "scroll",
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourCategory {
    #[default]
    Onboarding,
    Feature,
    Admin,
    User,
}

/// Visibility gate for a tour. Enforced by the caller, not the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredRole {
    #[default]
    Any,
    Admin,
    User,
}

impl RequiredRole {
    /// Whether a user holding `role` may see a tour gated by `self`.
    #[must_use]
    pub fn admits(self, role: RequiredRole) -> bool {
        match self {
            Self::Any => true,
            Self::Admin => role == Self::Admin,
            Self::User => matches!(role, Self::User | Self::Admin),
        }
    }
}

type HookFn = dyn Fn(&mut dyn LiveUi) -> Result<(), HostError> + Send + Sync;

/// Hook run against the live UI before a step's target is resolved.
///
/// Typically used to open a panel or expand a menu so the target exists.
/// Hooks are code, not data: they are skipped when a tour is serialized.
#[derive(Clone)]
pub struct BeforeStepHook(Arc<HookFn>);

impl BeforeStepHook {
    pub fn new(
        hook: impl Fn(&mut dyn LiveUi) -> Result<(), HostError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(hook))
    }

    /// Run the hook.
    pub fn run(&self, ui: &mut dyn LiveUi) -> Result<(), HostError> {
        (self.0)(ui)
    }
}

impl fmt::Debug for BeforeStepHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BeforeStepHook").field(&"<fn>").finish()
    }
}

/// One stop in a tour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStep {
    /// Unique within the owning tour.
    pub id: String,
    /// Symbolic target resolved by the [`ElementResolver`](crate::resolver::ElementResolver).
    pub target: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub position: StepPosition,
    #[serde(default)]
    pub action: StepAction,
    /// Secondary target for `click`, `navigate` (view id), and `scroll`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_target: Option<String>,
    /// Requested pause for `wait`, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<u64>,
    /// View that must be showing for this step to make sense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_view: Option<String>,
    #[serde(default)]
    pub skip_if_not_found: bool,
    #[serde(skip)]
    pub before_step: Option<BeforeStepHook>,
}

impl TourStep {
    /// Create a step with the given id, target, and text.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        target: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn position(mut self, position: StepPosition) -> Self {
        self.position = position;
        self
    }

    /// Set the action and its secondary target.
    #[must_use]
    pub fn action(mut self, action: StepAction, target: impl Into<String>) -> Self {
        self.action = action;
        self.action_target = Some(target.into());
        self
    }

    /// Make this a `wait` step pausing for `millis`.
    #[must_use]
    pub fn wait(mut self, millis: u64) -> Self {
        self.action = StepAction::Wait;
        self.wait_time = Some(millis);
        self
    }

    #[must_use]
    pub fn required_view(mut self, view: impl Into<String>) -> Self {
        self.required_view = Some(view.into());
        self
    }

    #[must_use]
    pub fn skip_if_not_found(mut self, skip: bool) -> Self {
        self.skip_if_not_found = skip;
        self
    }

    #[must_use]
    pub fn before_step(mut self, hook: BeforeStepHook) -> Self {
        self.before_step = Some(hook);
        self
    }

    /// Requested wait as a [`Duration`], if any.
    #[must_use]
    pub fn wait_duration(&self) -> Option<Duration> {
        self.wait_time.map(Duration::from_millis)
    }
}

/// An ordered sequence of steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: TourCategory,
    #[serde(default)]
    pub required_role: RequiredRole,
    /// Informational, in minutes.
    #[serde(default)]
    pub estimated_duration: u32,
    pub steps: Vec<TourStep>,
}

impl Tour {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            estimated_duration: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn category(mut self, category: TourCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn required_role(mut self, role: RequiredRole) -> Self {
        self.required_role = role;
        self
    }

    #[must_use]
    pub fn estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = minutes;
        self
    }

    #[must_use]
    pub fn step(mut self, step: TourStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn step_at(&self, index: usize) -> Option<&TourStep> {
        self.steps.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_deserializes_camel_case_with_defaults() {
        let json = r#"{
            "id": "s1",
            "target": "nav-trainings",
            "title": "Trainings",
            "content": "All trainings live here.",
            "action": "navigate",
            "actionTarget": "trainings",
            "skipIfNotFound": true
        }"#;
        let step: TourStep = serde_json::from_str(json).expect("parse step");
        assert_eq!(step.position, StepPosition::Bottom);
        assert_eq!(step.action, StepAction::Navigate);
        assert_eq!(step.action_target.as_deref(), Some("trainings"));
        assert!(step.skip_if_not_found);
        assert!(step.wait_time.is_none());
        assert!(step.before_step.is_none());
    }

    #[test]
    fn unknown_position_is_rejected() {
        let json = r#"{"id":"s","target":"t","title":"x","content":"y","position":"diagonal"}"#;
        assert!(serde_json::from_str::<TourStep>(json).is_err());
    }

    #[test]
    fn hook_is_not_serialized() {
        let step = TourStep::new("s", "t", "x", "y").before_step(BeforeStepHook::new(|_| Ok(())));
        let json = serde_json::to_string(&step).expect("serialize");
        assert!(!json.contains("beforeStep"));
        assert!(format!("{step:?}").contains("<fn>"));
    }

    #[test]
    fn required_role_admits() {
        assert!(RequiredRole::Any.admits(RequiredRole::User));
        assert!(RequiredRole::User.admits(RequiredRole::Admin));
        assert!(!RequiredRole::Admin.admits(RequiredRole::User));
    }

    #[test]
    fn wait_builder_sets_action() {
        let step = TourStep::new("s", "t", "x", "y").wait(5000);
        assert_eq!(step.action, StepAction::Wait);
        assert_eq!(step.wait_duration(), Some(Duration::from_millis(5000)));
    }
}
