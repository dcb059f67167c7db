#![forbid(unsafe_code)]

//! Tours shipped with the training-management application.
//!
//! Targets are the symbolic ids the host registers on its navigation and
//! page chrome (`nav-*`, `trainings-*`, ...). Steps that point at optional
//! page furniture are marked skip-if-not-found so a missing widget never
//! stalls the walkthrough.

use crate::model::{RequiredRole, StepAction, StepPosition, Tour, TourCategory, TourStep};

pub const ONBOARDING_TOUR_ID: &str = "welcome";
pub const TRAININGS_TOUR_ID: &str = "trainings-overview";
pub const ATTENDANCE_TOUR_ID: &str = "attendance-tracking";
pub const ADMIN_TOUR_ID: &str = "admin-console";

/// All built-in tours, in menu order.
#[must_use]
pub fn built_in_tours() -> Vec<Tour> {
    vec![onboarding(), trainings(), attendance(), admin()]
}

fn onboarding() -> Tour {
    let mut steps = Vec::new();
    push_step(
        &mut steps,
        "welcome",
        "app-header",
        "Welcome aboard",
        "This short tour shows where everything lives. You can leave it at any time.",
        StepPosition::Center,
    );
    push_step(
        &mut steps,
        "dashboard",
        "nav-dashboard",
        "Your dashboard",
        "Upcoming sessions and recent announcements are collected here.",
        StepPosition::Right,
    );
    push_step(
        &mut steps,
        "trainings",
        "nav-trainings",
        "Trainings",
        "Browse every training you can subscribe to.",
        StepPosition::Right,
    );
    set_action(&mut steps, StepAction::Navigate, Some("trainings"));
    push_step(
        &mut steps,
        "search",
        "trainings-search",
        "Find a training",
        "Filter by title, trainer, or date.",
        StepPosition::Bottom,
    );
    mark_required_view(&mut steps, "trainings");
    push_step(
        &mut steps,
        "help",
        "help-button",
        "Help is one click away",
        "Open the help panel for articles about the page you are on.",
        StepPosition::Left,
    );
    mark_optional(&mut steps);

    Tour {
        steps,
        ..Tour::new(
            ONBOARDING_TOUR_ID,
            "Welcome tour",
            "A first look at the dashboard, trainings, and help.",
        )
        .category(TourCategory::Onboarding)
        .estimated_duration(2)
    }
}

fn trainings() -> Tour {
    Tour::new(
        TRAININGS_TOUR_ID,
        "Trainings and subscriptions",
        "Subscribe to a training and keep track of your sessions.",
    )
    .category(TourCategory::Feature)
    .required_role(RequiredRole::User)
    .estimated_duration(3)
    .step(
        TourStep::new(
            "list",
            "trainings-list",
            "Available trainings",
            "Every open training is listed with its next session date.",
        )
        .required_view("trainings"),
    )
    .step(
        TourStep::new(
            "card",
            "training-card",
            "Training details",
            "Open a card to read the agenda and see who is already subscribed.",
        )
        .position(StepPosition::Right)
        .action(StepAction::Scroll, "training-card"),
    )
    .step(
        TourStep::new(
            "subscribe",
            "subscribe-button",
            "Subscribe",
            "Reserve a seat. You will get a confirmation and a reminder before the session.",
        )
        .position(StepPosition::Top)
        .skip_if_not_found(true),
    )
    .step(
        TourStep::new(
            "my-trainings",
            "nav-my-trainings",
            "My trainings",
            "Your subscriptions and past sessions live here.",
        )
        .position(StepPosition::Right),
    )
}

fn attendance() -> Tour {
    Tour::new(
        ATTENDANCE_TOUR_ID,
        "Attendance tracking",
        "Record who showed up and export the attendance sheet.",
    )
    .category(TourCategory::Feature)
    .required_role(RequiredRole::User)
    .estimated_duration(2)
    .step(
        TourStep::new(
            "open",
            "nav-attendance",
            "Attendance",
            "Pick a session to record attendance for.",
        )
        .position(StepPosition::Right)
        .action(StepAction::Navigate, "attendance"),
    )
    .step(
        TourStep::new(
            "roster",
            "attendance-roster",
            "Session roster",
            "Tick each participant who attended. Changes save as you go.",
        )
        .required_view("attendance")
        .wait(600),
    )
    .step(
        TourStep::new(
            "export",
            "attendance-export",
            "Export",
            "Download the signed attendance sheet for your records.",
        )
        .position(StepPosition::Left)
        .skip_if_not_found(true),
    )
}

fn admin() -> Tour {
    let mut steps = Vec::new();
    push_step(
        &mut steps,
        "console",
        "nav-admin",
        "Administration",
        "Manage users, trainings, and announcements.",
        StepPosition::Right,
    );
    set_action(&mut steps, StepAction::Click, None);
    push_step(
        &mut steps,
        "users",
        "admin-users",
        "Users and roles",
        "Invite people and decide who can create trainings.",
        StepPosition::Bottom,
    );
    mark_required_view(&mut steps, "admin");
    push_step(
        &mut steps,
        "announcements",
        "admin-announcements",
        "Announcements",
        "Publish shout-outs that appear on every dashboard.",
        StepPosition::Bottom,
    );
    mark_required_view(&mut steps, "admin");
    push_step(
        &mut steps,
        "tours",
        "admin-tours",
        "Custom tours",
        "Write your own tours for the features your team uses most.",
        StepPosition::Top,
    );
    mark_optional(&mut steps);

    Tour {
        steps,
        ..Tour::new(
            ADMIN_TOUR_ID,
            "Admin console",
            "Everything an administrator needs to run the training catalog.",
        )
        .category(TourCategory::Admin)
        .required_role(RequiredRole::Admin)
        .estimated_duration(3)
    }
}

fn push_step(
    steps: &mut Vec<TourStep>,
    id: &str,
    target: &str,
    title: &str,
    content: &str,
    position: StepPosition,
) {
    steps.push(TourStep::new(id, target, title, content).position(position));
}

fn set_action(steps: &mut [TourStep], action: StepAction, target: Option<&str>) {
    if let Some(step) = steps.last_mut() {
        step.action = action;
        step.action_target = target.map(str::to_owned);
    }
}

fn mark_required_view(steps: &mut [TourStep], view: &str) {
    if let Some(step) = steps.last_mut() {
        step.required_view = Some(view.to_owned());
    }
}

fn mark_optional(steps: &mut [TourStep]) {
    if let Some(step) = steps.last_mut() {
        step.skip_if_not_found = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_constants() {
        let ids: Vec<_> = built_in_tours().into_iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                ONBOARDING_TOUR_ID,
                TRAININGS_TOUR_ID,
                ATTENDANCE_TOUR_ID,
                ADMIN_TOUR_ID
            ]
        );
    }

    #[test]
    fn admin_tour_is_gated() {
        let tours = built_in_tours();
        let admin = tours
            .iter()
            .find(|t| t.id == ADMIN_TOUR_ID)
            .expect("admin tour");
        assert_eq!(admin.required_role, RequiredRole::Admin);
        assert!(admin.steps.iter().any(|s| s.action == StepAction::Click));
    }

    #[test]
    fn onboarding_navigates_before_search_step() {
        let tour = onboarding();
        let trainings = &tour.steps[2];
        assert_eq!(trainings.action, StepAction::Navigate);
        assert_eq!(tour.steps[3].required_view.as_deref(), Some("trainings"));
        assert!(tour.steps.last().is_some_and(|s| s.skip_if_not_found));
    }
}
