#![forbid(unsafe_code)]

//! Wayfinder public facade crate.
//!
//! This crate provides the stable surface area for hosts. It re-exports the
//! common types from the internal crates, adds a top-level [`Error`], and
//! offers [`logging::init_logging`] plus a lightweight prelude.

pub mod logging;

use std::path::Path;

// --- Core re-exports -------------------------------------------------------

pub use wayfinder_core::{Rect, Size, Throttle};

// --- Tour re-exports -------------------------------------------------------

pub use wayfinder_tour::{
    ActionContext, ActionOutcome, BeforeStepHook, CatalogError, ConfigError, ElementResolver,
    FileStore, HostError, ImportOutcome, KeyValueStore, KvProgressStore, LiveUi, Marker,
    MemoryStore, Navigator, NodeHandle, Pacer, ProgressStore, ScrollAlign, StepAction,
    StepPosition, StepView, StoreError, TooltipPlacer, TooltipPosition, Tour, TourCatalog,
    TourCategory, TourConfig, TourEngine, TourEngineBuilder, TourError, TourEvent, TourStep,
    ValidationReport,
};

// --- Diff re-exports -------------------------------------------------------

#[cfg(feature = "diff")]
pub use wayfinder_diff::{DiffOptions, DiffReport, DiffRun, DiffSummary, Granularity, RunKind};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for wayfinder hosts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tour(#[from] TourError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
}

/// Standard result type for wayfinder APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Load a [`TourConfig`], picking the format from the file extension.
///
/// `.json` files are read as JSON; everything else as TOML.
pub fn load_config(path: impl AsRef<Path>) -> Result<TourConfig> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        TourConfig::from_json_file(path)?
    } else {
        TourConfig::from_toml_file(path)?
    };
    tracing::info!(path = %path.display(), "loaded tour config");
    Ok(config)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, LiveUi, Navigator, Rect, Result, Size, StepAction, StepPosition, StepView, Tour,
        TourCatalog, TourConfig, TourEngine, TourEvent, TourStep,
    };

    #[cfg(feature = "diff")]
    pub use crate::{DiffReport, Granularity, RunKind};

    pub use crate::{core, tour};

    #[cfg(feature = "diff")]
    pub use crate::diff;
}

pub use wayfinder_core as core;
#[cfg(feature = "diff")]
pub use wayfinder_diff as diff;
pub use wayfinder_tour as tour;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_convert_into_top_level() {
        let err: Error =
            ConfigError::Validation(vec!["timing.wait_cap_ms must be > 0".into()]).into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "validation errors: timing.wait_cap_ms must be > 0"
        );

        let err: Error = StoreError::InvalidKey { key: "../x".into() }.into();
        assert_eq!(err.to_string(), "invalid store key: ../x");
    }

    #[test]
    fn load_config_rejects_missing_file() {
        let err = load_config("/nonexistent/wayfinder.toml").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Io(_))));
    }

    #[cfg(feature = "diff")]
    #[test]
    fn facade_diff_is_reachable() {
        let report = diff::diff("a b", "a c", Granularity::Word);
        assert!(report.summary.has_changes());
    }
}
