#![forbid(unsafe_code)]

//! Built-in and user-authored tour definitions.
//!
//! The catalog owns two lists: built-in tours shipped with the host
//! application and user-authored tours persisted through a
//! [`KeyValueStore`] under [`USER_TOURS_KEY`].
//!
//! # Invariants
//!
//! 1. Only user-authored tours can be updated or deleted. Built-in tours are
//!    read-only; duplicating one yields an editable user-authored copy.
//! 2. Lookups prefer built-in tours: a user tour whose id collides with a
//!    built-in id is stored but never returned by [`get`](TourCatalog::get)
//!    or [`available_tours`](TourCatalog::available_tours).
//! 3. Every mutation persists before it becomes visible. A failed save
//!    leaves the in-memory catalog unchanged.
//! 4. Unknown ids are silent no-ops (`Ok(None)` / `Ok(false)`), never errors.
//!
//! # Example
//!
//! ```
//! use wayfinder_tour::catalog::TourCatalog;
//! use wayfinder_tour::model::{Tour, TourStep};
//! use wayfinder_tour::store::MemoryStore;
//!
//! let mut catalog = TourCatalog::new(MemoryStore::new());
//! let draft = Tour::new("", "Reports", "Where the monthly reports live.")
//!     .step(TourStep::new("intro", "nav-reports", "Reports", "Open this menu."));
//! let created = catalog.create_tour(draft).expect("valid tour");
//! assert_eq!(created.id, "custom-reports");
//! assert!(catalog.get("custom-reports").is_some());
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::builtin::built_in_tours;
use crate::error::StoreError;
use crate::model::Tour;
use crate::store::{KeyValueStore, USER_TOURS_KEY, load_json_or_reset};

const ID_PREFIX: &str = "custom";
const COPY_SUFFIX: &str = " (Copy)";

/// Structural problems found by [`validate_tour`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.errors.join("; "))
    }
}

/// Result of [`TourCatalog::import_json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub rejected: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid tour: {0}")]
    Invalid(ValidationReport),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Check the shape of `tour`.
///
/// Name and description must be non-blank, there must be at least one step,
/// every step needs a title, content, and target, step ids must be unique,
/// and the estimated duration must be at least one minute.
#[must_use]
pub fn validate_tour(tour: &Tour) -> ValidationReport {
    let mut errors = Vec::new();

    if tour.name.trim().is_empty() {
        errors.push("name is required".to_owned());
    }
    if tour.description.trim().is_empty() {
        errors.push("description is required".to_owned());
    }
    if tour.estimated_duration < 1 {
        errors.push("estimated duration must be at least 1 minute".to_owned());
    }
    if tour.steps.is_empty() {
        errors.push("at least one step is required".to_owned());
    }

    let mut seen = BTreeSet::new();
    for (index, step) in tour.steps.iter().enumerate() {
        let n = index + 1;
        if step.title.trim().is_empty() {
            errors.push(format!("step {n}: title is required"));
        }
        if step.content.trim().is_empty() {
            errors.push(format!("step {n}: content is required"));
        }
        if step.target.trim().is_empty() {
            errors.push(format!("step {n}: target is required"));
        }
        if !seen.insert(step.id.as_str()) {
            errors.push(format!("step {n}: duplicate step id `{}`", step.id));
        }
    }

    ValidationReport { errors }
}

pub struct TourCatalog {
    built_in: Vec<Tour>,
    user: Vec<Tour>,
    store: Box<dyn KeyValueStore>,
}

impl fmt::Debug for TourCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourCatalog")
            .field("built_in", &self.built_in.len())
            .field("user", &self.user.len())
            .finish_non_exhaustive()
    }
}

impl TourCatalog {
    /// Catalog with the shipped built-in tours and user tours loaded from `store`.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_built_ins(built_in_tours(), store)
    }

    /// Catalog with a custom built-in list.
    pub fn with_built_ins(built_in: Vec<Tour>, store: impl KeyValueStore + 'static) -> Self {
        let mut store: Box<dyn KeyValueStore> = Box::new(store);
        let user: Vec<Tour> = load_json_or_reset(&mut store, USER_TOURS_KEY).unwrap_or_default();
        tracing::debug!(
            built_in = built_in.len(),
            user = user.len(),
            "tour catalog loaded"
        );
        Self {
            built_in,
            user,
            store,
        }
    }

    #[must_use]
    pub fn built_in_tours(&self) -> &[Tour] {
        &self.built_in
    }

    #[must_use]
    pub fn user_authored_tours(&self) -> &[Tour] {
        &self.user
    }

    /// Replace and persist the user-authored list.
    pub fn save_user_authored_tours(&mut self, tours: Vec<Tour>) -> Result<(), CatalogError> {
        self.commit(tours)
    }

    /// Built-in tours followed by user tours whose id is not shadowed.
    #[must_use]
    pub fn available_tours(&self) -> Vec<&Tour> {
        let mut tours: Vec<&Tour> = self.built_in.iter().collect();
        tours.extend(self.user.iter().filter(|tour| !self.is_built_in(&tour.id)));
        tours
    }

    /// Look up a tour by id, built-in first.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Tour> {
        self.built_in
            .iter()
            .chain(self.user.iter())
            .find(|tour| tour.id == id)
    }

    #[must_use]
    pub fn is_built_in(&self, id: &str) -> bool {
        self.built_in.iter().any(|tour| tour.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Validate `draft` and store it as a user-authored tour.
    ///
    /// A blank or already-taken id is replaced with one generated from the
    /// tour name.
    pub fn create_tour(&mut self, mut draft: Tour) -> Result<Tour, CatalogError> {
        let report = validate_tour(&draft);
        if !report.is_valid() {
            return Err(CatalogError::Invalid(report));
        }
        if draft.id.trim().is_empty() || self.id_taken(&draft.id) {
            draft.id = self.generate_id(&draft.name);
        }

        let mut tours = self.user.clone();
        tours.push(draft.clone());
        self.commit(tours)?;
        tracing::debug!(tour = %draft.id, "tour created");
        Ok(draft)
    }

    /// Replace the user-authored tour `id` with `tour`, keeping the id.
    pub fn update_tour(&mut self, id: &str, mut tour: Tour) -> Result<Option<Tour>, CatalogError> {
        let Some(index) = self.user_index(id) else {
            return Ok(None);
        };
        let report = validate_tour(&tour);
        if !report.is_valid() {
            return Err(CatalogError::Invalid(report));
        }
        tour.id = id.to_owned();

        let mut tours = self.user.clone();
        tours[index] = tour.clone();
        self.commit(tours)?;
        tracing::debug!(tour = id, "tour updated");
        Ok(Some(tour))
    }

    /// Remove the user-authored tour `id`. Returns `false` if there was none.
    pub fn delete_tour(&mut self, id: &str) -> Result<bool, CatalogError> {
        let Some(index) = self.user_index(id) else {
            return Ok(false);
        };
        let mut tours = self.user.clone();
        tours.remove(index);
        self.commit(tours)?;
        tracing::debug!(tour = id, "tour deleted");
        Ok(true)
    }

    /// Copy any tour (built-in or user-authored) into a new user-authored tour.
    pub fn duplicate_tour(&mut self, id: &str) -> Result<Option<Tour>, CatalogError> {
        let Some(source) = self.get(id) else {
            return Ok(None);
        };
        let mut copy = source.clone();
        copy.name.push_str(COPY_SUFFIX);
        copy.id = self.generate_id(&copy.name);

        let mut tours = self.user.clone();
        tours.push(copy.clone());
        self.commit(tours)?;
        tracing::debug!(from = id, tour = %copy.id, "tour duplicated");
        Ok(Some(copy))
    }

    /// User-authored tours as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.user)?)
    }

    /// Import tours from a JSON array.
    ///
    /// Malformed input imports nothing. Each tour is validated on its own;
    /// invalid ones are counted as rejected. Imported tours whose id is
    /// blank or already taken get a fresh id.
    pub fn import_json(&mut self, json: &str) -> Result<ImportOutcome, CatalogError> {
        let incoming: Vec<Tour> = match serde_json::from_str(json) {
            Ok(tours) => tours,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed tour import");
                return Ok(ImportOutcome::default());
            }
        };

        let mut outcome = ImportOutcome::default();
        let mut tours = self.user.clone();
        for mut tour in incoming {
            if !validate_tour(&tour).is_valid() {
                outcome.rejected += 1;
                continue;
            }
            let taken = |id: &str| self.id_taken(id) || tours.iter().any(|t| t.id == id);
            if tour.id.trim().is_empty() || taken(&tour.id) {
                tour.id = unique_id(&tour.name, taken);
            }
            tours.push(tour);
            outcome.imported += 1;
        }

        if outcome.imported > 0 {
            self.commit(tours)?;
        }
        tracing::debug!(
            imported = outcome.imported,
            rejected = outcome.rejected,
            "tour import finished"
        );
        Ok(outcome)
    }

    fn commit(&mut self, tours: Vec<Tour>) -> Result<(), CatalogError> {
        let json = serde_json::to_string(&tours)?;
        self.store.set(USER_TOURS_KEY, &json)?;
        self.user = tours;
        Ok(())
    }

    fn user_index(&self, id: &str) -> Option<usize> {
        self.user.iter().position(|tour| tour.id == id)
    }

    fn id_taken(&self, id: &str) -> bool {
        self.built_in
            .iter()
            .chain(self.user.iter())
            .any(|tour| tour.id == id)
    }

    fn generate_id(&self, name: &str) -> String {
        unique_id(name, |id| self.id_taken(id))
    }
}

/// `custom-<slug>`, suffixed `-2`, `-3`, ... until `taken` says no.
fn unique_id(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let slug = slugify(name);
    let base = if slug.is_empty() {
        format!("{ID_PREFIX}-tour")
    } else {
        format!("{ID_PREFIX}-{slug}")
    };
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_sep = true;
    for ch in input.chars() {
        let c = ch.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('-');
            last_was_sep = true;
        }
    }
    out.trim_matches('-').to_string()
}
