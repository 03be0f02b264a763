use std::fmt;

use rusqlite::Connection;
use tracing::debug;

use crate::categories::find_by_name;
use crate::classifier::{Prediction, TextClassifier};
use crate::error::Result;
use crate::ledger::latest_category_for;
use crate::models::{Category, CategorySource, DraftEntry};
use crate::training::exact_verified_match;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Why a description ended up without a category.
#[derive(Debug, Clone, PartialEq)]
pub enum Unresolved {
    /// Blank description; nothing to look up.
    NoMatch,
    NoModel,
    BelowThreshold(f64),
    /// The classifier named a category this owner cannot see (or that no
    /// longer exists).
    UnknownLabel(String),
    ClassifierFault(String),
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "nothing to match"),
            Self::NoModel => write!(f, "no trained model"),
            Self::BelowThreshold(c) => write!(f, "low confidence ({:.0}%)", c * 100.0),
            Self::UnknownLabel(name) => write!(f, "predicted unknown category '{name}'"),
            Self::ClassifierFault(reason) => write!(f, "classifier error: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub category: Option<Category>,
    pub confidence: f64,
    pub source: CategorySource,
    pub unresolved: Option<Unresolved>,
}

impl Resolution {
    fn hit(category: Category, confidence: f64, source: CategorySource) -> Self {
        Self {
            category: Some(category),
            confidence,
            source,
            unresolved: None,
        }
    }

    fn miss(reason: Unresolved) -> Self {
        Self {
            category: None,
            confidence: 0.0,
            source: CategorySource::None,
            unresolved: Some(reason),
        }
    }

    pub fn apply_to(&self, draft: &mut DraftEntry) {
        draft.category = self.category.as_ref().map(Category::to_ref);
        draft.confidence = self.confidence;
        draft.category_source = self.source;
    }
}

/// The probabilistic last tier. Implementations never fail; faults come
/// back as `Prediction::Failed`.
pub trait CategoryPredictor {
    fn predict_category(&self, conn: &Connection, text: &str) -> Prediction;
}

impl CategoryPredictor for TextClassifier {
    fn predict_category(&self, conn: &Connection, text: &str) -> Prediction {
        self.predict(conn, text)
    }
}

/// Tiered category lookup for one owner: verified exact example, then the
/// owner's history, then the classifier. The first tier that answers wins.
pub struct CategoryResolver<'a> {
    conn: &'a Connection,
    classifier: &'a dyn CategoryPredictor,
    owner: &'a str,
    threshold: f64,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(conn: &'a Connection, classifier: &'a dyn CategoryPredictor, owner: &'a str) -> Self {
        Self {
            conn,
            classifier,
            owner,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Database faults propagate; classifier faults become `Unresolved`.
    pub fn resolve(&self, description: &str) -> Result<Resolution> {
        if description.trim().is_empty() {
            return Ok(Resolution::miss(Unresolved::NoMatch));
        }

        if let Some(category) = exact_verified_match(self.conn, self.owner, description)? {
            debug!(description, category = %category.name, "trained exact match");
            return Ok(Resolution::hit(category, 1.0, CategorySource::TrainedExact));
        }

        if let Some(category) = latest_category_for(self.conn, self.owner, description)? {
            debug!(description, category = %category.name, "history match");
            return Ok(Resolution::hit(category, 1.0, CategorySource::History));
        }

        match self.classifier.predict_category(self.conn, description) {
            Prediction::Label { category, confidence } => {
                if confidence <= self.threshold {
                    debug!(description, %category, confidence, "prediction below threshold");
                    return Ok(Resolution::miss(Unresolved::BelowThreshold(confidence)));
                }
                match find_by_name(self.conn, self.owner, &category)? {
                    Some(found) => Ok(Resolution::hit(found, confidence, CategorySource::Classifier)),
                    None => Ok(Resolution::miss(Unresolved::UnknownLabel(category))),
                }
            }
            Prediction::NoModel => Ok(Resolution::miss(Unresolved::NoModel)),
            Prediction::Failed(reason) => Ok(Resolution::miss(Unresolved::ClassifierFault(reason))),
        }
    }

    /// Fill in the category of every draft. A category named by the source
    /// file is taken as a manual choice when it exists; otherwise the tiers
    /// run. Returns one resolution per draft.
    pub fn resolve_drafts(&self, drafts: &mut [DraftEntry]) -> Result<Vec<Resolution>> {
        let mut resolutions = Vec::with_capacity(drafts.len());
        for draft in drafts.iter_mut() {
            let named = match draft.category_hint.take() {
                Some(hint) => {
                    let found = find_by_name(self.conn, self.owner, &hint)?;
                    if found.is_none() {
                        debug!(%hint, "category from file not found, resolving");
                    }
                    found
                }
                None => None,
            };
            let resolution = match named {
                Some(category) => Resolution::hit(category, 1.0, CategorySource::Manual),
                None => self.resolve(&draft.description)?,
            };
            resolution.apply_to(draft);
            resolutions.push(resolution);
        }
        Ok(resolutions)
    }
}
