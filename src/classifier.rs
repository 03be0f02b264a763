//! Text-to-category classifier.
//!
//! Descriptions are segmented into words (plus character bigrams for scripts
//! written without spaces) and counted by a `CountVectorizer` over the
//! vocabulary seen at fit time. Each label gets a one-vs-rest linear SVM whose
//! margins are Platt-scaled into probabilities by `linfa-svm`.
//!
//! Training always refits from the whole corpus; there is no incremental
//! update. The fitted model is persisted as JSON and swapped into the running
//! [`TextClassifier`] as a whole.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use linfa::dataset::Pr;
use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_preprocessing::{CountVectorizer, CountVectorizerParams};
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MoneyError, Result};
use crate::segmenter::Segmenter;

pub const MODEL_FORMAT_VERSION: u32 = 2;

/// Source of labeled `(text, category name)` pairs.
pub trait TrainingCorpus {
    fn labeled_texts(&self) -> Result<Vec<(String, String)>>;
}

impl TrainingCorpus for [(String, String)] {
    fn labeled_texts(&self) -> Result<Vec<(String, String)>> {
        Ok(self.to_vec())
    }
}

impl TrainingCorpus for Vec<(String, String)> {
    fn labeled_texts(&self) -> Result<Vec<(String, String)>> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// SVM regularisation constant.
    pub c: f64,
    /// Solver stopping tolerance.
    pub eps: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self { c: 1.0, eps: 1e-3 }
    }
}

// ---------------------------------------------------------------------------
// Fitted model
// ---------------------------------------------------------------------------

/// On-disk form of a fitted model.
#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    generation: u64,
    trained_at: String,
    sample_count: usize,
    labels: Vec<String>,
    lexicon: Vec<String>,
    vocabulary: Vec<String>,
    /// One probability-calibrated machine per label, in label order.
    machines: Vec<Svm<f64, Pr>>,
}

pub struct ClassifierModel {
    artifact: ModelArtifact,
    segmenter: Segmenter,
    // CountVectorizer compiles its split regex lazily behind a RefCell.
    vectorizer: Mutex<CountVectorizer>,
}

impl std::fmt::Debug for ClassifierModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierModel")
            .field("generation", &self.artifact.generation)
            .field("labels", &self.artifact.labels)
            .field("vocabulary", &self.artifact.vocabulary.len())
            .finish_non_exhaustive()
    }
}

/// Why fitting produced no model.
#[derive(Debug, Clone, PartialEq)]
pub enum NoModelReason {
    EmptyCorpus,
    SingleLabel(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// The corpus cannot support a discriminative model.
    NoModel(NoModelReason),
    /// The vectorizer or a solver rejected the data.
    Solver(String),
}

impl From<NoModelReason> for FitError {
    fn from(reason: NoModelReason) -> Self {
        FitError::NoModel(reason)
    }
}

/// Whitespace-separated tokens, counted as-is: the segmenter has already
/// lowercased them and NFKD would split Thai vowels.
fn vectorizer_params() -> CountVectorizerParams {
    CountVectorizer::params()
        .split_regex(r"\S+")
        .convert_to_lowercase(false)
        .normalize(false)
}

/// Vectorizer whose column `i` is `vocabulary[i]`.
fn vectorizer_for(vocabulary: &[String]) -> std::result::Result<CountVectorizer, String> {
    vectorizer_params()
        .fit_vocabulary(vocabulary)
        .map_err(|e| e.to_string())
}

/// Per-side costs `C * n / (2 * count(side))`, so a rare label weighs as much
/// in total as the rest of the corpus.
fn balanced_weights(positives: usize, total: usize, c: f64) -> (f64, f64) {
    let n = total as f64;
    let pos = positives.max(1) as f64;
    let neg = (total - positives).max(1) as f64;
    (c * n / (2.0 * pos), c * n / (2.0 * neg))
}

impl ClassifierModel {
    /// Fit vectorizer, SVMs and calibration on the full corpus.
    pub fn fit(
        examples: &[(String, String)],
        config: &TrainConfig,
    ) -> std::result::Result<ClassifierModel, FitError> {
        let examples: Vec<&(String, String)> = examples
            .iter()
            .filter(|(text, label)| !text.trim().is_empty() && !label.trim().is_empty())
            .collect();
        if examples.is_empty() {
            return Err(NoModelReason::EmptyCorpus.into());
        }

        let labels: Vec<String> = examples
            .iter()
            .map(|(_, label)| label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if labels.len() < 2 {
            return Err(NoModelReason::SingleLabel(labels[0].clone()).into());
        }

        let segmenter = Segmenter::from_corpus(examples.iter().map(|(text, _)| text.as_str()));
        let documents: Array1<String> = examples
            .iter()
            .map(|(text, _)| segmenter.tokenize(text).join(" "))
            .collect();

        let fitted = vectorizer_params()
            .fit(&documents)
            .map_err(|e| FitError::Solver(e.to_string()))?;
        let mut vocabulary = fitted.vocabulary().clone();
        vocabulary.sort();
        let vectorizer = vectorizer_for(&vocabulary).map_err(FitError::Solver)?;
        let records: Array2<f64> = vectorizer.transform(&documents).to_dense().mapv(|c| c as f64);

        let mut machines = Vec::with_capacity(labels.len());
        for label in &labels {
            let targets: Array1<bool> = examples.iter().map(|(_, l)| l == label).collect();
            let positives = targets.iter().filter(|t| **t).count();
            let (c_pos, c_neg) = balanced_weights(positives, targets.len(), config.c);
            let dataset = DatasetBase::new(records.clone(), targets);
            let machine = Svm::<f64, Pr>::params()
                .linear_kernel()
                .pos_neg_weights(c_pos, c_neg)
                .eps(config.eps)
                .fit(&dataset)
                .map_err(|e| FitError::Solver(format!("{label}: {e}")))?;
            debug!(%label, positives, "fitted one-vs-rest machine");
            machines.push(machine);
        }

        Ok(ClassifierModel {
            artifact: ModelArtifact {
                format_version: MODEL_FORMAT_VERSION,
                generation: 0,
                trained_at: chrono::Utc::now().to_rfc3339(),
                sample_count: examples.len(),
                labels,
                lexicon: segmenter.lexicon(),
                vocabulary,
                machines,
            },
            segmenter,
            vectorizer: Mutex::new(vectorizer),
        })
    }

    fn from_artifact(artifact: ModelArtifact) -> std::result::Result<Self, String> {
        if artifact.format_version != MODEL_FORMAT_VERSION {
            return Err(format!(
                "model format {} does not match {}",
                artifact.format_version, MODEL_FORMAT_VERSION
            ));
        }
        if artifact.labels.len() < 2 || artifact.machines.len() != artifact.labels.len() {
            return Err("model dimensions are inconsistent".to_string());
        }
        let vectorizer = vectorizer_for(&artifact.vocabulary)?;
        let segmenter = Segmenter::from_lexicon(artifact.lexicon.clone());
        Ok(Self {
            artifact,
            segmenter,
            vectorizer: Mutex::new(vectorizer),
        })
    }

    pub fn load(path: &Path) -> std::result::Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let artifact: ModelArtifact = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Self::from_artifact(artifact)
    }

    /// Write to a sibling temp file, then rename over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string(&self.artifact)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn labels(&self) -> &[String] {
        &self.artifact.labels
    }

    pub fn sample_count(&self) -> usize {
        self.artifact.sample_count
    }

    pub fn generation(&self) -> u64 {
        self.artifact.generation
    }

    pub fn trained_at(&self) -> &str {
        &self.artifact.trained_at
    }

    fn features(&self, text: &str) -> Array2<f64> {
        let document: Array1<String> = Array1::from(vec![self.segmenter.tokenize(text).join(" ")]);
        let vectorizer = self
            .vectorizer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        vectorizer.transform(&document).to_dense().mapv(|c| c as f64)
    }

    /// Calibrated probability per label, normalised to sum to one.
    pub fn probabilities(&self, text: &str) -> std::result::Result<Vec<f64>, String> {
        let features = self.features(text);
        let mut probs = Vec::with_capacity(self.artifact.machines.len());
        for machine in &self.artifact.machines {
            let scored: Array1<Pr> = machine.predict(&features);
            let p = scored.get(0).ok_or("empty prediction")?;
            probs.push(f64::from(**p));
        }
        let total: f64 = probs.iter().sum();
        if !total.is_finite() {
            return Err("non-finite class scores".to_string());
        }
        if total <= 0.0 {
            let uniform = 1.0 / probs.len() as f64;
            probs.iter_mut().for_each(|p| *p = uniform);
        } else {
            probs.iter_mut().for_each(|p| *p /= total);
        }
        Ok(probs)
    }

    pub fn predict(&self, text: &str) -> std::result::Result<(String, f64), String> {
        let probs = self.probabilities(text)?;
        let (best, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });
        Ok((self.artifact.labels[best].clone(), confidence.clamp(0.0, 1.0)))
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Label { category: String, confidence: f64 },
    /// No model could be built (empty or single-label corpus).
    NoModel,
    /// Something went wrong while scoring; treated as no prediction.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    Trained { samples: usize, classes: usize, generation: u64 },
    Cleared(NoModelReason),
}

/// Loaded model slot: `None` until first use, then `Some(None)` when the
/// corpus yields no model.
type ModelSlot = Option<Option<Arc<ClassifierModel>>>;

/// Process-wide classifier handle. Readers clone an `Arc` under a read lock;
/// retraining is serialised by `train_lock` and swaps the model in one write.
pub struct TextClassifier {
    artifact_path: PathBuf,
    config: TrainConfig,
    state: RwLock<ModelSlot>,
    train_lock: Mutex<()>,
    retrains: AtomicU64,
}

impl TextClassifier {
    pub fn new(artifact_path: PathBuf) -> Self {
        Self::with_config(artifact_path, TrainConfig::default())
    }

    pub fn with_config(artifact_path: PathBuf, config: TrainConfig) -> Self {
        Self {
            artifact_path,
            config,
            state: RwLock::new(None),
            train_lock: Mutex::new(()),
            retrains: AtomicU64::new(0),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Number of retrains this handle has performed.
    pub fn retrain_count(&self) -> u64 {
        self.retrains.load(Ordering::SeqCst)
    }

    fn read_slot(&self) -> ModelSlot {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn swap(&self, model: Option<Arc<ClassifierModel>>) {
        let mut slot = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(model);
    }

    /// The current model, loading the artifact or training from `corpus` on
    /// first use.
    pub fn current(&self, corpus: &dyn TrainingCorpus) -> Option<Arc<ClassifierModel>> {
        if let Some(model) = self.read_slot() {
            return model;
        }
        let _guard = self
            .train_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(model) = self.read_slot() {
            return model;
        }

        match ClassifierModel::load(&self.artifact_path) {
            Ok(model) => {
                debug!(path = %self.artifact_path.display(), "loaded classifier artifact");
                let model = Arc::new(model);
                self.swap(Some(model.clone()));
                Some(model)
            }
            Err(reason) => {
                if self.artifact_path.exists() {
                    warn!(%reason, "classifier artifact unusable, retraining");
                }
                if let Err(e) = self.retrain_locked(corpus, 0) {
                    warn!(error = %e, "lazy classifier training failed");
                    self.swap(None);
                }
                self.read_slot().flatten()
            }
        }
    }

    /// Never fails: faults come back as `Prediction::Failed`.
    pub fn predict(&self, corpus: &dyn TrainingCorpus, text: &str) -> Prediction {
        let Some(model) = self.current(corpus) else {
            return Prediction::NoModel;
        };
        match model.predict(text) {
            Ok((category, confidence)) => {
                debug!(text, %category, confidence, "classifier prediction");
                Prediction::Label { category, confidence }
            }
            Err(reason) => {
                warn!(text, %reason, "classifier prediction failed");
                Prediction::Failed(reason)
            }
        }
    }

    /// Refit from the complete corpus and replace the current model.
    pub fn retrain(&self, corpus: &dyn TrainingCorpus) -> Result<TrainOutcome> {
        let _guard = self
            .train_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = match self.read_slot() {
            Some(loaded) => loaded.map_or(0, |m| m.generation()),
            None => ClassifierModel::load(&self.artifact_path).map_or(0, |m| m.generation()),
        };
        self.retrain_locked(corpus, previous)
    }

    fn retrain_locked(&self, corpus: &dyn TrainingCorpus, previous_generation: u64) -> Result<TrainOutcome> {
        let examples = corpus.labeled_texts()?;
        info!(samples = examples.len(), "retraining classifier");
        self.retrains.fetch_add(1, Ordering::SeqCst);

        match ClassifierModel::fit(&examples, &self.config) {
            Ok(mut model) => {
                model.artifact.generation = previous_generation + 1;
                let outcome = TrainOutcome::Trained {
                    samples: model.sample_count(),
                    classes: model.labels().len(),
                    generation: model.generation(),
                };
                let model = Arc::new(model);
                self.swap(Some(model.clone()));
                model
                    .save(&self.artifact_path)
                    .map_err(|e| MoneyError::Training(format!("could not save model: {e}")))?;
                info!(?outcome, "classifier retrained");
                Ok(outcome)
            }
            Err(FitError::Solver(reason)) => Err(MoneyError::Training(reason)),
            Err(FitError::NoModel(reason)) => {
                info!(?reason, "no classifier model for current corpus");
                self.swap(None);
                match std::fs::remove_file(&self.artifact_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(MoneyError::Training(format!("could not remove model: {e}"))),
                }
                Ok(TrainOutcome::Cleared(reason))
            }
        }
    }
}
