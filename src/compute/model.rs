// Classifier Definitions and Model Artifacts

use crate::error::{CkdError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A binary classifier over a fixed-width numeric row.
pub trait Classifier: Send + Sync {
    /// Estimator name reported by `/model-info`
    fn model_type(&self) -> &'static str;

    /// Number of input columns the classifier was fitted on
    fn n_features(&self) -> usize;

    /// Class labels in probability-column order
    fn classes(&self) -> &[i64];

    /// Predict the class label for one row
    fn predict(&self, row: &[f64]) -> Result<i64>;
}

/// A classifier that can also report per-class probabilities.
pub trait ProbabilisticClassifier: Classifier {
    /// Per-class probabilities, aligned with [`Classifier::classes`]
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>>;

    /// View as the plain label-predicting interface
    fn as_classifier(&self) -> &dyn Classifier;
}

/// What a loaded model can do, resolved once at load time.
pub enum ModelCapability {
    /// Exposes class probabilities
    Probabilistic(Box<dyn ProbabilisticClassifier>),
    /// Only predicts discrete labels
    LabelOnly(Box<dyn Classifier>),
}

impl ModelCapability {
    /// Label-predicting view, available for every capability
    pub fn classifier(&self) -> &dyn Classifier {
        match self {
            ModelCapability::Probabilistic(model) => model.as_classifier(),
            ModelCapability::LabelOnly(model) => model.as_ref(),
        }
    }

    pub fn is_probabilistic(&self) -> bool {
        matches!(self, ModelCapability::Probabilistic(_))
    }
}

impl std::fmt::Debug for ModelCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_probabilistic() {
            "Probabilistic"
        } else {
            "LabelOnly"
        };
        f.debug_struct("ModelCapability")
            .field("kind", &kind)
            .field("model_type", &self.classifier().model_type())
            .finish()
    }
}

/// A validated, ready-to-serve model plus where it came from.
#[derive(Debug)]
pub struct LoadedModel {
    /// Inference capability
    pub capability: ModelCapability,
    /// Artifact version string
    pub version: String,
    /// Column names the model was fitted with, when recorded
    pub feature_names: Option<Vec<String>>,
    /// File the model was read from
    pub source: PathBuf,
    /// When the model was loaded
    pub loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn classifier(&self) -> &dyn Classifier {
        self.capability.classifier()
    }

    pub fn model_type(&self) -> &'static str {
        self.classifier().model_type()
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

/// On-disk JSON form of a fitted classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact version
    #[serde(default = "default_version")]
    pub version: String,
    /// Training column order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    /// Class labels
    pub classes: Vec<i64>,
    /// Input width
    pub n_features: usize,
    /// Estimator parameters
    #[serde(flatten)]
    pub estimator: Estimator,
}

/// Supported estimator kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Bagged decision trees with leaf class counts
    RandomForest { trees: Vec<DecisionTree> },
    /// Binary logistic regression
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
    /// Linear support vector classifier (labels only)
    LinearSvc { coefficients: Vec<f64>, intercept: f64 },
}

/// A single tree stored as a flat node array rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Rows with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class sample counts (or weights)
    Leaf { value: Vec<f64> },
}

impl ModelArtifact {
    /// Read and parse an artifact without validating it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CkdError::InvalidModel(format!("{}: {}", path.display(), e)))
    }

    /// Structural checks that make inference infallible apart from row shape.
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(invalid("n_features must be non-zero"));
        }
        if self.classes.is_empty() || self.classes.len() > 2 {
            return Err(invalid(format!(
                "expected 1 or 2 classes, found {}",
                self.classes.len()
            )));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Err(invalid(format!(
                    "{} feature names for {} features",
                    names.len(),
                    self.n_features
                )));
            }
        }

        match &self.estimator {
            Estimator::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(invalid("random forest has no trees"));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(self.n_features, self.classes.len())
                        .map_err(|reason| invalid(format!("tree {}: {}", i, reason)))?;
                }
            }
            Estimator::LogisticRegression { coefficients, intercept }
            | Estimator::LinearSvc { coefficients, intercept } => {
                if self.classes.len() != 2 {
                    return Err(invalid("linear models require exactly 2 classes"));
                }
                if coefficients.len() != self.n_features {
                    return Err(invalid(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        self.n_features
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(invalid("coefficients must be finite"));
                }
            }
        }

        Ok(())
    }

    /// Validate and turn the artifact into a servable model.
    pub fn into_model(self, source: impl Into<PathBuf>) -> Result<LoadedModel> {
        self.validate()?;

        let ModelArtifact {
            version,
            feature_names,
            classes,
            n_features,
            estimator,
        } = self;

        let capability = match estimator {
            Estimator::RandomForest { trees } => ModelCapability::Probabilistic(Box::new(
                RandomForest {
                    n_features,
                    classes,
                    trees,
                },
            )),
            Estimator::LogisticRegression {
                coefficients,
                intercept,
            } => ModelCapability::Probabilistic(Box::new(LogisticRegression {
                n_features,
                classes,
                coefficients,
                intercept,
            })),
            Estimator::LinearSvc {
                coefficients,
                intercept,
            } => ModelCapability::LabelOnly(Box::new(LinearSvc {
                n_features,
                classes,
                coefficients,
                intercept,
            })),
        };

        Ok(LoadedModel {
            capability,
            version,
            feature_names,
            source: source.into(),
            loaded_at: Utc::now(),
        })
    }
}

fn invalid(reason: impl Into<String>) -> CkdError {
    CkdError::InvalidModel(reason.into())
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on feature {}", idx, feature));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", idx));
                    }
                    // Children must come later in the array, which rules out cycles.
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} values for {} classes",
                            idx,
                            value.len(),
                            n_classes
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {} has a negative or non-finite value", idx));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {} is empty", idx));
                    }
                }
            }
        }
        Ok(())
    }

    /// Normalised class distribution of the leaf reached by `row`
    fn leaf_distribution(&self, row: &[f64]) -> Vec<f64> {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    return value.iter().map(|v| v / total).collect();
                }
            }
        }
    }
}

fn check_row(model_type: &str, n_features: usize, row: &[f64]) -> Result<()> {
    if row.len() != n_features {
        return Err(CkdError::Prediction(format!(
            "X has {} features, but {} is expecting {} features as input",
            row.len(),
            model_type,
            n_features
        )));
    }
    if let Some(pos) = row.iter().position(|v| !v.is_finite()) {
        return Err(CkdError::Prediction(format!(
            "Input contains a non-finite value in column {}",
            pos
        )));
    }
    Ok(())
}

/// Index of the first maximum, matching numpy's argmax tie-breaking.
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (i, &v)| {
            if v > max {
                (i, v)
            } else {
                (best, max)
            }
        })
        .0
}

fn dot(coefficients: &[f64], row: &[f64]) -> f64 {
    coefficients.iter().zip(row).map(|(w, x)| w * x).sum()
}

/// Random forest classifier
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<DecisionTree>,
}

impl Classifier for RandomForest {
    fn model_type(&self) -> &'static str {
        "RandomForestClassifier"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, row: &[f64]) -> Result<i64> {
        let proba = self.predict_proba(row)?;
        Ok(self.classes[argmax(&proba)])
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>> {
        check_row(self.model_type(), self.n_features, row)?;

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(row)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    fn as_classifier(&self) -> &dyn Classifier {
        self
    }
}

/// Logistic regression classifier
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    n_features: usize,
    classes: Vec<i64>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Classifier for LogisticRegression {
    fn model_type(&self) -> &'static str {
        "LogisticRegression"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, row: &[f64]) -> Result<i64> {
        let proba = self.predict_proba(row)?;
        Ok(self.classes[argmax(&proba)])
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>> {
        check_row(self.model_type(), self.n_features, row)?;
        let z = dot(&self.coefficients, row) + self.intercept;
        let p = 1.0 / (1.0 + (-z).exp());
        Ok(vec![1.0 - p, p])
    }

    fn as_classifier(&self) -> &dyn Classifier {
        self
    }
}

/// Linear SVC; exposes no probabilities
#[derive(Debug, Clone)]
pub struct LinearSvc {
    n_features: usize,
    classes: Vec<i64>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Classifier for LinearSvc {
    fn model_type(&self) -> &'static str {
        "LinearSVC"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, row: &[f64]) -> Result<i64> {
        check_row(self.model_type(), self.n_features, row)?;
        let decision = dot(&self.coefficients, row) + self.intercept;
        Ok(if decision > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }
}
