//! Frozen gradient-boosted tree ensemble for the binary approval decision.

mod tree;
mod xgboost;

pub use tree::{Node, RegressionTree};

use std::io::Read;
use std::path::Path;

use super::artifacts::{ArtifactKind, ArtifactLoadError};
use super::domain::{FeatureVector, LoanDecision, PredictionResult};
use xgboost::{parse_base_score, ModelDocument};

/// Probabilities strictly above this value predict the positive class.
pub const DECISION_THRESHOLD: f32 = 0.5;

const SUPPORTED_OBJECTIVE: &str = "binary:logistic";

#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedClassifier {
    feature_names: Vec<String>,
    base_score: f32,
    base_margin: f32,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedClassifier {
    /// `base_score` is the prior approval probability the ensemble boosts from.
    pub fn new(
        feature_names: Vec<String>,
        base_score: f32,
        trees: Vec<RegressionTree>,
    ) -> Result<Self, ArtifactLoadError> {
        if feature_names.is_empty() {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Classifier,
                "model does not declare feature names",
            ));
        }
        if trees.is_empty() {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Classifier,
                "model has no trees",
            ));
        }
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Classifier,
                format!("base_score {base_score} is not a probability in (0, 1)"),
            ));
        }

        Ok(Self {
            feature_names,
            base_score,
            base_margin: -(1.0f32 / base_score - 1.0).ln(),
            trees,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactLoadError> {
        let file = ArtifactLoadError::open(ArtifactKind::Classifier, path.as_ref())?;
        Self::from_reader(file)
    }

    /// Reads a model saved in the XGBoost JSON format.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactLoadError> {
        let document: ModelDocument =
            serde_json::from_reader(reader).map_err(|source| ArtifactLoadError::Json {
                artifact: ArtifactKind::Classifier,
                source,
            })?;
        let learner = document.learner;

        if learner.objective.name != SUPPORTED_OBJECTIVE {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Classifier,
                format!(
                    "objective '{}' is not supported, expected {SUPPORTED_OBJECTIVE}",
                    learner.objective.name
                ),
            ));
        }
        if learner.gradient_booster.name != "gbtree" {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Classifier,
                format!("booster '{}' is not supported", learner.gradient_booster.name),
            ));
        }

        let feature_count = learner.feature_names.len();
        if let Some(declared) = learner.learner_model_param.num_feature.as_deref() {
            if declared.trim().parse::<usize>().ok() != Some(feature_count) {
                return Err(ArtifactLoadError::invalid(
                    ArtifactKind::Classifier,
                    format!("num_feature {declared} disagrees with {feature_count} feature names"),
                ));
            }
        }

        let base_score =
            parse_base_score(&learner.learner_model_param.base_score).ok_or_else(|| {
                ArtifactLoadError::invalid(
                    ArtifactKind::Classifier,
                    format!(
                        "unreadable base_score '{}'",
                        learner.learner_model_param.base_score
                    ),
                )
            })?;

        let trees = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| {
                let len = tree.left_children.len();
                if tree.right_children.len() != len
                    || tree.split_indices.len() != len
                    || tree.split_conditions.len() != len
                    || tree.default_left.len() != len
                {
                    return Err(format!("tree {i} has node arrays of different lengths"));
                }

                let nodes = (0..len)
                    .map(|n| Node {
                        left: tree.left_children[n],
                        right: tree.right_children[n],
                        feature_idx: tree.split_indices[n],
                        condition: tree.split_conditions[n],
                        default_left: tree.default_left[n],
                    })
                    .collect();
                RegressionTree::new(nodes, feature_count).map_err(|err| format!("tree {i}: {err}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| ArtifactLoadError::invalid(ArtifactKind::Classifier, reason))?;

        Self::new(learner.feature_names, base_score, trees)
    }

    /// Declared column order every feature vector must follow.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Raw log-odds: the base margin plus every tree's leaf weight.
    pub fn margin(&self, features: &[f32]) -> f32 {
        self.trees
            .iter()
            .fold(self.base_margin, |sum, tree| sum + tree.leaf_value(features))
    }

    /// Positive-class probability for an already ordered and scaled vector.
    pub fn probability(&self, features: &FeatureVector) -> f32 {
        sigmoid(self.margin(features.as_slice()))
    }

    pub fn predict(&self, features: &FeatureVector) -> PredictionResult {
        let probability = self.probability(features);
        let class = u8::from(probability > DECISION_THRESHOLD);

        PredictionResult {
            label: LoanDecision::from_class(class),
            probability,
        }
    }
}

fn sigmoid(margin: f32) -> f32 {
    1.0 / (1.0 + (-margin).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn single_leaf(weight: f32) -> RegressionTree {
        RegressionTree::new(vec![Node::leaf(weight)], 1).expect("leaf tree")
    }

    fn classifier(weights: &[f32]) -> GradientBoostedClassifier {
        GradientBoostedClassifier::new(
            vec!["credit_score".to_string()],
            0.5,
            weights.iter().copied().map(single_leaf).collect(),
        )
        .expect("classifier builds")
    }

    #[test]
    fn probability_at_threshold_is_rejected() {
        let model = classifier(&[0.0]);
        let result = model.predict(&FeatureVector::new(vec![0.0]));
        assert_eq!(result.probability, 0.5);
        assert_eq!(result.label, LoanDecision::Rejected);
    }

    #[test]
    fn label_follows_probability_threshold() {
        for weight in [-3.0, -0.01, 0.01, 2.5] {
            let result = classifier(&[weight]).predict(&FeatureVector::new(vec![1.0]));
            assert!((0.0..=1.0).contains(&result.probability));
            assert_eq!(result.is_approved(), result.probability > DECISION_THRESHOLD);
        }
    }

    #[test]
    fn base_score_shifts_the_margin() {
        let model = GradientBoostedClassifier::new(
            vec!["credit_score".to_string()],
            0.25,
            vec![single_leaf(0.0)],
        )
        .expect("classifier builds");
        let probability = model.probability(&FeatureVector::new(vec![0.0]));
        assert!((probability - 0.25).abs() < 1e-6);
    }

    #[test]
    fn rejects_degenerate_base_score() {
        let result =
            GradientBoostedClassifier::new(vec!["a".to_string()], 1.0, vec![single_leaf(0.0)]);
        assert!(matches!(result, Err(ArtifactLoadError::Invalid { .. })));
    }

    #[test]
    fn rejects_unsupported_objective() {
        let document = r#"{
            "learner": {
                "feature_names": ["credit_score"],
                "gradient_booster": {"name": "gbtree", "model": {"trees": []}},
                "learner_model_param": {"base_score": "5E-1", "num_feature": "1"},
                "objective": {"name": "reg:squarederror"}
            }
        }"#;
        let error =
            GradientBoostedClassifier::from_reader(Cursor::new(document)).expect_err("objective");
        assert!(error.to_string().contains("reg:squarederror"));
    }

    #[test]
    fn reads_xgboost_json_trees() {
        let document = r#"{
            "learner": {
                "feature_names": ["credit_score"],
                "gradient_booster": {
                    "name": "gbtree",
                    "model": {
                        "trees": [{
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [0, 0, 0],
                            "split_conditions": [0.0, -1.0, 1.0],
                            "default_left": [0, 0, 0]
                        }]
                    }
                },
                "learner_model_param": {"base_score": "[5E-1]", "num_feature": "1"},
                "objective": {"name": "binary:logistic"}
            },
            "version": [2, 1, 0]
        }"#;
        let model = GradientBoostedClassifier::from_reader(Cursor::new(document))
            .expect("model loads");

        assert_eq!(model.tree_count(), 1);
        assert_eq!(model.margin(&[-0.5]), -1.0);
        assert_eq!(model.margin(&[0.5]), 1.0);
        assert_eq!(
            model.predict(&FeatureVector::new(vec![0.5])).label,
            LoanDecision::Approved
        );
    }
}
