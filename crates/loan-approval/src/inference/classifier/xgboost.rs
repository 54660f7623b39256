//! Subset of the XGBoost JSON model document needed for binary inference.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct ModelDocument {
    pub(super) learner: Learner,
}

#[derive(Debug, Deserialize)]
pub(super) struct Learner {
    #[serde(default)]
    pub(super) feature_names: Vec<String>,
    pub(super) gradient_booster: GradientBooster,
    pub(super) learner_model_param: LearnerModelParam,
    pub(super) objective: Objective,
}

#[derive(Debug, Deserialize)]
pub(super) struct GradientBooster {
    pub(super) name: String,
    pub(super) model: BoosterModel,
}

#[derive(Debug, Deserialize)]
pub(super) struct BoosterModel {
    pub(super) trees: Vec<TreeDocument>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LearnerModelParam {
    pub(super) base_score: String,
    #[serde(default)]
    pub(super) num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Objective {
    pub(super) name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TreeDocument {
    pub(super) left_children: Vec<i32>,
    pub(super) right_children: Vec<i32>,
    pub(super) split_indices: Vec<u32>,
    pub(super) split_conditions: Vec<f32>,
    #[serde(deserialize_with = "flags")]
    pub(super) default_left: Vec<bool>,
}

/// `default_left` is written as 0/1 integers by some releases and booleans by others.
fn flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    let raw = Vec::<Flag>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|flag| match flag {
            Flag::Bool(value) => Ok(value),
            Flag::Int(0) => Ok(false),
            Flag::Int(1) => Ok(true),
            Flag::Int(other) => Err(de::Error::custom(format!(
                "default_left entries must be 0 or 1, found {other}"
            ))),
        })
        .collect()
}

/// Parses `base_score`, which newer releases wrap in brackets (`"[5E-1]"`).
pub(super) fn parse_base_score(raw: &str) -> Option<f32> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let first = trimmed.split(',').next()?.trim();
    first.parse::<f32>().ok().filter(|value| value.is_finite())
}
