use serde::{Deserialize, Serialize};

use super::MeasuredSet;

/// A note recorded when a measured goal was missed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub reason: String,
    pub solution: String,
    pub description: String,
}

/// A weighted, ordered goal within a project.
///
/// Progress is tracked twice: `real` holds the continuous goal/advance pair and
/// `discrete` the countable one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredGoal {
    pub order: i32,
    pub item: String,
    pub weight: f64,
    pub real: MeasuredSet<f64>,
    pub discrete: MeasuredSet<i64>,
    pub finished: bool,
    pub failures: Vec<Failure>,
}

/// Input for recording a failure against a measured goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFailure {
    pub reason: String,
    pub solution: String,
    pub description: String,
}

/// Input for adding a measured goal to a project. Field names follow the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeasuredGoal {
    pub order: i32,
    pub item: String,
    pub weight: f64,
    pub real_goal: f64,
    pub real_advance: f64,
    pub discrete_goal: i64,
    pub discrete_advance: i64,
    pub finished: bool,
    #[serde(default)]
    pub failures: Vec<NewFailure>,
}
