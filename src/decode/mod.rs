//! Pure transforms from untyped JSON trees to typed domain entities.
//!
//! Fields with more than one valid wire representation are told apart by
//! inspecting their structure. No payload type flag is ever consulted.
//!
//! Every failure is a [`DecodeError`] whose context is the JSON path of the
//! offending node, rooted at `$`. A missing required field always fails; there
//! is no zero or empty substitution.

mod cursor;
mod priority;
mod project;

use serde_json::Value;

use crate::error::DecodeError;
use crate::models::*;

use cursor::Cursor;

/// Decode a `priorities` array.
///
/// When every element is int-convertible the array is a list of indexes into
/// `catalog`; an index the catalog does not know is logged and dropped.
/// Otherwise every element must be a full priority object. An array mixing
/// both shapes is rejected.
pub fn decode_priorities(
    node: &Value,
    catalog: &PriorityCatalog,
) -> Result<Vec<PriorityRef>, DecodeError> {
    priority::priorities_at(&Cursor::root(node), catalog)
}

pub fn decode_measured_goal(node: &Value) -> Result<MeasuredGoal, DecodeError> {
    project::measured_goal_at(&Cursor::root(node))
}

pub fn decode_failure(node: &Value) -> Result<Failure, DecodeError> {
    project::failure_at(&Cursor::root(node))
}

/// Decode a `completion` object. All of `days`, `weeks`, `months` and `years`
/// are required.
pub fn decode_completion(node: &Value) -> Result<MeasuredSet<i64>, DecodeError> {
    project::completion_at(&Cursor::root(node))
}

/// Decode underlying categories. Yields nothing unless the node carries both
/// a non-null `uuid` and `priorities`; an array of such nodes is flattened.
/// Empty `{}` entries are skipped, and `tble` / `wght` are accepted for
/// `table` / `weight`.
pub fn decode_underlying_categories(node: &Value) -> Result<Vec<UnderlyingCategory>, DecodeError> {
    project::underlying_categories_at(&Cursor::root(node))
}

pub fn decode_core_project(
    node: &Value,
    catalog: &PriorityCatalog,
) -> Result<CoreProject, DecodeError> {
    project::core_project_at(&Cursor::root(node), catalog)
}

/// Decode a project document. `parentProjects` stays `None` when the document
/// does not carry it (or carries `null`).
pub fn decode_project(node: &Value, catalog: &PriorityCatalog) -> Result<Project, DecodeError> {
    project::project_at(&Cursor::root(node), catalog)
}

/// Decode a bare array of core project documents with unique ids.
pub fn decode_core_projects(
    node: &Value,
    catalog: &PriorityCatalog,
) -> Result<Vec<CoreProject>, DecodeError> {
    project::list_at(&Cursor::root(node), |c| project::core_project_at(c, catalog))
}

/// Decode a bare array of project documents with unique ids.
pub fn decode_projects(
    node: &Value,
    catalog: &PriorityCatalog,
) -> Result<Vec<Project>, DecodeError> {
    project::list_at(&Cursor::root(node), |c| project::project_at(c, catalog))
}

/// Decode the personal-info payload, either a single-element array or a bare
/// object.
pub fn decode_user_profile(node: &Value) -> Result<UserProfile, DecodeError> {
    project::user_profile_at(&Cursor::root(node))
}
