use serde::Serialize;

use super::{PriorityCatalog, PriorityRef};

/// Personal info of a user, as returned by the personal-info endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub complete_name: String,
    pub preferred_name: String,
    pub age: i32,
    pub email: String,
    pub priorities: Vec<PriorityRef>,
}

impl UserProfile {
    /// The user's priorities as a lookup catalog.
    pub fn catalog(&self) -> PriorityCatalog {
        self.priorities.iter().cloned().collect()
    }
}
