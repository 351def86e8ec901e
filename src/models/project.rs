use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MeasuredGoal, MeasuredSet, NewMeasuredGoal, PriorityRef};

/// Name, category and start date of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EssentialInfo {
    pub name: String,
    /// Small integer category, `type` on the wire.
    pub kind: i32,
    pub is_favorite: bool,
    pub start_date: DateTime<Utc>,
}

/// Weighted reference from a project to a category row in another table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTag {
    pub id: i64,
    pub table: String,
    pub weight: f64,
}

/// A category a project falls under, tagged with where the category lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnderlyingCategory {
    pub project: Uuid,
    pub tag: CategoryTag,
}

/// The shared part of every project document.
///
/// The id is fixed at construction; there is no setter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreProject {
    id: Uuid,
    pub essential: EssentialInfo,
    pub priorities: Vec<PriorityRef>,
    pub measured_goals: Vec<MeasuredGoal>,
    /// Time the project needs, keyed by days, weeks, months and years.
    pub necessary_time: MeasuredSet<i64>,
    pub underlying_categories: Vec<UnderlyingCategory>,
}

impl CoreProject {
    pub fn new(
        id: Uuid,
        essential: EssentialInfo,
        priorities: Vec<PriorityRef>,
        measured_goals: Vec<MeasuredGoal>,
        necessary_time: MeasuredSet<i64>,
        underlying_categories: Vec<UnderlyingCategory>,
    ) -> Self {
        Self {
            id,
            essential,
            priorities,
            measured_goals,
            necessary_time,
            underlying_categories,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.essential.name
    }

    pub fn is_favorite(&self) -> bool {
        self.essential.is_favorite
    }
}

/// A project with its position in the project hierarchy.
///
/// `parent_projects` is `None` when the document carried no parent list at
/// all, and `Some(vec![])` when it carried an empty one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(flatten)]
    pub core: CoreProject,
    pub parent_projects: Option<Vec<Uuid>>,
}

impl Project {
    pub fn id(&self) -> Uuid {
        self.core.id()
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }
}

/// Entities cached by the fetch coordinator, indexed by their own id.
pub trait Identified {
    fn id(&self) -> Uuid;
}

impl Identified for CoreProject {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identified for Project {
    fn id(&self) -> Uuid {
        self.core.id
    }
}

/// Time a new project needs, sent as `completion`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Completion {
    pub days: i64,
    pub weeks: i64,
    pub months: i64,
    pub years: i64,
}

/// Input for creating a new project. Field names follow the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub favorite: bool,
    pub date_to_start: DateTime<Utc>,
    /// Priority ids from the main user's catalog.
    #[serde(default)]
    pub priorities: Vec<i64>,
    #[serde(default)]
    pub measured_goals: Vec<NewMeasuredGoal>,
    pub completion: Completion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_projects: Option<Vec<Uuid>>,
}
