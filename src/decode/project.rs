use std::collections::{BTreeMap, HashSet};

use crate::error::DecodeError;
use crate::models::*;

use super::cursor::Cursor;
use super::priority::{priorities_at, priority_object};

pub(crate) fn failure_at(node: &Cursor<'_>) -> Result<Failure, DecodeError> {
    Ok(Failure {
        reason: node.field("reason")?.as_str()?.to_string(),
        solution: node.field("solution")?.as_str()?.to_string(),
        description: node.field("description")?.as_str()?.to_string(),
    })
}

fn progress_at<T: Quantity>(
    node: &Cursor<'_>,
    goal_key: &str,
    advance_key: &str,
    extract: impl Fn(&Cursor<'_>) -> Result<T, DecodeError>,
) -> Result<MeasuredSet<T>, DecodeError> {
    let goal = extract(&node.field(goal_key)?)?;
    let advance = extract(&node.field(advance_key)?)?;
    Ok(MeasuredSet::progress(goal, advance))
}

pub(crate) fn measured_goal_at(node: &Cursor<'_>) -> Result<MeasuredGoal, DecodeError> {
    let failures = match node.opt_field("failures") {
        Some(list) => list
            .elements()?
            .iter()
            .map(failure_at)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(MeasuredGoal {
        order: node.field("order")?.as_i32()?,
        item: node.field("item")?.as_str()?.to_string(),
        weight: node.field("weight")?.as_f64()?,
        real: progress_at(node, "realGoal", "realAdvance", |c| c.as_f64())?,
        discrete: progress_at(node, "discreteGoal", "discreteAdvance", |c| c.as_i64())?,
        finished: node.field("finished")?.as_bool()?,
        failures,
    })
}

pub(crate) fn completion_at(node: &Cursor<'_>) -> Result<MeasuredSet<i64>, DecodeError> {
    if !node.value().is_object() {
        return Err(node.error("expected a completion object"));
    }
    let quantities = DURATION_KEYS
        .iter()
        .map(|key| -> Result<(String, i64), DecodeError> {
            Ok((key.to_string(), node.field(key)?.as_i64()?))
        })
        .collect::<Result<BTreeMap<_, _>, DecodeError>>()?;
    MeasuredSet::with_keys(&DURATION_KEYS, quantities).map_err(|e| node.error(e.to_string()))
}

pub(crate) fn underlying_categories_at(
    node: &Cursor<'_>,
) -> Result<Vec<UnderlyingCategory>, DecodeError> {
    if node.value().is_array() {
        let mut categories = Vec::new();
        for element in node.elements()? {
            categories.extend(underlying_categories_at(&element)?);
        }
        return Ok(categories);
    }
    let (Some(uuid), Some(priorities)) = (node.opt_field("uuid"), node.opt_field("priorities"))
    else {
        return Ok(Vec::new());
    };

    let project = uuid.as_uuid()?;
    let mut categories = Vec::new();
    for entry in priorities.elements()? {
        // `[{}]` stands for no category.
        if entry.value().as_object().is_some_and(|fields| fields.is_empty()) {
            continue;
        }
        categories.push(UnderlyingCategory {
            project,
            tag: CategoryTag {
                id: entry.field("id")?.as_i64()?,
                table: entry.field_or("table", "tble")?.as_str()?.to_string(),
                weight: entry.field_or("weight", "wght")?.as_f64()?,
            },
        });
    }
    Ok(categories)
}

fn essential_at(node: &Cursor<'_>) -> Result<EssentialInfo, DecodeError> {
    Ok(EssentialInfo {
        name: node.field("name")?.as_str()?.to_string(),
        kind: node.field("type")?.as_i32()?,
        is_favorite: node.field("favorite")?.as_bool()?,
        start_date: node.field("dateToStart")?.as_datetime()?,
    })
}

pub(crate) fn core_project_at(
    node: &Cursor<'_>,
    catalog: &PriorityCatalog,
) -> Result<CoreProject, DecodeError> {
    let id = node.field("uuid")?.as_uuid()?;
    let essential = essential_at(node)?;

    let priorities = match node.opt_field("priorities") {
        Some(list) => priorities_at(&list, catalog)?,
        None => Vec::new(),
    };

    let measured_goals = node
        .field("measuredGoals")?
        .elements()?
        .iter()
        .map(measured_goal_at)
        .collect::<Result<Vec<_>, _>>()?;

    let necessary_time = completion_at(&node.field("completion")?)?;

    let underlying_categories = match node.opt_field("underlyingCategories") {
        Some(categories) => underlying_categories_at(&categories)?,
        None => Vec::new(),
    };

    tracing::debug!(%id, goals = measured_goals.len(), "Decoded project");
    Ok(CoreProject::new(
        id,
        essential,
        priorities,
        measured_goals,
        necessary_time,
        underlying_categories,
    ))
}

pub(crate) fn project_at(
    node: &Cursor<'_>,
    catalog: &PriorityCatalog,
) -> Result<Project, DecodeError> {
    let core = core_project_at(node, catalog)?;
    let parent_projects = match node.opt_field("parentProjects") {
        Some(list) => Some(
            list.elements()?
                .iter()
                .map(Cursor::as_uuid)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };
    Ok(Project {
        core,
        parent_projects,
    })
}

/// Decode a bare array of project documents, rejecting repeated ids.
pub(crate) fn list_at<E: Identified>(
    node: &Cursor<'_>,
    decode_one: impl Fn(&Cursor<'_>) -> Result<E, DecodeError>,
) -> Result<Vec<E>, DecodeError> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for element in node.elements()? {
        let item = decode_one(&element)?;
        if !seen.insert(item.id()) {
            return Err(element.error(format!("duplicate project id {}", item.id())));
        }
        items.push(item);
    }
    Ok(items)
}

pub(crate) fn user_profile_at(node: &Cursor<'_>) -> Result<UserProfile, DecodeError> {
    let record = if node.value().is_array() {
        let mut elements = node.elements()?;
        if elements.is_empty() {
            return Err(node.error("expected a single user record, found an empty array"));
        }
        if elements.len() > 1 {
            tracing::warn!(count = elements.len(), "Personal info returned several records, using the first");
        }
        elements.swap_remove(0)
    } else {
        node.clone()
    };

    let priorities = match record.opt_field("priorities") {
        Some(list) => list
            .elements()?
            .iter()
            .map(priority_object)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(UserProfile {
        complete_name: record.field("completeName")?.as_str()?.to_string(),
        preferred_name: record.field("preferredName")?.as_str()?.to_string(),
        age: record.field("age")?.as_i32()?,
        email: record.field("email")?.as_str()?.to_string(),
        priorities,
    })
}
