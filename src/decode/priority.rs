use crate::error::DecodeError;
use crate::models::{PriorityCatalog, PriorityRef};

use super::cursor::Cursor;

/// Shape of a `priorities` array, decided by inspecting its elements.
enum PriorityShape {
    Indexes(Vec<i64>),
    Objects,
}

fn detect_shape(node: &Cursor<'_>, elements: &[Cursor<'_>]) -> Result<PriorityShape, DecodeError> {
    let indexes: Vec<Option<i64>> = elements.iter().map(Cursor::int_convertible).collect();
    if indexes.iter().all(Option::is_some) {
        return Ok(PriorityShape::Indexes(indexes.into_iter().flatten().collect()));
    }

    for (element, index) in elements.iter().zip(&indexes) {
        if index.is_none() && !element.value().is_object() {
            return Err(element.error("expected a priority index or a priority object"));
        }
    }
    if indexes.iter().any(Option::is_some) {
        return Err(node.error("priorities mix integer indexes and priority objects"));
    }
    Ok(PriorityShape::Objects)
}

pub(crate) fn priorities_at(
    node: &Cursor<'_>,
    catalog: &PriorityCatalog,
) -> Result<Vec<PriorityRef>, DecodeError> {
    let elements = node.elements()?;
    tracing::debug!(count = elements.len(), path = node.path(), "Decoding priorities");

    match detect_shape(node, &elements)? {
        PriorityShape::Indexes(indexes) => Ok(indexes
            .into_iter()
            .filter_map(|index| match catalog.lookup(index) {
                Some(priority) => Some(priority.clone()),
                None => {
                    tracing::warn!(index, path = node.path(), "Priority not found in catalog, dropping");
                    None
                }
            })
            .collect()),
        PriorityShape::Objects => elements.iter().map(priority_object).collect(),
    }
}

/// A full `{id, descriptionEn, descriptionEs}` object. The abbreviated
/// `dscrptn_en` / `dscrptn_es` keys are accepted as well.
pub(crate) fn priority_object(node: &Cursor<'_>) -> Result<PriorityRef, DecodeError> {
    Ok(PriorityRef {
        id: node.field("id")?.as_i64()?,
        description_en: node.field_or("descriptionEn", "dscrptn_en")?.as_str()?.to_string(),
        description_es: node.field_or("descriptionEs", "dscrptn_es")?.as_str()?.to_string(),
    })
}
