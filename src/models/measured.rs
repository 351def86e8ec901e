use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Quantity names of a goal/advance pair.
pub const PROGRESS_KEYS: [&str; 2] = ["goal", "advance"];

/// Quantity names of a duration.
pub const DURATION_KEYS: [&str; 4] = ["days", "weeks", "months", "years"];

/// Which scalar type a [`MeasuredSet`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureKind {
    Real,
    Discrete,
}

impl MeasureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Discrete => "discrete",
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for i64 {}
}

/// Scalar types a [`MeasuredSet`] may hold. Implemented for `f64` and `i64` only.
pub trait Quantity: sealed::Sealed + Copy + PartialEq + fmt::Debug + Serialize {
    const KIND: MeasureKind;
}

impl Quantity for f64 {
    const KIND: MeasureKind = MeasureKind::Real;
}

impl Quantity for i64 {
    const KIND: MeasureKind = MeasureKind::Discrete;
}

/// A quantity map whose keys differ from the set its context requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected keys {expected:?}, missing {missing:?}, unexpected {unexpected:?}")]
pub struct KeySetMismatch {
    pub expected: Vec<String>,
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

/// An immutable mapping from a fixed set of named quantities to values of one
/// scalar type.
///
/// The key set always equals the set its context requires, e.g.
/// [`PROGRESS_KEYS`] for a goal's progress or [`DURATION_KEYS`] for the time a
/// project needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredSet<T: Quantity> {
    quantities: BTreeMap<String, T>,
}

impl<T: Quantity> MeasuredSet<T> {
    /// Build a set whose keys must be exactly `required`.
    pub fn with_keys(
        required: &[&str],
        quantities: BTreeMap<String, T>,
    ) -> Result<Self, KeySetMismatch> {
        let missing: Vec<String> = required
            .iter()
            .filter(|key| !quantities.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        let unexpected: Vec<String> = quantities
            .keys()
            .filter(|key| !required.contains(&key.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(Self { quantities })
        } else {
            Err(KeySetMismatch {
                expected: required.iter().map(|key| key.to_string()).collect(),
                missing,
                unexpected,
            })
        }
    }

    /// A goal/advance pair.
    pub fn progress(goal: T, advance: T) -> Self {
        let quantities = PROGRESS_KEYS
            .iter()
            .map(|key| key.to_string())
            .zip([goal, advance])
            .collect();
        Self { quantities }
    }

    pub fn get(&self, name: &str) -> Option<T> {
        self.quantities.get(name).copied()
    }

    pub fn quantities(&self) -> &BTreeMap<String, T> {
        &self.quantities
    }

    pub fn kind(&self) -> MeasureKind {
        T::KIND
    }
}

impl MeasuredSet<i64> {
    pub fn duration(days: i64, weeks: i64, months: i64, years: i64) -> Self {
        let quantities = DURATION_KEYS
            .iter()
            .map(|key| key.to_string())
            .zip([days, weeks, months, years])
            .collect();
        Self { quantities }
    }
}

impl<T: Quantity> Serialize for MeasuredSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MeasuredSet", 2)?;
        state.serialize_field("kind", &T::KIND)?;
        state.serialize_field("quantities", &self.quantities)?;
        state.end()
    }
}

impl<T: Quantity> fmt::Display for MeasuredSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeasuredSet[{}] {:?}", T::KIND.as_str(), self.quantities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_reads_back_exact_values() {
        let set = MeasuredSet::progress(3.5_f64, 1.0);
        assert_eq!(set.get("goal"), Some(3.5));
        assert_eq!(set.get("advance"), Some(1.0));
        assert_eq!(set.kind(), MeasureKind::Real);
    }

    #[test]
    fn with_keys_accepts_exact_key_set() {
        let quantities = BTreeMap::from([("goal".to_string(), 3.5), ("advance".to_string(), 1.0)]);
        let set = MeasuredSet::<f64>::with_keys(&PROGRESS_KEYS, quantities).unwrap();
        assert_eq!(set.get("goal"), Some(3.5));
    }

    #[test]
    fn with_keys_rejects_partial_key_set() {
        let quantities = BTreeMap::from([
            ("days".to_string(), 1_i64),
            ("weeks".to_string(), 0),
            ("years".to_string(), 0),
        ]);
        let err = MeasuredSet::with_keys(&DURATION_KEYS, quantities).unwrap_err();
        assert_eq!(err.missing, vec!["months".to_string()]);
        assert!(err.unexpected.is_empty());
    }

    #[test]
    fn with_keys_rejects_unexpected_key() {
        let quantities = BTreeMap::from([
            ("goal".to_string(), 2_i64),
            ("advance".to_string(), 1),
            ("bonus".to_string(), 7),
        ]);
        let err = MeasuredSet::with_keys(&PROGRESS_KEYS, quantities).unwrap_err();
        assert_eq!(err.unexpected, vec!["bonus".to_string()]);
    }

    #[test]
    fn duration_is_discrete() {
        let set = MeasuredSet::duration(1, 2, 3, 4);
        assert_eq!(set.kind(), MeasureKind::Discrete);
        assert_eq!(set.get("months"), Some(3));
        assert_eq!(set.quantities().len(), 4);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let set = MeasuredSet::progress(2_i64, 1);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["kind"], "discrete");
        assert_eq!(json["quantities"]["goal"], 2);
    }
}
