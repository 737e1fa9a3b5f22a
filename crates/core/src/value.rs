//! Scalar values carried by filter predicates and keyset boundaries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A single typed value, either a predicate operand or one column of a boundary tuple.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

/// Homogeneous operand list for set-membership predicates.
///
/// Kept homogeneous so every backend can bind it as a single array parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueList {
    Text(Vec<String>),
    Integer(Vec<i64>),
}

impl ValueList {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Integer(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `value` is one of the members.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Text(list), Value::Text(v)) => list.iter().any(|item| item == v),
            (Self::Integer(list), Value::Integer(v)) => list.contains(v),
            _ => false,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ValueList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Text(iter.into_iter().map(Into::into).collect())
    }
}

/// Binary comparison operator used by `Compare`, `LocalTimeOfDay` and `LocalDate` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Whether `ordering` (left compared to right) satisfies the operator.
    #[must_use]
    pub const fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Self::Eq => matches!(ordering, Equal),
            Self::Ne => !matches!(ordering, Equal),
            Self::Lt => matches!(ordering, Less),
            Self::Le => !matches!(ordering, Greater),
            Self::Gt => matches!(ordering, Greater),
            Self::Ge => !matches!(ordering, Less),
        }
    }
}
