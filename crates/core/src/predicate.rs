//! Backend-neutral predicate tree.
//!
//! Filters are composed into a `Predicate<L>` once per request. The PostgreSQL store lowers
//! the tree into a parameterized statement and the Elasticsearch store lowers it into a
//! query DSL body; nothing in here knows either syntax.

use chrono::{NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::listing::Listing;
use crate::value::{CompareOp, Value, ValueList};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<L: Listing> {
    /// Conjunction. Empty is always true.
    All(Vec<Predicate<L>>),
    /// Disjunction. Empty is always false.
    Any(Vec<Predicate<L>>),
    Compare {
        field: L::Field,
        op: CompareOp,
        value: Value,
    },
    InSet {
        field: L::Field,
        values: ValueList,
    },
    /// Column is NULL / document field is absent.
    Missing { field: L::Field },
    /// Case- and whitespace-insensitive substring match. `needle` is already stripped of
    /// whitespace.
    Contains { field: L::Field, needle: String },
    /// Day of week of a timestamp field, observed in `timezone`.
    LocalDayOfWeek {
        field: L::Field,
        timezone: Tz,
        days: Vec<Weekday>,
    },
    /// Wall-clock time of a timestamp field, observed in `timezone`.
    LocalTimeOfDay {
        field: L::Field,
        timezone: Tz,
        op: CompareOp,
        time: NaiveTime,
    },
    /// Calendar date of a timestamp field, observed in `timezone`.
    LocalDate {
        field: L::Field,
        timezone: Tz,
        op: CompareOp,
        date: NaiveDate,
    },
    /// `(first, second)` is one of `pairs`.
    PairIn {
        first: L::Field,
        second: L::Field,
        pairs: Vec<(String, String)>,
    },
    /// At least one related satellite row satisfies `predicate`.
    Related {
        relation: L::Relation,
        predicate: Box<Predicate<L>>,
    },
}

impl<L: Listing> Predicate<L> {
    #[must_use]
    pub fn eq(field: L::Field, value: impl Into<Value>) -> Self {
        Self::Compare { field, op: CompareOp::Eq, value: value.into() }
    }

    #[must_use]
    pub fn compare(field: L::Field, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare { field, op, value: value.into() }
    }

    /// Membership in `values`, or `None` when there is nothing to match against.
    #[must_use]
    pub fn any_of(field: L::Field, values: ValueList) -> Option<Self> {
        (!values.is_empty()).then_some(Self::InSet { field, values })
    }

    /// Text membership helper; `None` for an empty slice.
    #[must_use]
    pub fn any_of_text(field: L::Field, values: &[String]) -> Option<Self> {
        Self::any_of(field, ValueList::Text(values.to_vec()))
    }

    /// Substring match, `None` when the needle is blank.
    #[must_use]
    pub fn contains(field: L::Field, needle: &str) -> Option<Self> {
        let needle = strip_whitespace(needle);
        (!needle.is_empty()).then_some(Self::Contains { field, needle })
    }

    #[must_use]
    pub fn related(relation: L::Relation, predicate: Self) -> Self {
        Self::Related { relation, predicate: Box::new(predicate) }
    }

    /// Conjunction that flattens nested `All` nodes and unwraps a single child.
    #[must_use]
    pub fn and(clauses: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause {
                Self::All(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        Self::All(flat)
    }

    /// Disjunction that flattens nested `Any` nodes and unwraps a single child.
    #[must_use]
    pub fn or(clauses: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause {
                Self::Any(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        Self::Any(flat)
    }
}

/// Removes every whitespace character, matching how stored names are compared.
#[must_use]
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{Lesson, LessonField, LessonRelation};

    type P = Predicate<Lesson>;

    #[test]
    fn test_and_flattens_and_unwraps() {
        let a = P::eq(LessonField::CenterId, "c1");
        let b = P::eq(LessonField::ClassId, "k1");
        let nested = P::and(vec![P::and(vec![a.clone(), b.clone()]), a.clone()]);
        assert_eq!(nested, P::All(vec![a.clone(), b, a.clone()]));
        assert_eq!(P::and(vec![a.clone()]), a);
    }

    #[test]
    fn test_or_of_nothing_is_empty_any() {
        assert_eq!(P::or(vec![]), P::Any(vec![]));
    }

    #[test]
    fn test_any_of_skips_empty_lists() {
        assert!(P::any_of_text(LessonField::CenterId, &[]).is_none());
        let p = P::any_of_text(LessonField::CenterId, &["a".to_owned()]);
        assert!(matches!(p, Some(P::InSet { .. })));
    }

    #[test]
    fn test_contains_strips_whitespace() {
        let p = P::contains(LessonField::MemberName, "  Yamada  Taro ");
        assert_eq!(
            p,
            Some(P::Contains { field: LessonField::MemberName, needle: "YamadaTaro".to_owned() })
        );
        assert!(P::contains(LessonField::MemberName, " \t ").is_none());
    }

    #[test]
    fn test_and_does_not_flatten_through_relations() {
        let inner = P::and(vec![
            P::eq(LessonField::MemberStudentId, "s1"),
            P::eq(LessonField::MemberCourseId, "k1"),
        ]);
        let p = P::and(vec![
            P::eq(LessonField::CenterId, "c1"),
            P::related(LessonRelation::Members, inner.clone()),
        ]);
        let P::All(clauses) = p else { panic!("expected a conjunction") };
        assert_eq!(clauses.len(), 2);
        assert_eq!(
            clauses[1],
            P::Related { relation: LessonRelation::Members, predicate: Box::new(inner) }
        );
    }
}
