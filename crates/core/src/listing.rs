//! The `Listing` trait ties an entity to its filterable fields and fixed sort key.

use std::fmt::Debug;
use std::hash::Hash;

use crate::value::Value;

/// An entity that can be listed with keyset pagination.
///
/// `Field` names every column a predicate may reference, including columns of related
/// satellite tables. `Relation` names those satellite tables so a backend can lower
/// `Predicate::Related` into an `EXISTS` subquery or a nested query.
pub trait Listing: Clone + Debug + Send + Sync + 'static {
    type Field: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    type Relation: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Human-readable listing name used in logs and errors.
    const NAME: &'static str;

    /// Sort-key fields in order. The primary id is always last.
    const SORT_FIELDS: &'static [Self::Field];

    /// Primary id of this record.
    fn id(&self) -> &str;

    /// Value of a sort-key field, `None` for fields that are not part of the key.
    fn sort_value(&self, field: Self::Field) -> Option<Value>;
}
