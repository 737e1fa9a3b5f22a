//! Fixed compound sort keys, their direction, and keyset boundaries.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::listing::Listing;
use crate::value::Value;

/// Global direction applied uniformly to every field of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// `>=` means ascending; every other token means descending.
    #[must_use]
    pub fn from_compare_token(token: &str) -> Self {
        if token.trim() == ">=" { Self::Ascending } else { Self::Descending }
    }

    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Ascending)
    }

    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Applies the direction to an ascending comparison.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The listing's fixed sort fields plus a direction.
pub struct SortKey<L: Listing> {
    order: SortOrder,
    _listing: PhantomData<fn() -> L>,
}

impl<L: Listing> SortKey<L> {
    #[must_use]
    pub const fn new(order: SortOrder) -> Self {
        Self { order, _listing: PhantomData }
    }

    #[must_use]
    pub fn from_compare_token(token: &str) -> Self {
        Self::new(SortOrder::from_compare_token(token))
    }

    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    #[must_use]
    pub const fn fields(&self) -> &'static [L::Field] {
        L::SORT_FIELDS
    }

    /// The same fields in the opposite direction.
    #[must_use]
    pub const fn inverted(&self) -> Self {
        Self::new(self.order.inverted())
    }

    /// Boundary tuple for `record`, `None` if the record lacks a sort-key value.
    #[must_use]
    pub fn boundary_of(&self, record: &L) -> Option<Boundary> {
        let values: Vec<Value> =
            self.fields().iter().map(|field| record.sort_value(*field)).collect::<Option<_>>()?;
        Some(Boundary { anchor_id: record.id().to_owned(), values })
    }

    /// Orders two records under this key.
    #[must_use]
    pub fn compare(&self, a: &L, b: &L) -> Ordering {
        for field in self.fields() {
            let ordering = match (a.sort_value(*field), b.sort_value(*field)) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return self.order.apply(ordering);
            }
        }
        Ordering::Equal
    }

    /// Orders a record against a boundary. `Greater` means the record comes strictly after
    /// the boundary under this key.
    #[must_use]
    pub fn compare_to_boundary(&self, record: &L, boundary: &Boundary) -> Ordering {
        for (field, bound) in self.fields().iter().zip(boundary.values()) {
            let ordering = record
                .sort_value(*field)
                .and_then(|v| v.partial_cmp(bound))
                .unwrap_or(Ordering::Equal);
            if ordering != Ordering::Equal {
                return self.order.apply(ordering);
            }
        }
        Ordering::Equal
    }
}

impl<L: Listing> Clone for SortKey<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: Listing> Copy for SortKey<L> {}

impl<L: Listing> PartialEq for SortKey<L> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl<L: Listing> Eq for SortKey<L> {}

impl<L: Listing> fmt::Debug for SortKey<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("listing", &L::NAME)
            .field("fields", &L::SORT_FIELDS)
            .field("order", &self.order)
            .finish()
    }
}

/// Sort-key values of an anchor record, tiebreaker last.
///
/// Always derived server-side from the anchor id; callers never construct one directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    anchor_id: String,
    values: Vec<Value>,
}

impl Boundary {
    #[must_use]
    pub fn new(anchor_id: impl Into<String>, values: Vec<Value>) -> Self {
        Self { anchor_id: anchor_id.into(), values }
    }

    #[must_use]
    pub fn anchor_id(&self) -> &str {
        &self.anchor_id
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}
