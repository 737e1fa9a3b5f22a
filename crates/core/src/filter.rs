//! Immutable filter sets assembled once per request.

use crate::listing::Listing;
use crate::predicate::Predicate;

/// The conjunction of every predicate a caller asked for.
///
/// An unfiltered set matches every live record.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet<L: Listing> {
    predicate: Option<Predicate<L>>,
}

impl<L: Listing> FilterSet<L> {
    #[must_use]
    pub const fn unfiltered() -> Self {
        Self { predicate: None }
    }

    #[must_use]
    pub fn builder() -> FilterSetBuilder<L> {
        FilterSetBuilder { clauses: Vec::new() }
    }

    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate<L>> {
        self.predicate.as_ref()
    }

    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.predicate.is_none()
    }
}

impl<L: Listing> Default for FilterSet<L> {
    fn default() -> Self {
        Self::unfiltered()
    }
}

#[derive(Debug)]
pub struct FilterSetBuilder<L: Listing> {
    clauses: Vec<Predicate<L>>,
}

impl<L: Listing> FilterSetBuilder<L> {
    #[must_use]
    pub fn require(mut self, predicate: Predicate<L>) -> Self {
        self.clauses.push(predicate);
        self
    }

    /// Adds the clause when present. Absent inputs impose no constraint.
    #[must_use]
    pub fn maybe(mut self, predicate: Option<Predicate<L>>) -> Self {
        if let Some(p) = predicate {
            self.clauses.push(p);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> FilterSet<L> {
        let predicate = (!self.clauses.is_empty()).then(|| Predicate::and(self.clauses));
        FilterSet { predicate }
    }
}
