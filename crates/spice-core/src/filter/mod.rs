//! Category filters and the registry the scoring session consults.
//!
//! A category filter is a pure predicate over propositions. The session
//! scores every item once unfiltered (category `"All"`) and once per
//! registered filter, building each filtered tuple set before matching.
//!
//! The registry is fixed before scoring starts: unknown, duplicate or
//! reserved names are rejected at registration time.

pub mod lexical;
pub mod novelty;

use crate::config::ALL_CATEGORY;
use crate::error::ScoringError;
use crate::tuples::Proposition;
use std::fmt;
use std::sync::Arc;

pub use lexical::{ArityFilter, VocabularyFilter};
pub use novelty::{NoveltyFilter, TupleExtractor};

/// Predicate selecting the propositions of one category.
pub trait TupleFilter: Send + Sync {
    fn matches(&self, proposition: &Proposition) -> bool;
}

impl<F> TupleFilter for F
where
    F: Fn(&Proposition) -> bool + Send + Sync,
{
    fn matches(&self, proposition: &Proposition) -> bool {
        self(proposition)
    }
}

/// Named category filters in registration order.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: Vec<(String, Arc<dyn TupleFilter>)>,
}

impl FilterRegistry {
    /// An empty registry: only the `"All"` category will be scored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Object, Attribute, Relation, Color, Count and Size categories.
    pub fn standard() -> Self {
        let filters: Vec<(String, Arc<dyn TupleFilter>)> = vec![
            ("Object".to_string(), Arc::new(ArityFilter::objects())),
            ("Attribute".to_string(), Arc::new(ArityFilter::attributes())),
            ("Relation".to_string(), Arc::new(ArityFilter::relations())),
            ("Color".to_string(), Arc::new(VocabularyFilter::color())),
            ("Count".to_string(), Arc::new(VocabularyFilter::count())),
            ("Size".to_string(), Arc::new(VocabularyFilter::size())),
        ];
        Self { filters }
    }

    /// Adds a category.
    ///
    /// # Errors
    ///
    /// [`ScoringError::ReservedCategory`] for `"All"`,
    /// [`ScoringError::DuplicateCategory`] for a name already registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        filter: Arc<dyn TupleFilter>,
    ) -> Result<&mut Self, ScoringError> {
        let name = name.into();
        if name == ALL_CATEGORY {
            return Err(ScoringError::ReservedCategory(name));
        }
        if self.contains(&name) {
            return Err(ScoringError::DuplicateCategory(name));
        }
        self.filters.push((name, filter));
        Ok(self)
    }

    /// True for `"All"` and for every registered category.
    pub fn contains(&self, name: &str) -> bool {
        name == ALL_CATEGORY || self.filters.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn TupleFilter> {
        self.filters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f.as_ref())
    }

    /// Registered category names, excluding `"All"`.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn TupleFilter)> {
        self.filters.iter().map(|(n, f)| (n.as_str(), f.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
