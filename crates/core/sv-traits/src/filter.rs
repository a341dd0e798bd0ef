//! Record filter trait and combinators.

use serde_json::Value;
use sv_error::Result;

/// Trait for per-record filters.
///
/// A filter receives one parsed record and either returns the record to
/// write (possibly a different value than it was given) or `None` to drop
/// it. Errors are counted against the line that produced the record and
/// never stop the run.
///
/// # Thread Safety
///
/// Filters must be `Send + Sync` so independent runs can share one instance.
pub trait RecordFilter: Send + Sync {
    /// Applies the filter to a record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` - keep `value` as the output record
    /// - `Ok(None)` - drop the record
    /// - `Err(e)` - the filter failed for this record
    fn apply(&self, record: Value) -> Result<Option<Value>>;

    /// Returns the name of this filter for logging.
    fn name(&self) -> &str {
        "filter"
    }
}

impl<T: RecordFilter + ?Sized> RecordFilter for Box<T> {
    fn apply(&self, record: Value) -> Result<Option<Value>> {
        (**self).apply(record)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: RecordFilter + ?Sized> RecordFilter for std::sync::Arc<T> {
    fn apply(&self, record: Value) -> Result<Option<Value>> {
        (**self).apply(record)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A filter that keeps every record unchanged.
pub struct IdentityFilter;

impl RecordFilter for IdentityFilter {
    fn apply(&self, record: Value) -> Result<Option<Value>> {
        Ok(Some(record))
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Adapts an infallible closure into a [`RecordFilter`].
///
/// ```
/// use sv_traits::{FnFilter, RecordFilter};
/// use serde_json::json;
///
/// let even = FnFilter::new(|record| {
///     let a = record.get("a").and_then(|v| v.as_i64())?;
///     (a % 2 == 0).then_some(record)
/// });
///
/// assert!(even.apply(json!({"a": 2})).unwrap().is_some());
/// assert!(even.apply(json!({"a": 1})).unwrap().is_none());
/// ```
pub struct FnFilter<F> {
    f: F,
    name: String,
}

impl<F> FnFilter<F>
where
    F: Fn(Value) -> Option<Value> + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self {
            f,
            name: "fn".to_string(),
        }
    }

    /// Sets the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> RecordFilter for FnFilter<F>
where
    F: Fn(Value) -> Option<Value> + Send + Sync,
{
    fn apply(&self, record: Value) -> Result<Option<Value>> {
        Ok((self.f)(record))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Adapts a fallible closure into a [`RecordFilter`].
pub struct TryFnFilter<F> {
    f: F,
    name: String,
}

impl<F> TryFnFilter<F>
where
    F: Fn(Value) -> Result<Option<Value>> + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self {
            f,
            name: "try_fn".to_string(),
        }
    }

    /// Sets the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> RecordFilter for TryFnFilter<F>
where
    F: Fn(Value) -> Result<Option<Value>> + Send + Sync,
{
    fn apply(&self, record: Value) -> Result<Option<Value>> {
        (self.f)(record)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A chain of filters applied in sequence.
///
/// The first filter that drops a record ends the chain for that record.
pub struct FilterChain {
    filters: Vec<Box<dyn RecordFilter>>,
    name: String,
}

impl FilterChain {
    /// Creates a new empty filter chain.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            name: "chain".to_string(),
        }
    }

    /// Adds a filter to the chain.
    pub fn push(mut self, filter: Box<dyn RecordFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the name of this chain.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns true if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of filters in the chain.
    pub fn len(&self) -> usize {
        self.filters.len()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFilter for FilterChain {
    fn apply(&self, record: Value) -> Result<Option<Value>> {
        let mut current = record;
        for filter in &self.filters {
            match filter.apply(current)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
