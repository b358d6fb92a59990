//! Frozen set of header mapping rules

use crate::{
    accessor::RequestHeaders,
    error::Error,
    rule::{Mapped, MappedType, MappingRule},
    table::HeaderTable,
};
use std::{
    any::TypeId,
    collections::HashMap,
    hash::{BuildHasherDefault, Hasher},
    sync::Arc,
};

pub use builder::HeaderMappingBuilder;

pub mod builder;

/// Inner HashMap of mapping rules
pub(crate) type RuleMap = HashMap<
    TypeId,
    MappingRule,
    BuildHasherDefault<TypeIdHasher>
>;

#[derive(Default)]
pub(crate) struct TypeIdHasher(u64);

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            self.0 ^= u64::from_ne_bytes(buf);
        }
    }

    #[inline]
    fn write_u64(&mut self, id: u64) {
        self.0 = id;
    }
}

/// A frozen, read-only set of header mapping rules.
///
/// Built once by [`HeaderMappingBuilder::build`] and shared by all requests.
/// Cloning is cheap, the rules live behind an [`Arc`].
///
/// # Example
/// ```
/// use strong_headers::{HeaderMappings, HeaderTable, error::Error};
///
/// struct TraceId(Option<String>);
///
/// # fn main() -> Result<(), Error> {
/// let mappings = HeaderMappings::configure(|builder| {
///     builder.add_mapping("X-Trace-Id", |values| TraceId(values.last().map(Into::into)))?;
///     Ok(())
/// })?;
///
/// let headers = mappings.scope(HeaderTable::from_pairs([("x-trace-id", "42")]));
/// let trace_id = headers.require::<TraceId>()?;
///
/// assert_eq!(trace_id.0.as_deref(), Some("42"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HeaderMappings {
    /// Read-only map of rules
    pub(crate) rules: Arc<RuleMap>,
}

impl HeaderMappings {
    /// Creates a new [`HeaderMappingBuilder`]
    #[inline]
    pub fn builder() -> HeaderMappingBuilder {
        HeaderMappingBuilder::new()
    }

    /// Registers all mappings within a single configuration routine and freezes them
    pub fn configure<F>(config: F) -> Result<Self, Error>
    where
        F: FnOnce(&mut HeaderMappingBuilder) -> Result<(), Error>
    {
        let mut builder = HeaderMappingBuilder::new();
        config(&mut builder)?;
        Ok(builder.build())
    }

    /// Creates a request scope over the given headers
    #[inline]
    pub fn scope(&self, headers: impl Into<HeaderTable>) -> RequestHeaders {
        RequestHeaders::new(self.clone(), headers.into())
    }

    /// Creates a scope without a request.
    ///
    /// All headers are treated as absent, so rules produce their "no value" results.
    #[inline]
    pub fn detached(&self) -> RequestHeaders {
        self.scope(HeaderTable::new())
    }

    /// Runs the rule registered for `ty` against `headers`.
    ///
    /// Returns `None` if no rule is registered. The result is not cached,
    /// use a [`RequestHeaders`] scope for per-request caching.
    #[inline]
    pub fn resolve(&self, ty: MappedType, headers: &HeaderTable) -> Option<Mapped> {
        self.rule(ty.id()).map(|rule| rule.apply(headers))
    }

    /// Runs the rule registered for `T` against `headers` and downcasts the result
    #[inline]
    pub fn resolve_as<T: Send + Sync + 'static>(&self, headers: &HeaderTable) -> Option<Arc<T>> {
        self.resolve(MappedType::of::<T>(), headers)
            .and_then(|mapped| mapped.downcast::<T>().ok())
    }

    /// Returns `true` if a rule is registered for `T`
    #[inline]
    pub fn is_mapped<T: 'static>(&self) -> bool {
        self.rules.contains_key(&TypeId::of::<T>())
    }

    /// Returns the header names declared for a target type, in declaration order
    #[inline]
    pub fn header_names(&self, ty: MappedType) -> Option<Vec<&str>> {
        self.rule(ty.id()).map(|rule| rule.header_names().collect())
    }

    /// Returns the number of registered rules
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if both handles share the same frozen rule set
    #[inline]
    pub(crate) fn same_rules(&self, other: &HeaderMappings) -> bool {
        Arc::ptr_eq(&self.rules, &other.rules)
    }

    #[inline]
    pub(crate) fn rule(&self, id: TypeId) -> Option<&MappingRule> {
        self.rules.get(&id)
    }
}
