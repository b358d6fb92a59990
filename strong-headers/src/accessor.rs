//! Per-request access to mapped header values

use crate::{
    error::Error,
    registry::HeaderMappings,
    rule::{Mapped, MappedType, MappingRule},
    table::HeaderTable,
};
use std::{
    fmt::{Debug, Formatter},
    sync::{Arc, OnceLock},
};

/// A request scope over [`HeaderMappings`].
///
/// Carries the request's [`HeaderTable`] and a resolution cache, so that
/// each target type is materialized at most once per request. Clones share
/// the same table and cache, which allows the scope to be attached to the
/// request and read from several places.
///
/// # Example
/// ```
/// use strong_headers::{HeaderMappings, HeaderTable, error::Error};
///
/// #[derive(Debug)]
/// struct ApiKey(Option<String>);
/// struct Unmapped;
///
/// # fn main() -> Result<(), Error> {
/// let mappings = HeaderMappings::configure(|builder| {
///     builder.add_mapping("ApiKey", |values| ApiKey(values.last().map(Into::into)))?;
///     Ok(())
/// })?;
///
/// let headers = mappings.scope(HeaderTable::from_pairs([("apikey", "k1, k2")]));
///
/// assert_eq!(headers.require::<ApiKey>()?.0.as_deref(), Some("k2"));
/// assert!(headers.get::<Unmapped>().is_none());
/// assert!(headers.require::<Unmapped>().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RequestHeaders {
    mappings: HeaderMappings,
    headers: Arc<HeaderTable>,
    resolved: Arc<[OnceLock<Mapped>]>,
}

impl Debug for RequestHeaders {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHeaders")
            .field("headers", &self.headers)
            .field("resolved", &self.resolved.iter().filter(|slot| slot.get().is_some()).count())
            .finish_non_exhaustive()
    }
}

impl RequestHeaders {
    /// Creates a new request scope with an empty resolution cache
    pub(crate) fn new(mappings: HeaderMappings, headers: HeaderTable) -> Self {
        let resolved = (0..mappings.len())
            .map(|_| OnceLock::new())
            .collect();
        Self {
            mappings,
            headers: Arc::new(headers),
            resolved,
        }
    }

    /// Returns the request's header table
    #[inline]
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Returns the mappings this scope resolves against
    #[inline]
    pub fn mappings(&self) -> &HeaderMappings {
        &self.mappings
    }

    /// Returns the mapped value of `T`, or `None` if `T` is not mapped
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve(MappedType::of::<T>())
            .and_then(|mapped| mapped.downcast::<T>().ok())
    }

    /// Returns the mapped value of `T` or [`Error::ResolutionFailed`] if `T` is not mapped
    #[inline]
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.get::<T>()
            .ok_or_else(|| Error::ResolutionFailed(std::any::type_name::<T>()))
    }

    /// Returns a clone of the mapped value of `T`, or `None` if `T` is not mapped
    #[inline]
    pub fn get_cloned<T: Send + Sync + Clone + 'static>(&self) -> Option<T> {
        self.get::<T>().map(|value| value.as_ref().clone())
    }

    /// Returns a clone of the mapped value of `T` or [`Error::ResolutionFailed`]
    #[inline]
    pub fn require_cloned<T: Send + Sync + Clone + 'static>(&self) -> Result<T, Error> {
        self.require::<T>().map(|value| value.as_ref().clone())
    }

    /// Returns the type-erased mapped value for a target type token
    #[inline]
    pub fn require_type(&self, ty: MappedType) -> Result<Mapped, Error> {
        self.resolve(ty)
            .ok_or(Error::ResolutionFailed(ty.name()))
    }

    /// Returns the cached value of the rule for `ty`, running the rule on first access
    fn resolve(&self, ty: MappedType) -> Option<Mapped> {
        let rule = self.mappings.rule(ty.id())?;
        self.resolved
            .get(rule.slot())
            .map(|slot| Arc::clone(slot.get_or_init(|| self.materialize(rule))))
    }

    #[inline]
    fn materialize(&self, rule: &MappingRule) -> Mapped {
        #[cfg(feature = "tracing")]
        tracing::trace!(target_type = rule.target().name(), "resolving mapped header");

        rule.apply(&self.headers)
    }
}
