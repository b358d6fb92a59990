//! Mapping rules that turn header values into typed instances

use crate::table::{HeaderTable, HeaderValues, normalize};
use indexmap::IndexMap;
use std::{
    any::{Any, TypeId, type_name},
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A type-erased instance produced by a mapping rule
pub type Mapped = Arc<
    dyn Any
    + Send
    + Sync
>;

type SingleFn = Arc<
    dyn Fn(&HeaderValues) -> Mapped
    + Send
    + Sync
>;

type MultiFn = Arc<
    dyn Fn(&HeaderSubset<'_>) -> Mapped
    + Send
    + Sync
>;

#[inline]
fn make_single_fn<F>(transform: F) -> SingleFn
where
    F: Fn(&HeaderValues) -> Mapped + Send + Sync + 'static
{
    Arc::new(transform)
}

#[inline]
fn make_multi_fn<F>(transform: F) -> MultiFn
where
    F: Fn(&HeaderSubset<'_>) -> Mapped + Send + Sync + 'static
{
    Arc::new(transform)
}

/// A registration token that identifies a mapping target type.
///
/// Pairs the [`TypeId`] used for lookups with the type name used in diagnostics.
#[derive(Clone, Copy)]
pub struct MappedType {
    id: TypeId,
    name: &'static str,
}

impl MappedType {
    /// Creates a token for `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the target type
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified name of the target type
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MappedType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MappedType {}

impl Hash for MappedType {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for MappedType {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Display for MappedType {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Values of the headers declared by a multi-header mapping.
///
/// Contains only the declared headers that are present in the request,
/// keyed by the names as they were declared and kept in declaration order.
/// Lookups by name are case-insensitive.
#[derive(Clone, Default)]
pub struct HeaderSubset<'a> {
    entries: IndexMap<&'a str, &'a HeaderValues>,
}

impl<'a> HeaderSubset<'a> {
    /// Returns the values of a declared header if it is present in the request
    pub fn get(&self, name: &str) -> Option<&'a HeaderValues> {
        if let Some(values) = self.entries.get(name) {
            return Some(*values);
        }
        self.entries
            .iter()
            .find(|(declared, _)| normalize(declared) == normalize(name))
            .map(|(_, values)| *values)
    }

    /// Returns the last value of a declared header, if any
    #[inline]
    pub fn last(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(HeaderValues::last)
    }

    /// Returns `true` if the declared header is present in the request
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of present headers
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if none of the declared headers are present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the declared names of the present headers
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.keys().copied()
    }

    /// Returns an iterator over declared names and their values
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a HeaderValues)> + '_ {
        self.entries.iter().map(|(name, values)| (*name, *values))
    }

    /// Returns all values of all present headers in declaration order
    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.values().copied().flat_map(HeaderValues::iter)
    }
}

impl Debug for HeaderSubset<'_> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// A header name as declared and in its lookup form
#[derive(Debug, Clone)]
pub(crate) struct HeaderKey {
    declared: Box<str>,
    normalized: Box<str>,
}

impl HeaderKey {
    #[inline]
    pub(crate) fn new(declared: &str) -> Self {
        Self {
            declared: declared.into(),
            normalized: normalize(declared).into(),
        }
    }

    #[inline]
    pub(crate) fn declared(&self) -> &str {
        &self.declared
    }
}

/// The source of a mapping and its transform
#[derive(Clone)]
pub(crate) enum RuleKind {
    Single(HeaderKey, SingleFn),
    Multi(Box<[HeaderKey]>, MultiFn),
}

/// A registered transformation from one or more headers to a target type
#[derive(Clone)]
pub(crate) struct MappingRule {
    target: MappedType,
    slot: usize,
    kind: RuleKind,
}

impl Debug for MappingRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingRule")
            .field("target", &self.target)
            .field("headers", &self.header_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl MappingRule {
    pub(crate) fn single<T, F>(slot: usize, header: &str, transform: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&HeaderValues) -> T + Send + Sync + 'static,
    {
        let transform = make_single_fn(move |values| Arc::new(transform(values)) as Mapped);
        Self {
            target: MappedType::of::<T>(),
            slot,
            kind: RuleKind::Single(HeaderKey::new(header), transform),
        }
    }

    pub(crate) fn multi<T, F>(slot: usize, headers: Box<[HeaderKey]>, transform: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&HeaderSubset<'_>) -> T + Send + Sync + 'static,
    {
        let transform = make_multi_fn(move |subset| Arc::new(transform(subset)) as Mapped);
        Self {
            target: MappedType::of::<T>(),
            slot,
            kind: RuleKind::Multi(headers, transform),
        }
    }

    #[inline]
    pub(crate) fn target(&self) -> MappedType {
        self.target
    }

    /// Index of this rule's cache slot within a request scope
    #[inline]
    pub(crate) fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the header names in the order they were declared
    pub(crate) fn header_names(&self) -> impl Iterator<Item = &str> {
        let keys = match &self.kind {
            RuleKind::Single(key, _) => std::slice::from_ref(key),
            RuleKind::Multi(keys, _) => &**keys,
        };
        keys.iter().map(HeaderKey::declared)
    }

    /// Builds the rule input from the request headers and invokes the transform
    pub(crate) fn apply(&self, headers: &HeaderTable) -> Mapped {
        match &self.kind {
            RuleKind::Single(key, transform) => transform(headers.get(&key.normalized)),
            RuleKind::Multi(keys, transform) => transform(&Self::subset(keys, headers)),
        }
    }

    fn subset<'a>(keys: &'a [HeaderKey], headers: &'a HeaderTable) -> HeaderSubset<'a> {
        let entries = keys
            .iter()
            .filter_map(|key| headers
                .try_get(&key.normalized)
                .map(|values| (key.declared(), values)))
            .collect();
        HeaderSubset { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::{HeaderKey, MappedType, MappingRule};
    use crate::table::HeaderTable;

    #[derive(Debug, PartialEq)]
    struct ApiKey(Option<String>);

    #[derive(Debug, PartialEq)]
    struct Composite(Vec<(String, Vec<String>)>);

    fn keys(names: &[&str]) -> Box<[HeaderKey]> {
        names.iter().map(|name| HeaderKey::new(name)).collect()
    }

    #[test]
    fn it_compares_mapped_types_by_id() {
        assert_eq!(MappedType::of::<ApiKey>(), MappedType::of::<ApiKey>());
        assert_ne!(MappedType::of::<ApiKey>(), MappedType::of::<Composite>());
        assert!(MappedType::of::<ApiKey>().name().ends_with("ApiKey"));
    }

    #[test]
    fn it_passes_empty_values_for_absent_header() {
        let rule = MappingRule::single(0, "ApiKey", |values| {
            assert!(values.is_empty());
            ApiKey(values.last().map(str::to_owned))
        });

        let mapped = rule.apply(&HeaderTable::new());

        assert_eq!(mapped.downcast_ref::<ApiKey>(), Some(&ApiKey(None)));
    }

    #[test]
    fn it_restricts_multi_input_to_declared_headers() {
        let headers = HeaderTable::from_pairs([("A", "1"), ("a", "2"), ("B", "3"), ("C", "9")]);
        let rule = MappingRule::multi(0, keys(&["A", "B"]), |subset| Composite(subset
            .iter()
            .map(|(name, values)| (name.to_owned(), values.to_vec()))
            .collect()));

        let mapped = rule.apply(&headers);

        assert_eq!(mapped.downcast_ref::<Composite>(), Some(&Composite(vec![
            ("A".into(), vec!["1".into(), "2".into()]),
            ("B".into(), vec!["3".into()]),
        ])));
    }

    #[test]
    fn it_omits_absent_headers_from_subset() {
        let headers = HeaderTable::from_pairs([("h1", "x"), ("h3", "z")]);
        let rule = MappingRule::multi(0, keys(&["H1", "H2", "H3"]), |subset| {
            assert_eq!(subset.len(), 2);
            assert!(!subset.contains("H2"));
            assert_eq!(subset.last("h1"), Some("x"));
            assert_eq!(subset.names().collect::<Vec<_>>(), ["H1", "H3"]);
            ApiKey(subset.last("H3").map(str::to_owned))
        });

        let mapped = rule.apply(&headers);

        assert_eq!(mapped.downcast_ref::<ApiKey>(), Some(&ApiKey(Some("z".into()))));
    }

    #[test]
    fn it_reports_declared_header_names_in_order() {
        let rule = MappingRule::multi(3, keys(&["X-B", "X-A"]), |_| ApiKey(None));

        assert_eq!(rule.header_names().collect::<Vec<_>>(), ["X-B", "X-A"]);
        assert_eq!(rule.slot(), 3);
        assert_eq!(rule.target(), MappedType::of::<ApiKey>());
    }
}
