//! Configuration phase of header mappings

use super::{HeaderMappings, RuleMap};
use crate::{
    error::{DuplicateMapping, Error},
    rule::{HeaderKey, HeaderSubset, MappedType, MappingRule},
    table::HeaderValues,
};
use std::sync::Arc;

/// Collects header mapping rules at application start-up.
///
/// At most one rule can be registered per target type.
/// Calling [`HeaderMappingBuilder::build`] freezes the rule set into [`HeaderMappings`].
///
/// # Example
/// ```
/// use strong_headers::{HeaderMappingBuilder, error::Error};
///
/// struct CorrelationId(Option<String>);
/// struct ApiKey(Option<String>);
///
/// # fn main() -> Result<(), Error> {
/// let mut builder = HeaderMappingBuilder::new();
/// builder
///     .add_mapping("X-Correlation-Id", |values| CorrelationId(values.last().map(Into::into)))?
///     .add_mapping("ApiKey", |values| ApiKey(values.last().map(Into::into)))?;
///
/// let mappings = builder.build();
/// assert_eq!(mappings.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct HeaderMappingBuilder {
    /// Configurable map of rules
    rules: RuleMap,
}

impl HeaderMappingBuilder {
    /// Creates a new, empty mapping builder
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the values of a single HTTP request header into `T`.
    ///
    /// The transform receives every value of the header in arrival order,
    /// or an empty sequence when the request does not carry it.
    pub fn add_mapping<T, F>(&mut self, header_name: &str, transform: F) -> Result<&mut Self, Error>
    where
        T: Send + Sync + 'static,
        F: Fn(&HeaderValues) -> T + Send + Sync + 'static,
    {
        if header_name.is_empty() {
            return Err(Error::NullArgument("header_name"));
        }

        self.ensure_unmapped::<T>(&[header_name])?;
        let rule = MappingRule::single(self.rules.len(), header_name, transform);
        self.insert(rule);
        Ok(self)
    }

    /// Maps the values of several HTTP request headers into `T`.
    ///
    /// The transform receives a [`HeaderSubset`] that only contains
    /// the declared headers present in the request.
    pub fn add_multi_mapping<T, I, S, F>(&mut self, header_names: I, transform: F) -> Result<&mut Self, Error>
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&HeaderSubset<'_>) -> T + Send + Sync + 'static,
    {
        let keys = header_names
            .into_iter()
            .map(|name| HeaderKey::new(name.as_ref()))
            .collect::<Box<[_]>>();
        if keys.is_empty() || keys.iter().any(|key| key.declared().is_empty()) {
            return Err(Error::NullArgument("header_names"));
        }

        let requested = keys.iter().map(HeaderKey::declared).collect::<Vec<_>>();
        self.ensure_unmapped::<T>(&requested)?;
        let rule = MappingRule::multi(self.rules.len(), keys, transform);
        self.insert(rule);
        Ok(self)
    }

    /// Freezes the rule set
    #[inline]
    pub fn build(self) -> HeaderMappings {
        #[cfg(feature = "tracing")]
        tracing::debug!(rules = self.rules.len(), "header mappings frozen");

        HeaderMappings {
            rules: Arc::new(self.rules),
        }
    }

    /// Returns `true` if a rule is already registered for `T`
    #[inline]
    pub fn is_mapped<T: 'static>(&self) -> bool {
        self.rules.contains_key(&MappedType::of::<T>().id())
    }

    fn ensure_unmapped<T: 'static>(&self, requested: &[&str]) -> Result<(), Error> {
        let target = MappedType::of::<T>();
        let Some(existing) = self.rules.get(&target.id()) else {
            return Ok(());
        };

        let dup = DuplicateMapping::new(
            target,
            existing.header_names().map(str::to_owned).collect(),
            requested.iter().map(|name| (*name).to_owned()).collect()
        );

        #[cfg(feature = "tracing")]
        tracing::warn!(
            target_type = target.name(),
            existing = ?dup.existing(),
            requested = ?dup.requested(),
            "duplicate header mapping rejected"
        );

        Err(dup.into())
    }

    #[inline]
    fn insert(&mut self, rule: MappingRule) {
        self.rules.insert(rule.target().id(), rule);
    }
}

#[cfg(test)]
mod tests {
    use super::HeaderMappingBuilder;
    use crate::{error::Error, rule::MappedType};

    #[derive(Debug)]
    struct CorrelationId(Option<String>);

    #[derive(Debug)]
    struct ApiKey(Option<String>);

    #[test]
    fn it_registers_distinct_types() {
        let mut builder = HeaderMappingBuilder::new();
        builder
            .add_mapping("X-Correlation-Id", |v| CorrelationId(v.last().map(Into::into)))
            .unwrap()
            .add_multi_mapping(["ApiKey", "X-Api-Key"], |s| ApiKey(s.values().last().map(Into::into)))
            .unwrap();

        assert!(builder.is_mapped::<CorrelationId>());
        assert!(builder.is_mapped::<ApiKey>());
        assert_eq!(builder.build().len(), 2);
    }

    #[test]
    fn it_rejects_empty_header_name() {
        let mut builder = HeaderMappingBuilder::new();
        let err = builder
            .add_mapping("", |v| CorrelationId(v.last().map(Into::into)))
            .unwrap_err();

        assert_eq!(err, Error::NullArgument("header_name"));
        assert!(!builder.is_mapped::<CorrelationId>());
    }

    #[test]
    fn it_rejects_empty_header_names() {
        let mut builder = HeaderMappingBuilder::new();
        let err = builder
            .add_multi_mapping(Vec::<String>::new(), |_| ApiKey(None))
            .unwrap_err();

        assert_eq!(err, Error::NullArgument("header_names"));
    }

    #[test]
    fn it_rejects_blank_name_among_header_names() {
        let mut builder = HeaderMappingBuilder::new();
        let err = builder
            .add_multi_mapping(["X-A", ""], |_| ApiKey(None))
            .unwrap_err();

        assert_eq!(err, Error::NullArgument("header_names"));
    }

    #[test]
    fn it_rejects_duplicate_target_type() {
        let mut builder = HeaderMappingBuilder::new();
        builder
            .add_multi_mapping(["X-A", "X-B"], |_| CorrelationId(Some("first".into())))
            .unwrap();

        let err = builder
            .add_multi_mapping(["X-C", "X-D"], |_| CorrelationId(Some("second".into())))
            .unwrap_err();

        let Error::DuplicateTargetType(dup) = err else {
            panic!("expected duplicate target type error");
        };
        assert_eq!(dup.target(), MappedType::of::<CorrelationId>());
        assert_eq!(dup.existing(), ["X-A", "X-B"]);
        assert_eq!(dup.requested(), ["X-C", "X-D"]);
    }

    #[test]
    fn it_rejects_duplicate_across_single_and_multi_forms() {
        let mut builder = HeaderMappingBuilder::new();
        builder.add_mapping("ApiKey", |_| ApiKey(None)).unwrap();

        let err = builder
            .add_multi_mapping(["X-Api-Key"], |_| ApiKey(None))
            .unwrap_err();

        let Error::DuplicateTargetType(dup) = err else {
            panic!("expected duplicate target type error");
        };
        assert_eq!(dup.existing(), ["ApiKey"]);
        assert_eq!(dup.requested(), ["X-Api-Key"]);
    }
}
