//! Describes header mapping errors

use crate::rule::MappedType;
use std::fmt::{Display, Formatter};

/// Errors raised while configuring header mappings or resolving them per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required configuration argument is missing or empty
    NullArgument(&'static str),
    /// A mapping for the same target type has already been registered
    DuplicateTargetType(DuplicateMapping),
    /// No value could be produced for the requested type
    ResolutionFailed(&'static str),
    /// Request extensions do not carry a headers scope
    ScopeMissing,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NullArgument(arg) => write!(f, "Header Mapping Error: argument `{arg}` is missing or empty"),
            Error::DuplicateTargetType(dup) => Display::fmt(dup, f),
            Error::ResolutionFailed(type_name) => write!(f, "Header Mapping Error: no mapping registered for {type_name}"),
            Error::ScopeMissing => write!(f, "Header Mapping Error: request headers scope is missing"),
        }
    }
}

impl std::error::Error for Error {}

impl From<DuplicateMapping> for Error {
    #[inline]
    fn from(dup: DuplicateMapping) -> Self {
        Error::DuplicateTargetType(dup)
    }
}

/// Details of a rejected registration for a target type that is already mapped.
///
/// Both header name lists are kept in the order they were supplied,
/// so the conflict can be diagnosed without looking at either transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMapping {
    target: MappedType,
    existing: Vec<String>,
    requested: Vec<String>,
}

impl DuplicateMapping {
    pub(crate) fn new(target: MappedType, existing: Vec<String>, requested: Vec<String>) -> Self {
        Self { target, existing, requested }
    }

    /// Returns the target type that failed to be registered
    #[inline]
    pub fn target(&self) -> MappedType {
        self.target
    }

    /// Returns the header names already associated with the target type
    #[inline]
    pub fn existing(&self) -> &[String] {
        &self.existing
    }

    /// Returns the header names of the rejected registration
    #[inline]
    pub fn requested(&self) -> &[String] {
        &self.requested
    }
}

impl Display for DuplicateMapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Header Mapping Error: {} is already mapped to [{}], unable to map it to [{}]",
            self.target,
            self.existing.join(", "),
            self.requested.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{DuplicateMapping, Error};
    use crate::rule::MappedType;

    struct CorrelationId;

    #[test]
    fn it_displays_resolution_failed() {
        let err = Error::ResolutionFailed("app::CorrelationId");

        assert_eq!(err.to_string(), "Header Mapping Error: no mapping registered for app::CorrelationId");
    }

    #[test]
    fn it_displays_null_argument() {
        let err = Error::NullArgument("header_names");

        assert_eq!(err.to_string(), "Header Mapping Error: argument `header_names` is missing or empty");
    }

    #[test]
    fn it_displays_duplicate_with_both_header_lists() {
        let dup = DuplicateMapping::new(
            MappedType::of::<CorrelationId>(),
            vec!["X-A".into(), "X-B".into()],
            vec!["X-C".into()]
        );
        let err = Error::from(dup);
        let message = err.to_string();

        assert!(message.contains("CorrelationId"));
        assert!(message.ends_with("already mapped to [X-A, X-B], unable to map it to [X-C]"));
    }
}
