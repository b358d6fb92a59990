//! # Strong Headers
//!
//! Declare once, at start-up, how HTTP request headers map into strongly-typed values,
//! then read those values per request without re-parsing headers at every call site.
//!
//! * Single-header and multi-header mappings
//! * At most one mapping per target type, conflicts are rejected at configuration time
//! * Case-insensitive header names, repeated and comma-joined values flattened in order
//! * Each target type is materialized at most once per request
//! * Optional and fail-fast retrieval forms
//! * Integration with [`http::Request`] extensions
//!
//! ## Example
//! ```
//! use strong_headers::{HeaderMappings, HeaderTable, error::Error};
//!
//! #[derive(Debug, PartialEq)]
//! struct CorrelationId(Option<String>);
//!
//! #[derive(Debug, PartialEq)]
//! struct Tenant {
//!     id: Option<String>,
//!     region: Option<String>,
//! }
//!
//! # fn main() -> Result<(), Error> {
//! let mappings = HeaderMappings::configure(|builder| {
//!     builder
//!         .add_mapping("X-Correlation-Id", |values| CorrelationId(values.last().map(Into::into)))?
//!         .add_multi_mapping(["X-Tenant-Id", "X-Tenant-Region"], |headers| Tenant {
//!             id: headers.last("X-Tenant-Id").map(Into::into),
//!             region: headers.last("X-Tenant-Region").map(Into::into),
//!         })?;
//!     Ok(())
//! })?;
//!
//! // per request
//! let headers = mappings.scope(HeaderTable::from_pairs([
//!     ("x-correlation-id", "a"),
//!     ("X-Correlation-Id", "b"),
//!     ("x-tenant-id", "acme"),
//! ]));
//!
//! assert_eq!(*headers.require::<CorrelationId>()?, CorrelationId(Some("b".into())));
//! assert_eq!(*headers.require::<Tenant>()?, Tenant { id: Some("acme".into()), region: None });
//! # Ok(())
//! # }
//! ```

pub use crate::{
    accessor::RequestHeaders,
    registry::{HeaderMappings, HeaderMappingBuilder},
    request::{RequestHeadersExt, Typed},
    rule::{HeaderSubset, Mapped, MappedType},
    table::{HeaderTable, HeaderValues},
};

pub mod error;
pub mod accessor;
pub mod registry;
pub mod request;
pub mod rule;
pub mod table;
