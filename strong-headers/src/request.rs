//! Integration with [`http`] requests

use crate::{
    accessor::RequestHeaders,
    error::Error,
    registry::HeaderMappings,
    table::HeaderTable,
};
use http::{Extensions, HeaderMap, Request, request::Parts};
use std::{
    ops::Deref,
    sync::Arc,
};

impl From<&HeaderMap> for HeaderTable {
    fn from(headers: &HeaderMap) -> Self {
        let mut table = HeaderTable::new();
        for (name, value) in headers {
            table.append(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        table
    }
}

impl From<HeaderMap> for HeaderTable {
    #[inline]
    fn from(headers: HeaderMap) -> Self {
        Self::from(&headers)
    }
}

impl From<&Parts> for HeaderTable {
    #[inline]
    fn from(parts: &Parts) -> Self {
        Self::from(&parts.headers)
    }
}

impl HeaderMappings {
    /// Creates a request scope from request [`Parts`].
    ///
    /// Reuses the scope attached to the request extensions if it was created
    /// from these mappings, so the values resolved earlier in the pipeline
    /// are not computed again.
    #[inline]
    pub fn scope_for(&self, parts: &Parts) -> RequestHeaders {
        match parts.extensions.get::<RequestHeaders>() {
            Some(scope) if scope.mappings().same_rules(self) => scope.clone(),
            _ => self.scope(parts),
        }
    }
}

impl<'a> TryFrom<&'a Extensions> for &'a RequestHeaders {
    type Error = Error;

    #[inline]
    fn try_from(extensions: &'a Extensions) -> Result<Self, Self::Error> {
        extensions.get::<RequestHeaders>()
            .ok_or(Error::ScopeMissing)
    }
}

impl TryFrom<&Extensions> for RequestHeaders {
    type Error = Error;

    #[inline]
    fn try_from(extensions: &Extensions) -> Result<Self, Self::Error> {
        let res: Result<&RequestHeaders, Error> = extensions.try_into();
        res.cloned()
    }
}

impl TryFrom<&Parts> for RequestHeaders {
    type Error = Error;

    #[inline]
    fn try_from(parts: &Parts) -> Result<Self, Self::Error> {
        RequestHeaders::try_from(&parts.extensions)
    }
}

/// Attaches a [`RequestHeaders`] scope to an HTTP request
pub trait RequestHeadersExt {
    /// Creates a scope from the request headers and stores it in the request extensions.
    ///
    /// If a scope created from the same mappings is already attached, it is returned unchanged.
    /// A scope created from other mappings is replaced.
    fn attach_headers_scope(&mut self, mappings: &HeaderMappings) -> RequestHeaders;

    /// Returns the attached scope, if any
    fn headers_scope(&self) -> Option<&RequestHeaders>;
}

impl<B> RequestHeadersExt for Request<B> {
    fn attach_headers_scope(&mut self, mappings: &HeaderMappings) -> RequestHeaders {
        if let Some(scope) = self.headers_scope()
            && scope.mappings().same_rules(mappings) {
            return scope.clone();
        }
        let scope = mappings.scope(self.headers());
        self.extensions_mut().insert(scope.clone());
        scope
    }

    #[inline]
    fn headers_scope(&self) -> Option<&RequestHeaders> {
        self.extensions().get::<RequestHeaders>()
    }
}

/// A mapped header value resolved from the scope attached to a request.
///
/// Wraps the per-request instance of `T` through an [`Arc`],
/// so every extraction within one request observes the same value.
///
/// # Example
/// ```
/// use strong_headers::{HeaderMappings, RequestHeadersExt, Typed, error::Error};
/// use http::Request;
///
/// struct ApiKey(Option<String>);
///
/// # fn main() -> Result<(), Error> {
/// let mappings = HeaderMappings::configure(|builder| {
///     builder.add_mapping("ApiKey", |values| ApiKey(values.last().map(Into::into)))?;
///     Ok(())
/// })?;
///
/// let mut req = Request::get("/").header("apikey", "secret").body(()).unwrap();
/// req.attach_headers_scope(&mappings);
///
/// let (parts, _) = req.into_parts();
/// let api_key = Typed::<ApiKey>::try_from(&parts)?;
///
/// assert_eq!(api_key.into_inner().0.as_deref(), Some("secret"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Typed<T: Send + Sync>(Arc<T>);

impl<T: Send + Sync> Clone for Typed<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Send + Sync> Deref for Typed<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Send + Sync> Typed<T> {
    /// Unwraps the inner [`Arc`]
    #[inline]
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T: Send + Sync + Clone> Typed<T> {
    /// Clones and returns the inner `T`.
    #[inline]
    pub fn cloned(&self) -> T {
        self.0.as_ref().clone()
    }
}

impl<T: Send + Sync + 'static> TryFrom<&RequestHeaders> for Typed<T> {
    type Error = Error;

    #[inline]
    fn try_from(scope: &RequestHeaders) -> Result<Self, Self::Error> {
        scope.require::<T>().map(Typed)
    }
}

impl<T: Send + Sync + 'static> TryFrom<&Extensions> for Typed<T> {
    type Error = Error;

    #[inline]
    fn try_from(extensions: &Extensions) -> Result<Self, Self::Error> {
        let scope: &RequestHeaders = extensions.try_into()?;
        Self::try_from(scope)
    }
}

impl<T: Send + Sync + 'static> TryFrom<&Parts> for Typed<T> {
    type Error = Error;

    #[inline]
    fn try_from(parts: &Parts) -> Result<Self, Self::Error> {
        Self::try_from(&parts.extensions)
    }
}
