//! Per-request, case-insensitive view over raw HTTP request headers

use self::split::CommaSeparated;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::{
    borrow::Cow,
    fmt::{Debug, Formatter},
    ops::Deref,
    slice::Iter,
};

mod split;

/// An ordered sequence of header value tokens.
///
/// Repeated occurrences of a header and comma-joined values are flattened
/// into one sequence, preserving both the order and the duplicates.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HeaderValues {
    inner: SmallVec<[String; 1]>,
}

impl HeaderValues {
    /// Creates an empty sequence
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first value of the header, if any
    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.inner.first().map(String::as_str)
    }

    /// Returns the last value of the header, if any
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.inner.last().map(String::as_str)
    }

    /// Returns an iterator over the values as `&str`
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.inner.iter().map(String::as_str)
    }

    /// Returns the values as a slice
    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.inner
    }

    /// Copies the values into a [`Vec`]
    #[inline]
    pub fn to_vec(&self) -> Vec<String> {
        self.inner.to_vec()
    }

    #[inline]
    fn push(&mut self, value: &str) {
        self.inner.push(value.to_owned());
    }

    #[inline]
    fn extend_split(&mut self, raw: &str) {
        for token in CommaSeparated::new(raw) {
            self.push(token);
        }
    }
}

impl Deref for HeaderValues {
    type Target = [String];

    #[inline]
    fn deref(&self) -> &[String] {
        &self.inner
    }
}

impl Debug for HeaderValues {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.inner.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a HeaderValues {
    type Item = &'a String;
    type IntoIter = Iter<'a, String>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for HeaderValues {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { inner: iter.into_iter().map(|s| s.as_ref().to_owned()).collect() }
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for HeaderValues {
    #[inline]
    fn from(values: [S; N]) -> Self {
        values.into_iter().collect()
    }
}

static EMPTY: HeaderValues = HeaderValues { inner: SmallVec::new_const() };

/// A case-insensitive table of request headers: lower-cased name to [`HeaderValues`].
///
/// Construction is total: absent headers simply have no entry.
/// The table is immutable once built and lives as long as the request does.
///
/// # Example
/// ```
/// use strong_headers::HeaderTable;
///
/// let table = HeaderTable::from_pairs([
///     ("X-Correlation-Id", "a, b"),
///     ("x-correlation-id", "c"),
/// ]);
///
/// assert_eq!(table.get("X-CORRELATION-ID").as_slice(), ["a", "b", "c"]);
/// assert!(table.get("ApiKey").is_empty());
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    entries: IndexMap<Box<str>, HeaderValues>,
}

impl HeaderTable {
    /// Creates an empty table, used when no request is available
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from raw `(name, value)` header entries in arrival order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = Self::new();
        for (name, value) in pairs {
            table.append(name.as_ref(), value.as_ref());
        }
        table
    }

    /// Returns the values of a header or an empty sequence if it is absent
    #[inline]
    pub fn get(&self, name: &str) -> &HeaderValues {
        self.try_get(name).unwrap_or(&EMPTY)
    }

    /// Returns the values of a header if it is present
    #[inline]
    pub fn try_get(&self, name: &str) -> Option<&HeaderValues> {
        self.entries.get(normalize(name).as_ref())
    }

    /// Returns `true` if the header is present
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.try_get(name).is_some()
    }

    /// Returns the number of distinct header names
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over lower-cased names and their values
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValues)> {
        self.entries.iter().map(|(name, values)| (name.as_ref(), values))
    }

    /// Appends a raw header occurrence, splitting comma-joined content.
    ///
    /// The entry is created even if the value has no tokens,
    /// so the header is reported as present with an empty sequence.
    pub(crate) fn append(&mut self, name: &str, raw: &str) {
        let key = normalize(name);
        if let Some(values) = self.entries.get_mut(key.as_ref()) {
            values.extend_split(raw);
            return;
        }
        self.entries
            .entry(key.into_owned().into_boxed_str())
            .or_default()
            .extend_split(raw);
    }
}

impl Debug for HeaderTable {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderTable {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Lower-cases a header name, borrowing when it is already lower case
#[inline]
pub(crate) fn normalize(name: &str) -> Cow<'_, str> {
    if name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}
