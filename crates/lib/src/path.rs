//! Path types for addressing nodes in a repository.
//!
//! This module provides type-safe construction of absolute, `/`-separated
//! repository paths. The [`Path`]/[`PathBuf`] types follow the same
//! borrowed/owned pattern as `std::path::Path`/`PathBuf`.
//!
//! All constructors normalize their input, so path operations are
//! infallible: duplicate and trailing separators collapse, and the empty
//! string denotes the repository root `/`.
//!
//! # Usage
//!
//! ```rust
//! use foliate::path::PathBuf;
//! use std::str::FromStr;
//!
//! let path = PathBuf::from_str("/apps/dx/component")?;
//! assert_eq!(path.name(), Some("component"));
//! assert_eq!(path.parent().unwrap().as_str(), "/apps/dx");
//!
//! // Joining normalizes, whether the suffix is written relative or absolute
//! let child = path.join("cq:dialog/content");
//! assert_eq!(child.as_str(), "/apps/dx/component/cq:dialog/content");
//! # Ok::<(), std::convert::Infallible>(())
//! ```

use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalizes a path string into canonical absolute form.
///
/// - Empty components collapse: `"/a//b/"` → `"/a/b"`
/// - A leading `/` is always present: `"a/b"` → `"/a/b"`
/// - The empty string and pure separators denote the root: `""` → `"/"`
pub fn normalize_path(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 1);
    for component in input.split('/').filter(|c| !c.is_empty()) {
        out.push('/');
        out.push_str(component);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// An owned, normalized repository path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathBuf {
    inner: String,
}

/// A borrowed, normalized repository path.
///
/// `Path` is the borrowed counterpart to [`PathBuf`], similar to how `&str`
/// relates to `String`. This type is unsized and must always be used behind
/// a reference.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Path {
    inner: str,
}

impl PathBuf {
    /// Creates the root path `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    /// Creates a `PathBuf` by normalizing the input string.
    pub fn normalize(path: impl AsRef<str>) -> Self {
        Self {
            inner: normalize_path(path.as_ref()),
        }
    }
}

impl Path {
    /// Creates a `Path` from a string without normalizing.
    ///
    /// # Safety
    /// The caller must ensure the string is already in canonical form:
    /// leading `/`, no empty components, no trailing separator (except for
    /// the root path `/` itself). Intended for compile-time literals.
    pub unsafe fn from_str_unchecked(s: &str) -> &Path {
        // SAFETY: Path has the same memory layout as str
        unsafe { &*(s as *const str as *const Path) }
    }

    /// Returns an iterator over the path components as string slices.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// Returns the number of components in the path. The root has zero.
    pub fn len(&self) -> usize {
        self.components().count()
    }

    /// Returns `true` if this is the repository root `/`.
    pub fn is_root(&self) -> bool {
        &self.inner == "/"
    }

    /// Returns `true` if the path has no components.
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Returns the last component of the path, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.inner.split('/').filter(|s| !s.is_empty()).next_back()
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<PathBuf> {
        if self.is_root() {
            return None;
        }
        let last = self.inner.rfind('/').unwrap_or(0);
        Some(if last == 0 {
            PathBuf::root()
        } else {
            PathBuf {
                inner: self.inner[..last].to_string(),
            }
        })
    }

    /// Joins a suffix onto this path, normalizing the result.
    ///
    /// The suffix may be written relative (`"a/b"`) or absolute (`"/a/b"`);
    /// both append the same components.
    pub fn join(&self, suffix: impl AsRef<str>) -> PathBuf {
        PathBuf {
            inner: normalize_path(&format!("{}/{}", &self.inner, suffix.as_ref())),
        }
    }

    /// Returns `true` if `prefix` is a leading component sequence of this
    /// path. Every path starts with the root.
    pub fn starts_with(&self, prefix: impl AsRef<Path>) -> bool {
        let prefix = prefix.as_ref();
        if prefix.is_root() {
            return true;
        }
        self.inner == prefix.inner
            || self
                .inner
                .strip_prefix(&prefix.inner)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Strips a leading component sequence, returning the remainder.
    ///
    /// Returns `None` when `prefix` is not a prefix of this path. Stripping
    /// a path from itself yields the root.
    pub fn strip_prefix(&self, prefix: impl AsRef<Path>) -> Option<PathBuf> {
        let prefix = prefix.as_ref();
        if !self.starts_with(prefix) {
            return None;
        }
        if prefix.is_root() {
            return Some(self.to_path_buf());
        }
        Some(PathBuf::normalize(&self.inner[prefix.inner.len()..]))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Converts this `Path` to an owned [`PathBuf`].
    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Default for PathBuf {
    fn default() -> Self {
        Self::root()
    }
}

impl Deref for PathBuf {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        // Safe because Path has the same layout as str and inner is normalized
        unsafe { Path::from_str_unchecked(self.inner.as_str()) }
    }
}

impl AsRef<Path> for PathBuf {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl AsRef<Path> for Path {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for PathBuf {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Borrow<Path> for PathBuf {
    fn borrow(&self) -> &Path {
        self
    }
}

impl ToOwned for Path {
    type Owned = PathBuf;

    fn to_owned(&self) -> PathBuf {
        self.to_path_buf()
    }
}

impl FromStr for PathBuf {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<&Path> for PathBuf {
    fn from(path: &Path) -> Self {
        path.to_path_buf()
    }
}

impl From<&str> for PathBuf {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl fmt::Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.inner)
    }
}

impl Serialize for PathBuf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for PathBuf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(PathBuf::normalize(&s))
    }
}
