//! Resource-name helpers
//!
//! Platform resources are addressed by slash-separated names such as
//! `projects/my-project/locations/us-central1/indexes/123`.

use crate::error::{CoreError, Result};
use regex::Regex;
use std::sync::LazyLock;

static RESOURCE_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z]([-a-z0-9]{0,61}[a-z0-9])?$").ok());

/// `projects/{project}/locations/{location}`
pub fn location_path(project: &str, location: &str) -> String {
    format!("projects/{project}/locations/{location}")
}

/// `{parent}/{collection}/{id}`
pub fn child_path(parent: &str, collection: &str, id: &str) -> String {
    format!("{}/{collection}/{id}", parent.trim_end_matches('/'))
}

/// Qualify a bare id under `parent`, leaving full names untouched
///
/// ```rust
/// use vertexctl_core::names::qualify;
///
/// let parent = "projects/p/locations/us-central1";
/// assert_eq!(
///     qualify(parent, "indexes", "123"),
///     "projects/p/locations/us-central1/indexes/123"
/// );
/// assert_eq!(
///     qualify(parent, "indexes", "projects/q/locations/l/indexes/9"),
///     "projects/q/locations/l/indexes/9"
/// );
/// ```
pub fn qualify(parent: &str, collection: &str, id_or_name: &str) -> String {
    if id_or_name.starts_with("projects/") {
        id_or_name.to_string()
    } else {
        child_path(parent, collection, id_or_name)
    }
}

/// Last path segment of a resource name
pub fn resource_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Value following `segment` in a resource name
///
/// `segment_value("projects/p/locations/l/x/1", "locations")` is `Some("l")`.
pub fn segment_value<'a>(name: &'a str, segment: &str) -> Option<&'a str> {
    let mut parts = name.split('/');
    while let Some(part) = parts.next() {
        if part == segment {
            return parts.next().filter(|v| !v.is_empty());
        }
    }
    None
}

/// True for ids matching `[a-z]([-a-z0-9]{0,61}[a-z0-9])?`
pub fn is_valid_resource_id(id: &str) -> bool {
    RESOURCE_ID.as_ref().is_some_and(|re| re.is_match(id))
}

/// Fail with a validation error when a required string is blank
pub(crate) fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CoreError::missing(field))
    } else {
        Ok(trimmed)
    }
}
