//! Prebuilt Ray image selection and parsing

use crate::error::{CoreError, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const SUPPORTED_RAY_VERSIONS: &[&str] = &["2.9", "2.33", "2.42"];
pub const SUPPORTED_PYTHON_VERSIONS: &[&str] = &["3.10", "3.11"];
pub const DEFAULT_RAY_VERSION: &str = "2.33";
pub const DEFAULT_PYTHON_VERSION: &str = "3.10";

static PREBUILT_IMAGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"vertex-ai/training/ray-(?:cpu|gpu)\.(\d+)-(\d+)\.py(\d)(\d+)").ok()
});

/// Reject version pairs with no prebuilt image
pub fn validate_versions(ray_version: &str, python_version: &str) -> Result<()> {
    if !SUPPORTED_RAY_VERSIONS.contains(&ray_version) {
        return Err(CoreError::Validation(format!(
            "Ray version {ray_version} is not supported; use one of {}",
            SUPPORTED_RAY_VERSIONS.join(", ")
        )));
    }
    if !SUPPORTED_PYTHON_VERSIONS.contains(&python_version) {
        return Err(CoreError::Validation(format!(
            "Python version {python_version} is not supported; use one of {}",
            SUPPORTED_PYTHON_VERSIONS.join(", ")
        )));
    }
    if ray_version == "2.9" && python_version != "3.10" {
        return Err(CoreError::Validation(format!(
            "Ray 2.9 only supports Python 3.10, got {python_version}"
        )));
    }
    Ok(())
}

/// Artifact Registry multi-region serving `location`
fn image_region(location: &str) -> &'static str {
    match location.split('-').next() {
        Some("europe") => "europe",
        Some("asia") => "asia",
        _ => "us",
    }
}

/// Prebuilt image URI for a Ray/Python pair
///
/// ```rust
/// use vertexctl_core::ray::images::default_image_uri;
///
/// assert_eq!(
///     default_image_uri("2.33", "3.10", "europe-west4", true),
///     "europe-docker.pkg.dev/vertex-ai/training/ray-gpu.2-33.py310:latest"
/// );
/// ```
pub fn default_image_uri(ray_version: &str, python_version: &str, location: &str, gpu: bool) -> String {
    format!(
        "{}-docker.pkg.dev/vertex-ai/training/ray-{}.{}.py{}:latest",
        image_region(location),
        if gpu { "gpu" } else { "cpu" },
        ray_version.replace('.', "-"),
        python_version.replace('.', ""),
    )
}

/// Ray and Python versions encoded in a prebuilt image URI
///
/// Custom images yield `None`.
pub fn parse_image_uri(uri: &str) -> Option<(String, String)> {
    let caps = PREBUILT_IMAGE.as_ref()?.captures(uri)?;
    Some((
        format!("{}.{}", &caps[1], &caps[2]),
        format!("{}.{}", &caps[3], &caps[4]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_rules() {
        assert!(validate_versions("2.33", "3.10").is_ok());
        assert!(validate_versions("2.42", "3.11").is_ok());
        assert!(validate_versions("2.9", "3.10").is_ok());
        assert!(validate_versions("2.9", "3.11").is_err());
        assert!(validate_versions("2.4", "3.10").is_err());
        assert!(validate_versions("2.33", "3.12").is_err());
    }

    #[test]
    fn test_image_region() {
        assert!(default_image_uri("2.42", "3.11", "us-central1", false)
            .starts_with("us-docker.pkg.dev/vertex-ai/training/ray-cpu.2-42.py311"));
        assert!(default_image_uri("2.33", "3.10", "asia-northeast1", false).starts_with("asia-"));
        assert!(default_image_uri("2.33", "3.10", "me-west1", false).starts_with("us-"));
    }

    #[test]
    fn test_parse_image_uri() {
        assert!(PREBUILT_IMAGE.is_some());
        let uri = default_image_uri("2.33", "3.10", "us-central1", true);
        assert_eq!(
            parse_image_uri(&uri),
            Some(("2.33".to_string(), "3.10".to_string()))
        );
        assert_eq!(parse_image_uri("gcr.io/acme/my-ray:latest"), None);
    }
}
