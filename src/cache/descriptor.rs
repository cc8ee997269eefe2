//! Package identity and cache filenames.

use crate::error::{FetchError, Result};

/// Extension of cached package artifacts.
pub const ARTIFACT_EXT: &str = "gem";

/// Identifies the artifact to retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub platform: String,
    /// Platform as originally requested. Differs from `platform` when the
    /// resolver picked a platform-specific build that the source might only
    /// publish under the platform-agnostic name.
    pub original_platform: String,
}

impl PackageDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        let platform = platform.into();
        Self {
            name: name.into(),
            version: version.into(),
            original_platform: platform.clone(),
            platform,
        }
    }

    pub fn with_original_platform(mut self, original_platform: impl Into<String>) -> Self {
        self.original_platform = original_platform.into();
        self
    }

    /// `name-version-platform`
    pub fn full_name(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.platform)
    }

    /// `name-version`
    pub fn original_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Canonical cache filename: `name-version-platform.gem`.
    pub fn cache_file_name(&self) -> String {
        format!("{}.{}", self.full_name(), ARTIFACT_EXT)
    }

    /// Fallback filename: `name-version.gem`.
    pub fn alternate_file_name(&self) -> String {
        format!("{}.{}", self.original_name(), ARTIFACT_EXT)
    }

    /// True when an alternate filename is worth trying.
    pub fn has_alternate(&self) -> bool {
        self.original_platform != self.platform
    }

    /// Rejects descriptors whose parts would not form a plain filename.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("version", &self.version),
            ("platform", &self.platform),
        ] {
            if !is_plain_component(value) {
                return Err(FetchError::InvalidArgument(format!(
                    "package {} {:?} is not a plain filename component",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

fn is_plain_component(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && !s
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        let d = PackageDescriptor::new("foo", "1.0", "ruby");
        assert_eq!(d.cache_file_name(), "foo-1.0-ruby.gem");
        assert_eq!(d.alternate_file_name(), "foo-1.0.gem");
        assert!(!d.has_alternate());
    }

    #[test]
    fn platform_variant_has_alternate() {
        let d = PackageDescriptor::new("nokogiri", "1.16.0", "x86_64-linux")
            .with_original_platform("ruby");
        assert_eq!(d.cache_file_name(), "nokogiri-1.16.0-x86_64-linux.gem");
        assert_eq!(d.alternate_file_name(), "nokogiri-1.16.0.gem");
        assert!(d.has_alternate());
    }

    #[test]
    fn validate_rejects_path_tricks() {
        assert!(PackageDescriptor::new("foo", "1.0", "ruby").validate().is_ok());
        assert!(PackageDescriptor::new("../foo", "1.0", "ruby").validate().is_err());
        assert!(PackageDescriptor::new("foo", "", "ruby").validate().is_err());
        assert!(PackageDescriptor::new("foo", "1.0", "..").validate().is_err());
        assert!(PackageDescriptor::new("foo", "1.0", "a\\b").validate().is_err());
    }
}
