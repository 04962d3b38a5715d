//! The structured result of classifying one user-agent string.

use serde::Serialize;

/// Attributes extracted from a raw user-agent string.
///
/// Each sub-field may be empty, meaning "unknown / not applicable".
/// A `Classification` is immutable once produced; the cache stores and
/// returns it wholesale and never edits a stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Browser family, e.g. `"Mobile Safari"`.
    pub browser_family: String,
    /// Browser major version component.
    pub browser_major: String,
    /// Browser minor version component.
    pub browser_minor: String,
    /// Browser patch version component.
    pub browser_patch: String,

    /// Operating-system family, e.g. `"iOS"`.
    pub os_family: String,
    /// OS major version component.
    pub os_major: String,
    /// OS minor version component.
    pub os_minor: String,
    /// OS patch version component.
    pub os_patch: String,
    /// OS patch-minor version component.
    pub os_patch_minor: String,

    /// Device family, e.g. `"iPhone"`.
    pub device_family: String,
}

impl Classification {
    /// Dotted OS version string, joined up to the first empty component.
    ///
    /// `major="9", minor="1"` renders as `"9.1"`; trailing empty components
    /// are omitted, so an all-empty version yields an empty string.
    ///
    /// # Example
    /// ```
    /// use ua_decoder::Classification;
    ///
    /// let c = Classification {
    ///     os_major: "10".to_string(),
    ///     os_minor: "2".to_string(),
    ///     ..Classification::default()
    /// };
    /// assert_eq!(c.os_version_string(), "10.2");
    /// ```
    pub fn os_version_string(&self) -> String {
        let components = [
            &self.os_major,
            &self.os_minor,
            &self.os_patch,
            &self.os_patch_minor,
        ];

        let mut joined = String::new();
        for component in components {
            if component.is_empty() {
                break;
            }
            if !joined.is_empty() {
                joined.push('.');
            }
            joined.push_str(component);
        }
        joined
    }

    /// True when every sub-field is empty and there is nothing to project.
    pub fn is_empty(&self) -> bool {
        self.browser_family.is_empty()
            && self.browser_major.is_empty()
            && self.browser_minor.is_empty()
            && self.browser_patch.is_empty()
            && self.os_family.is_empty()
            && self.os_major.is_empty()
            && self.os_minor.is_empty()
            && self.os_patch.is_empty()
            && self.os_patch_minor.is_empty()
            && self.device_family.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_os_version(major: &str, minor: &str, patch: &str, patch_minor: &str) -> Classification {
        Classification {
            os_major: major.to_string(),
            os_minor: minor.to_string(),
            os_patch: patch.to_string(),
            os_patch_minor: patch_minor.to_string(),
            ..Classification::default()
        }
    }

    #[test]
    fn test_version_string_full() {
        let c = with_os_version("10", "2", "1", "3");
        assert_eq!(c.os_version_string(), "10.2.1.3");
    }

    #[test]
    fn test_version_string_stops_at_first_empty() {
        let c = with_os_version("9", "1", "", "5");
        assert_eq!(c.os_version_string(), "9.1");
    }

    #[test]
    fn test_version_string_major_only() {
        let c = with_os_version("11", "", "", "");
        assert_eq!(c.os_version_string(), "11");
    }

    #[test]
    fn test_version_string_empty() {
        let c = Classification::default();
        assert_eq!(c.os_version_string(), "");
    }

    #[test]
    fn test_is_empty() {
        assert!(Classification::default().is_empty());

        let c = Classification {
            device_family: "iPhone".to_string(),
            ..Classification::default()
        };
        assert!(!c.is_empty());
    }
}
