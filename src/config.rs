use serde::Deserialize;

/// Role assigned to property-database derivatives, excluded by default.
pub const PROPERTY_DATABASE_ROLE: &str = "Autodesk.CloudPlatform.PropertyDatabase";

/// Characters that mark a nested asset URI as non-path-safe; such assets are
/// listed in manifests but must never be fetched.
pub const RESERVED_URI_CHARS: [char; 6] = [':', '?', '*', '<', '>', '|'];

/// Split a comma-separated option value into trimmed, non-empty entries.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inclusion rules applied to the static manifest tree.
///
/// Only the top-level walk is filtered; references discovered inside fetched
/// containers are always persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Roles whose nodes are skipped unless force-included.
    pub excluded_roles: Vec<String>,
    /// Explicit allow-list of viewable GUIDs. `None` means all viewables.
    pub targets: Option<Vec<String>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_roles: vec![PROPERTY_DATABASE_ROLE.to_string()],
            targets: None,
        }
    }
}

impl FilterConfig {
    pub fn role_excluded(&self, role: Option<&str>) -> bool {
        match role {
            Some(role) => self.excluded_roles.iter().any(|r| r == role),
            None => false,
        }
    }

    /// Whether a GUID passes the allow-list (vacuously true without one).
    pub fn target_allowed(&self, guid: &str) -> bool {
        match &self.targets {
            Some(targets) => targets.iter().any(|t| t == guid),
            None => true,
        }
    }

    /// Whether a GUID is explicitly named in the allow-list.
    pub fn is_explicit_target(&self, guid: Option<&str>) -> bool {
        match (&self.targets, guid) {
            (Some(targets), Some(guid)) => targets.iter().any(|t| t == guid),
            _ => false,
        }
    }
}
