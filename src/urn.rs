// Derivative reference handling — the dedup key of the whole engine.

use std::fmt;
use std::path::PathBuf;

/// A derivative's location in the job's virtual output namespace,
/// structurally `<root-segment>/<path...>`. Two references are equal iff
/// their string values are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivativeUrn(String);

impl DerivativeUrn {
    pub fn new(urn: impl Into<String>) -> Self {
        Self(urn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything up to the first `/` (typically the encoded file urn).
    pub fn root_segment(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// The mirrored path under the output directory: the reference with its
    /// root segment stripped.
    pub fn local_path(&self) -> PathBuf {
        self.0.split('/').skip(1).collect()
    }

    /// Extension of the final path segment, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit('/').next()?;
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Derive the reference of a file named relative to this reference's
    /// directory: the root segment plus the directory prefix, joined with
    /// `relative`. Backslashes are treated as separators and `.`/`..`
    /// segments are collapsed, matching how nested manifests address assets.
    pub fn resolve(&self, relative: &str) -> DerivativeUrn {
        let segments: Vec<&str> = self.0.split('/').collect();
        let root = segments[0];

        // Directory prefix: everything between the root and the file name.
        let mut path: Vec<&str> = if segments.len() > 2 {
            segments[1..segments.len() - 1].to_vec()
        } else {
            Vec::new()
        };

        let normalized = relative.replace('\\', "/");
        for part in normalized.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    path.pop();
                }
                part => path.push(part),
            }
        }

        DerivativeUrn(format!("{}/{}", root, path.join("/")))
    }
}

impl fmt::Display for DerivativeUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
