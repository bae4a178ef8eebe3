// Wire models for the Model Derivative manifest responses.

use serde::{Deserialize, Serialize};

/// Top-level translation manifest for one source model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub status: String,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub derivatives: Vec<ManifestNode>,
}

impl Manifest {
    /// A translation job is usable only once it finished successfully.
    pub fn is_complete(&self) -> bool {
        self.status == "success"
    }
}

/// One entry in the static derivative tree. All attributes are optional on
/// the wire; intermediate grouping nodes often carry only `children`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestNode {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub urn: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<ManifestNode>>,
}

/// Secondary manifest embedded in (or adjacent to) a fetched container,
/// listing further assets relative to the container's own directory.
/// Parsed, consumed, and discarded.
#[derive(Debug, Deserialize)]
pub struct NestedManifest {
    #[serde(default)]
    pub assets: Vec<NestedAsset>,
}

#[derive(Debug, Deserialize)]
pub struct NestedAsset {
    #[serde(rename = "URI")]
    pub uri: String,
}
