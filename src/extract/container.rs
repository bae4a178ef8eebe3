use crate::urn::DerivativeUrn;

/// Container kinds that carry further asset references. Everything else is
/// persisted as-is.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ContainerKind {
    /// `.svf` — zip archive with a single embedded `manifest.json` entry.
    SvfArchive,
    /// `.f2d`/`.f3d` — a gzip-compressed `manifest.json.gz` sits next to the
    /// file in the same virtual directory.
    SheetGraphics,
    /// No nested assets to discover.
    Opaque,
}

/// Classify a derivative by the extension of its final path segment.
pub fn classify(reference: &DerivativeUrn) -> ContainerKind {
    match reference.extension() {
        Some("svf") => ContainerKind::SvfArchive,
        Some("f2d") | Some("f3d") => ContainerKind::SheetGraphics,
        _ => ContainerKind::Opaque,
    }
}
