use std::io::{Cursor, Read};

use anyhow::{anyhow, Result};
use flate2::read::GzDecoder;
use tracing::debug;

use crate::config::RESERVED_URI_CHARS;
use crate::manifest::NestedManifest;
use crate::urn::DerivativeUrn;

/// Name of the manifest entry inside an SVF archive and of the gzip sibling
/// next to F2D/F3D graphics.
pub const NESTED_MANIFEST_NAME: &str = "manifest.json";

/// File name of the compressed sibling manifest next to F2D/F3D graphics.
pub const SIBLING_MANIFEST_NAME: &str = "manifest.json.gz";

/// Read the nested manifest out of an SVF archive's bytes.
pub fn manifest_from_archive(data: &[u8]) -> Result<NestedManifest> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| anyhow!("corrupt svf archive: {}", e))?;

    let mut entry = archive
        .by_name(NESTED_MANIFEST_NAME)
        .map_err(|e| anyhow!("svf archive has no {}: {}", NESTED_MANIFEST_NAME, e))?;

    let mut json = String::new();
    entry.read_to_string(&mut json)?;

    let manifest = serde_json::from_str(&json)?;
    Ok(manifest)
}

/// Decompress and parse a gzip-compressed nested manifest.
pub fn manifest_from_gzip(data: &[u8]) -> Result<NestedManifest> {
    let mut decoder = GzDecoder::new(data);
    let mut json = String::new();
    decoder
        .read_to_string(&mut json)
        .map_err(|e| anyhow!("corrupt gzip manifest: {}", e))?;

    let manifest = serde_json::from_str(&json)?;
    Ok(manifest)
}

/// Derive a full reference for every safe asset in `manifest`, relative to
/// the container's own reference, and hand each to `submit`. Assets whose
/// URI contains a reserved character are skipped, not fetched.
pub fn submit_assets(
    manifest: &NestedManifest,
    container: &DerivativeUrn,
    submit: &mut impl FnMut(DerivativeUrn),
) {
    for asset in &manifest.assets {
        if asset.uri.contains(&RESERVED_URI_CHARS[..]) {
            debug!("skipping non-path-safe asset uri: {}", asset.uri);
            continue;
        }
        submit(container.resolve(&asset.uri));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    fn svf_with_manifest(json: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(NESTED_MANIFEST_NAME, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(json.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_manifest_from_archive() {
        let data = svf_with_manifest(r#"{ "assets": [ { "URI": "tex/a.png" } ] }"#);
        let manifest = manifest_from_archive(&data).unwrap();
        assert_eq!(manifest.assets.len(), 1);
        assert_eq!(manifest.assets[0].uri, "tex/a.png");
    }

    #[test]
    fn test_manifest_from_archive_rejects_garbage() {
        assert!(manifest_from_archive(b"not a zip").is_err());
    }

    #[test]
    fn test_manifest_from_archive_requires_manifest_entry() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.json", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"{}").unwrap();
        let data = writer.finish().unwrap().into_inner();
        assert!(manifest_from_archive(&data).is_err());
    }

    #[test]
    fn test_manifest_from_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(br#"{ "assets": [ { "URI": "0.pf" }, { "URI": "1.pf" } ] }"#)
            .unwrap();
        let data = encoder.finish().unwrap();

        let manifest = manifest_from_gzip(&data).unwrap();
        assert_eq!(manifest.assets.len(), 2);
    }

    #[test]
    fn test_manifest_from_gzip_rejects_garbage() {
        assert!(manifest_from_gzip(b"definitely not gzip").is_err());
    }

    #[test]
    fn test_submit_assets_filters_reserved_characters() {
        let json = r#"{ "assets": [
            { "URI": "tex/a.png" },
            { "URI": "embed:/fonts" },
            { "URI": "wild*card.bin" },
            { "URI": "what?.bin" },
            { "URI": "geometry.pf" }
        ] }"#;
        let manifest: NestedManifest = serde_json::from_str(json).unwrap();
        let container = DerivativeUrn::new("bucketA/dir1/dir2/file.svf");

        let mut seen = Vec::new();
        submit_assets(&manifest, &container, &mut |r| seen.push(r));

        assert_eq!(
            seen,
            vec![
                DerivativeUrn::new("bucketA/dir1/dir2/tex/a.png"),
                DerivativeUrn::new("bucketA/dir1/dir2/geometry.pf"),
            ]
        );
    }
}
