use std::io::{Cursor, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use forge_mirror::extract::container::{classify, ContainerKind};
use forge_mirror::extract::nested;
use forge_mirror::urn::DerivativeUrn;

fn svf_archive(manifest_json: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(nested::NESTED_MANIFEST_NAME, SimpleFileOptions::default())
        .unwrap();
    writer.write_all(manifest_json.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn test_svf_archive_to_references() {
    let data = svf_archive(
        r#"{ "assets": [
            { "URI": "tex/a.png" },
            { "URI": "embed:/font.ttf" },
            { "URI": "0.pf" }
        ] }"#,
    );

    let container = DerivativeUrn::new("bucketA/dir1/dir2/file.svf");
    assert_eq!(classify(&container), ContainerKind::SvfArchive);

    let manifest = nested::manifest_from_archive(&data).unwrap();
    let mut refs = Vec::new();
    nested::submit_assets(&manifest, &container, &mut |r| refs.push(r));

    assert_eq!(
        refs,
        vec![
            DerivativeUrn::new("bucketA/dir1/dir2/tex/a.png"),
            DerivativeUrn::new("bucketA/dir1/dir2/0.pf"),
        ]
    );
}

#[test]
fn test_gzip_sibling_to_references() {
    let data = gzip(br#"{ "assets": [ { "URI": "res\\img.png" } ] }"#);

    let container = DerivativeUrn::new("bucketA/2d/sheet.f2d");
    assert_eq!(classify(&container), ContainerKind::SheetGraphics);
    assert_eq!(
        container.resolve(nested::SIBLING_MANIFEST_NAME).as_str(),
        "bucketA/2d/manifest.json.gz"
    );

    let manifest = nested::manifest_from_gzip(&data).unwrap();
    let mut refs = Vec::new();
    nested::submit_assets(&manifest, &container, &mut |r| refs.push(r));

    // Backslash separators are normalized during reference derivation.
    assert_eq!(refs, vec![DerivativeUrn::new("bucketA/2d/res/img.png")]);
}

#[test]
fn test_reserved_characters_never_submitted() {
    let manifest: forge_mirror::manifest::NestedManifest = serde_json::from_str(
        r#"{ "assets": [
            { "URI": "a*b.bin" },
            { "URI": "c:d.bin" },
            { "URI": "e<f>.bin" },
            { "URI": "g|h.bin" },
            { "URI": "i?.bin" }
        ] }"#,
    )
    .unwrap();

    let container = DerivativeUrn::new("b/file.svf");
    let mut refs = Vec::new();
    nested::submit_assets(&manifest, &container, &mut |r| refs.push(r));
    assert!(refs.is_empty());
}

#[test]
fn test_empty_asset_list_is_fine() {
    let data = svf_archive(r#"{ "assets": [] }"#);
    let manifest = nested::manifest_from_archive(&data).unwrap();
    assert!(manifest.assets.is_empty());
}

#[test]
fn test_corrupt_containers_are_errors() {
    assert!(nested::manifest_from_archive(b"not a zip at all").is_err());
    assert!(nested::manifest_from_gzip(b"not gzip either").is_err());

    // Valid zip, malformed JSON inside.
    let data = svf_archive("{ this is not json");
    assert!(nested::manifest_from_archive(&data).is_err());
}
