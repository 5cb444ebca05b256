//! End-to-end engine tests: stubbed extraction, mocked catalog, real
//! filesystem artifacts in a temporary library tree.

mod support;
use support::socket_guard::start_mock_server_or_skip;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shelfsync_core::artifact::{COVER_FILENAME, DESCRIPTOR_FILENAME};
use shelfsync_core::{
    ArtifactWriter, ExtractError, GoogleBooksClient, LocalMetadata, MetadataExtractor,
    ReconcileEngine,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, Request, ResponseTemplate};

/// Matches on the raw (still `+`-joined) query string of a request.
struct RawQuery(&'static str);

impl Match for RawQuery {
    fn matches(&self, request: &Request) -> bool {
        request.url.query() == Some(self.0)
    }
}

/// Extractor stub returning the same metadata for every file, so tests can
/// drive the pipeline without a Calibre installation.
struct StubExtractor {
    metadata: LocalMetadata,
}

#[async_trait]
impl MetadataExtractor for StubExtractor {
    async fn extract(&self, _epub_path: &Path) -> Result<Option<LocalMetadata>, ExtractError> {
        Ok(Some(self.metadata.clone()))
    }
}

fn engine_with(metadata: LocalMetadata, base_url: String) -> ReconcileEngine {
    ReconcileEngine::with_components(
        Box::new(StubExtractor { metadata }),
        GoogleBooksClient::with_base_url(base_url),
        ArtifactWriter::new(),
    )
}

fn add_item(root: &Path, dir_name: &str, file_name: &str) -> PathBuf {
    let item_dir = root.join(dir_name);
    std::fs::create_dir_all(&item_dir).unwrap();
    std::fs::write(item_dir.join(file_name), b"epub-bytes").unwrap();
    item_dir
}

fn single_volume_json(title: &str, thumbnail: Option<&str>) -> serde_json::Value {
    let mut volume_info = serde_json::json!({
        "title": title,
        "authors": ["Bar"],
        "categories": ["Fiction"],
    });
    if let Some(url) = thumbnail {
        volume_info["imageLinks"] = serde_json::json!({ "thumbnail": url });
    }
    serde_json::json!({
        "kind": "books#volumes",
        "totalItems": 1,
        "items": [{ "volumeInfo": volume_info }]
    })
}

#[tokio::test]
async fn test_matched_item_renames_folder_and_writes_descriptor() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    // Raw title carries a volume marker and a parenthetical; the catalog
    // query must be built from the normalized form.
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(RawQuery("q=Foo+inauthor:Bar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_volume_json("Foo", None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let original_dir = add_item(root.path(), "foo_t2_special", "book.epub");

    let engine = engine_with(
        LocalMetadata {
            title: "Foo T2 (Special)".to_string(),
            author: "Bar".to_string(),
            isbn: None,
        },
        mock_server.uri(),
    );
    let report = engine.run(root.path(), false).await;

    assert_eq!(report.processed, 1);
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched, 0);

    let renamed_dir = root.path().join("Foo");
    assert!(renamed_dir.is_dir(), "item folder renamed to matched title");
    assert!(!original_dir.exists(), "original folder no longer present");

    let descriptor = std::fs::read_to_string(renamed_dir.join(DESCRIPTOR_FILENAME)).unwrap();
    assert!(descriptor.contains("<dc:title>Foo</dc:title>"));
    assert!(descriptor.contains("<dc:subject>Fiction</dc:subject>"));

    assert!(
        !renamed_dir.join(COVER_FILENAME).exists(),
        "no thumbnail link means no cover file"
    );
}

#[tokio::test]
async fn test_matched_item_with_thumbnail_downloads_cover() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    let thumbnail_url = format!("{}/thumb.jpg", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(single_volume_json("Foo", Some(&thumbnail_url))),
        )
        .mount(&mock_server)
        .await;

    let cover_bytes: &[u8] = b"\xFF\xD8fake-jpeg-data";
    Mock::given(method("GET"))
        .and(path("/thumb.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(cover_bytes)
                .insert_header("Content-Type", "image/jpeg"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    add_item(root.path(), "foo", "book.epub");

    let engine = engine_with(
        LocalMetadata {
            title: "Foo".to_string(),
            author: "Bar".to_string(),
            isbn: None,
        },
        mock_server.uri(),
    );
    let report = engine.run(root.path(), false).await;

    assert_eq!(report.matched, 1);
    let written = std::fs::read(root.path().join("Foo").join(COVER_FILENAME)).unwrap();
    assert_eq!(written, cover_bytes);
}

#[tokio::test]
async fn test_unmatched_item_recorded_with_normalized_title() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    // Both tiers miss: ISBN tier returns no items, fallback tier 404s.
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", "isbn:1234567890123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "books#volumes",
            "totalItems": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(RawQuery("q=Ghost+Book+inauthor:Nobody"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let item_dir = add_item(root.path(), "ghost", "book.epub");

    let engine = engine_with(
        LocalMetadata {
            title: "Ghost Book T3".to_string(),
            author: "Nobody".to_string(),
            isbn: Some("1234567890123".to_string()),
        },
        mock_server.uri(),
    );
    let report = engine.run(root.path(), false).await;

    assert_eq!(report.processed, 1);
    assert_eq!(report.matched, 0);
    assert_eq!(report.unmatched, 1);

    let entry = &report.unmatched_items[0];
    assert_eq!(entry.author, "Nobody");
    assert_eq!(entry.title, "Ghost Book", "report carries the normalized title");
    assert_eq!(entry.isbn.as_deref(), Some("1234567890123"));
    assert!(entry.source_path.ends_with("book.epub"));

    assert!(item_dir.is_dir(), "unmatched item folder left untouched");
    assert!(!item_dir.join(DESCRIPTOR_FILENAME).exists());
}

#[tokio::test]
async fn test_unmatched_items_recorded_in_sorted_walk_order() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    // Created out of order on purpose; the walk sorts collected files.
    add_item(root.path(), "zeta", "z.epub");
    add_item(root.path(), "alpha", "a.epub");

    let engine = engine_with(
        LocalMetadata {
            title: "Foo".to_string(),
            author: "Bar".to_string(),
            isbn: None,
        },
        mock_server.uri(),
    );
    let report = engine.run(root.path(), false).await;

    assert_eq!(report.unmatched, 2);
    assert!(report.unmatched_items[0].source_path.contains("alpha"));
    assert!(report.unmatched_items[1].source_path.contains("zeta"));
}

#[tokio::test]
async fn test_rename_collision_keeps_second_item_in_place() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    // Two different items match the same catalog title.
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_volume_json("Foo", None)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    add_item(root.path(), "alpha", "a.epub");
    let second_dir = add_item(root.path(), "beta", "b.epub");

    let engine = engine_with(
        LocalMetadata {
            title: "Foo".to_string(),
            author: "Bar".to_string(),
            isbn: None,
        },
        mock_server.uri(),
    );
    let report = engine.run(root.path(), false).await;

    assert_eq!(report.matched, 2);

    // First item claimed the target name; the second kept its folder and
    // still received a descriptor there.
    assert!(root.path().join("Foo").join(DESCRIPTOR_FILENAME).is_file());
    assert!(second_dir.join(DESCRIPTOR_FILENAME).is_file());
    assert!(!root.path().join("alpha").exists());
}

#[tokio::test]
async fn test_run_on_missing_root_reports_nothing() {
    let root = TempDir::new().unwrap();
    let engine = engine_with(
        LocalMetadata {
            title: "Foo".to_string(),
            author: "Bar".to_string(),
            isbn: None,
        },
        "http://127.0.0.1:9".to_string(),
    );

    let report = engine.run(&root.path().join("ebooks"), false).await;

    assert_eq!(report.processed, 0);
    assert_eq!(report.matched, 0);
    assert_eq!(report.unmatched, 0);
    assert!(report.unmatched_items.is_empty());
}
