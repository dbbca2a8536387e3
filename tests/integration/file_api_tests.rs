//! Integration tests for the virtual file tree API

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use battlecry_tests::common::{TestHarness, HELLO_COMPILER};
use serde_json::json;

fn create(path: &str, content: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/files")
        .set_json(json!({ "path": path, "content": content }))
}

#[actix_web::test]
async fn test_create_and_read_file() {
    let harness = TestHarness::new(HELLO_COMPILER);

    let (status, body) = harness.send(create("/main.dart", "void main() {}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["file"]["path"], "/main.dart");
    assert_eq!(body["file"]["type"], "file");
    assert_eq!(body["file"]["permissions"], "-rw-r--r--");
    assert_eq!(body["file"]["size"], 14);
    assert!(body["file"]["createdAt"].is_string());

    let (status, body) = harness
        .send(TestRequest::get().uri("/api/files/main.dart"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file"]["content"], "void main() {}");
}

#[actix_web::test]
async fn test_create_rejects_duplicates_and_missing_path() {
    let harness = TestHarness::new(HELLO_COMPILER);

    harness.send(create("/main.dart", "")).await;
    let (status, body) = harness.send(create("/main.dart", "again")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "success": false, "error": "File already exists" }));

    let (status, body) = harness
        .send(
            TestRequest::post()
                .uri("/api/files")
                .set_json(json!({ "content": "orphan" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Path is required");
}

#[actix_web::test]
async fn test_create_with_explicit_type_and_permissions() {
    let harness = TestHarness::new(HELLO_COMPILER);

    let (_, body) = harness
        .send(TestRequest::post().uri("/api/files").set_json(json!({
            "path": "/bin",
            "type": "directory"
        })))
        .await;
    assert_eq!(body["file"]["type"], "directory");
    assert_eq!(body["file"]["permissions"], "drwxr-xr-x");

    let (_, body) = harness
        .send(TestRequest::post().uri("/api/files").set_json(json!({
            "path": "/run.sh",
            "content": "echo",
            "permissions": "-rwxr-xr-x"
        })))
        .await;
    assert_eq!(body["file"]["permissions"], "-rwxr-xr-x");
}

#[actix_web::test]
async fn test_read_missing_file() {
    let harness = TestHarness::new(HELLO_COMPILER);

    let (status, body) = harness
        .send(TestRequest::get().uri("/api/files/nope.dart"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "File not found" }));
}

#[actix_web::test]
async fn test_update_file() {
    let harness = TestHarness::new(HELLO_COMPILER);
    harness.send(create("/lib/util.dart", "int one() => 1;")).await;

    let (status, body) = harness
        .send(
            TestRequest::put()
                .uri("/api/files/lib/util.dart")
                .set_json(json!({ "content": "int two() => 2;;" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file"]["content"], "int two() => 2;;");
    assert_eq!(body["file"]["size"], 16);
    assert_eq!(body["file"]["permissions"], "-rw-r--r--");

    let (_, body) = harness
        .send(
            TestRequest::put()
                .uri("/api/files/lib/util.dart")
                .set_json(json!({ "permissions": "-r--r--r--" })),
        )
        .await;
    assert_eq!(body["file"]["permissions"], "-r--r--r--");
    assert_eq!(body["file"]["content"], "int two() => 2;;");

    let (status, _) = harness
        .send(
            TestRequest::put()
                .uri("/api/files/lib/missing.dart")
                .set_json(json!({ "content": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_file() {
    let harness = TestHarness::new(HELLO_COMPILER);
    harness.send(create("/main.dart", "")).await;

    let (status, body) = harness
        .send(TestRequest::delete().uri("/api/files/main.dart"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "File deleted" }));

    let (status, _) = harness
        .send(TestRequest::delete().uri("/api/files/main.dart"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_list_direct_children() {
    let harness = TestHarness::new(HELLO_COMPILER);
    harness
        .send(
            TestRequest::post()
                .uri("/api/directories")
                .set_json(json!({ "path": "/lib" })),
        )
        .await;
    for path in ["/main.dart", "/lib/util.dart", "/lib/src/deep.dart"] {
        harness.send(create(path, "")).await;
    }

    let (status, body) = harness.send(TestRequest::get().uri("/api/files")).await;
    assert_eq!(status, StatusCode::OK);
    let root: Vec<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|file| file["path"].as_str().unwrap())
        .collect();
    assert_eq!(root, vec!["/lib", "/main.dart"]);

    let (_, body) = harness
        .send(TestRequest::get().uri("/api/files?path=/lib"))
        .await;
    let lib: Vec<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|file| file["path"].as_str().unwrap())
        .collect();
    assert_eq!(lib, vec!["/lib/util.dart"]);
}

#[actix_web::test]
async fn test_create_directory() {
    let harness = TestHarness::new(HELLO_COMPILER);
    let mkdir = || {
        TestRequest::post()
            .uri("/api/directories")
            .set_json(json!({ "path": "/lib" }))
    };

    let (status, body) = harness.send(mkdir()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["directory"]["type"], "directory");
    assert_eq!(body["directory"]["size"], 4096);
    assert_eq!(body["directory"]["permissions"], "drwxr-xr-x");

    let (status, body) = harness.send(mkdir()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Directory already exists");

    let (status, body) = harness
        .send(
            TestRequest::post()
                .uri("/api/directories")
                .set_json(json!({ "path": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Path is required");
}
