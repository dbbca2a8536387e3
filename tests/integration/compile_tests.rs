//! Integration tests for POST /compile
//!
//! Every test drives the real route table, validator, workspace manager
//! and process runner against a stub `sh` compiler.

#![cfg(unix)]

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use battlecry_sandbox::CompileLimits;
use battlecry_tests::common::{
    TestHarness, ECHO_COMPILER, FAILING_COMPILER, HANGING_COMPILER, HELLO_COMPILER,
};
use serde_json::json;
use std::time::{Duration, Instant};

#[actix_web::test]
async fn test_js_compile_success() {
    let harness = TestHarness::new(HELLO_COMPILER);

    let (status, body) = harness
        .compile(json!({ "code": "void main() { print('hi'); }", "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["output"], "console.log(\"hi\");");
    assert_eq!(body["target"], "js");
    assert_eq!(body["stderr"], "");
    assert!(body["stdout"].as_str().unwrap().starts_with("Compiled "));
    assert!(body.get("error").is_none());
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_native_compile_returns_summary() {
    let harness = TestHarness::new(r#"head -c 2048 /dev/zero > "$4""#);

    let (status, body) = harness
        .compile(json!({ "code": "void main() {}", "target": "native" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["target"], "native");
    let output = body["output"].as_str().unwrap();
    assert!(output.starts_with("Native executable compiled successfully!"));
    assert!(output.contains("Output file size: 2048 bytes"));
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_compile_error_reports_stderr() {
    let harness = TestHarness::new(FAILING_COMPILER);

    let (status, body) = harness
        .compile(json!({ "code": "void main( {", "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Error: unexpected token");
    assert!(body.get("output").is_none());
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_zero_exit_without_artifact() {
    let harness = TestHarness::new("echo 'nothing written'");

    let (status, body) = harness
        .compile(json!({ "code": "void main() {}", "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Compilation completed but output file not found");
    assert_eq!(body["stdout"], "nothing written\n");
    assert_eq!(body["stderr"], "");
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_oversized_code_rejected_before_allocation() {
    let marker = tempfile::tempdir().unwrap();
    let invoked = marker.path().join("invoked");
    let harness = TestHarness::new(&format!("touch '{}'", invoked.display()));

    let (status, body) = harness
        .compile(json!({ "code": "a".repeat(100_001), "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Code exceeds maximum size (100KB)" })
    );
    assert!(harness.temp_entries().is_empty());
    assert!(!invoked.exists());
}

#[actix_web::test]
async fn test_code_at_limit_is_accepted() {
    let harness = TestHarness::new(HELLO_COMPILER);

    let (status, body) = harness
        .compile(json!({ "code": "é".repeat(100_000), "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn test_invalid_target_rejected() {
    let harness = TestHarness::new(HELLO_COMPILER);

    for target in [json!("wasm"), json!("JS"), json!(null), json!(1)] {
        let (status, body) = harness
            .compile(json!({ "code": "void main() {}", "target": target }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid target. Must be \"js\" or \"native\"");
    }
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_missing_code_rejected() {
    let harness = TestHarness::new(HELLO_COMPILER);

    for body in [
        json!({ "target": "js" }),
        json!({ "code": "", "target": "js" }),
        json!({ "code": 42, "target": "js" }),
    ] {
        let (status, response) = harness.compile(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Invalid code format");
    }
}

#[actix_web::test]
async fn test_malformed_json_rejected() {
    let harness = TestHarness::new(HELLO_COMPILER);

    let (status, body) = harness
        .send(
            TestRequest::post()
                .uri("/compile")
                .insert_header(("content-type", "application/json"))
                .set_payload("{\"code\": "),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[actix_web::test]
async fn test_dangerous_patterns_are_advisory() {
    let harness = TestHarness::new(HELLO_COMPILER);

    let (status, body) = harness
        .compile(json!({
            "code": "import 'dart:io';\nvoid main() { Process.run('ls', []); }",
            "target": "js"
        }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn test_hanging_compiler_times_out() {
    let harness = TestHarness::with_limits(
        HANGING_COMPILER,
        CompileLimits::default().with_timeout(Duration::from_secs(1)),
    );

    let started = Instant::now();
    let (status, body) = harness
        .compile(json!({ "code": "void main() {}", "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_runaway_output_is_capped() {
    let harness = TestHarness::with_limits(
        "exec yes",
        CompileLimits::default().with_max_output_bytes(64 * 1024),
    );

    let (status, body) = harness
        .compile(json!({ "code": "void main() {}", "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("exceeded"));
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_concurrent_compiles_are_isolated() {
    let harness = TestHarness::new(ECHO_COMPILER);

    let sources: Vec<String> = (0..8)
        .map(|i| format!("void main() {{ print({}); }}", i))
        .collect();
    let responses = futures::future::join_all(
        sources
            .iter()
            .map(|code| harness.compile(json!({ "code": code, "target": "js" }))),
    )
    .await;

    for (code, (status, body)) in sources.iter().zip(responses) {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["output"], code.as_str());
    }
    assert!(harness.temp_entries().is_empty());
}

#[actix_web::test]
async fn test_allocation_failure_is_server_error() {
    let harness = TestHarness::new(HELLO_COMPILER);
    harness.break_temp_root();

    let (status, body) = harness
        .compile(json!({ "code": "void main() {}", "target": "js" }))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Server error: "));
}
