//! Test: JSON responses for command results and errors

use redundex::io::{ExitCode, JsonResponse, ResponseMeta};
use redundex::{ArtifactRecord, EmbeddingStore, IndexError, find_all_pairs_duplicates};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_duplicates_response_shape() {
    let store: EmbeddingStore = [("a.ts", "a"), ("b.ts", "b")]
        .into_iter()
        .map(|(f, n)| ArtifactRecord::new(f, n, "ts", vec![1.0, 0.0]))
        .collect();
    let pairs = find_all_pairs_duplicates(&store, 0.85);

    let response = JsonResponse::success(&pairs)
        .with_meta(ResponseMeta::new(Some(store.len()), Duration::from_millis(3)));
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["status"], "success");
    assert_eq!(json["data"][0]["first"], "a.ts:a");
    assert_eq!(json["data"][0]["second"], "b.ts:b");
    assert_eq!(json["meta"]["records"], 2);
}

#[test]
fn test_missing_index_response() {
    let error = IndexError::IndexNotFound {
        path: PathBuf::from(".redundex/index.json"),
    };
    let response = JsonResponse::from_error(&error);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["code"], "INDEX_NOT_FOUND");
    assert_eq!(json["exit_code"], ExitCode::NotFound as u8);
    assert!(json["message"].as_str().unwrap().contains(".redundex/index.json"));
}
