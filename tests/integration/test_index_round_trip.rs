//! Test: building, saving and reloading an embedding index
//!
//! Verifies that a build over a directory survives a save/load cycle with
//! record order intact, and that both accepted on-disk shapes load.

use super::common::KeywordEmbedder;
use indicatif::ProgressBar;
use redundex::io::ExitCode;
use redundex::{EmbeddingStore, IndexBuilder, IndexError, IndexPersistence, Settings};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_build_save_load_preserves_records() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("ui");
    fs::create_dir_all(src.join("stores")).unwrap();
    fs::create_dir_all(src.join("node_modules/dep")).unwrap();
    fs::write(src.join("stores/price.ts"), "export function getPrice() { return price }").unwrap();
    fs::write(src.join("stores/wallet.ts"), "export function connectWallet() {}").unwrap();
    fs::write(src.join("App.vue"), "<template><Wallet/></template>").unwrap();
    fs::write(src.join("node_modules/dep/index.js"), "price wallet").unwrap();

    let embedder = KeywordEmbedder::new(&["price", "wallet"]);
    let settings = Settings::default();
    let builder = IndexBuilder::new(&embedder, &settings);
    let (store, summary) = builder.build(&src, &ProgressBar::hidden()).unwrap();

    assert_eq!(summary.files_found, 3);
    assert_eq!(store.len(), 3);

    let index_path = temp_dir.path().join(".redundex").join("index.json");
    let persistence = IndexPersistence::new(&index_path);
    persistence.save(&store).unwrap();

    let loaded = persistence.load().unwrap();
    assert_eq!(loaded, store);
    assert_eq!(loaded.model(), Some("keyword-test"));
    assert_eq!(loaded.dimension(), Some(3));

    let ids: Vec<_> = loaded.iter().map(|r| r.id()).collect();
    let original: Vec<_> = store.iter().map(|r| r.id()).collect();
    assert_eq!(ids, original);
}

#[test]
fn test_nested_chunk_index_loads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("UI_NEURAL_INDEX.json");
    let long_content = "x".repeat(500);
    let document = serde_json::json!({
        "chunks": [
            {
                "chunk": {
                    "file": "ui/stores/price.ts",
                    "type": "ts",
                    "name": "price",
                    "content": long_content,
                    "full_path": "/abs/ui/stores/price.ts"
                },
                "embedding": [1.0, 0.0]
            },
            {
                "chunk": { "file": "ui/App.vue", "type": "vue", "name": "App" },
                "embedding": [0.0, 1.0]
            }
        ],
        "total": 2
    });
    fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

    let store = EmbeddingStore::load(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.all()[0].id(), "ui/stores/price.ts:price");
    assert_eq!(store.all()[0].preview.chars().count(), 200);
    assert_eq!(store.all()[1].preview, "");
    assert_eq!(store.all()[1].category, "vue");
}

#[test]
fn test_load_errors_map_to_exit_codes() {
    let temp_dir = TempDir::new().unwrap();

    let missing = EmbeddingStore::load(temp_dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(missing, IndexError::IndexNotFound { .. }));
    assert_eq!(ExitCode::from_error(&missing), ExitCode::NotFound);

    let path = temp_dir.path().join("broken.json");
    fs::write(&path, r#"{"embeddings": [{"file": "a.ts"}]}"#).unwrap();
    let corrupt = EmbeddingStore::load(&path).unwrap_err();
    assert!(matches!(corrupt, IndexError::IndexCorrupt { .. }));
    assert_eq!(ExitCode::from_error(&corrupt), ExitCode::IndexCorrupted);
}
