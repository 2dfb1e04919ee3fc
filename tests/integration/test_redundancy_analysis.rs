//! Test: end-to-end redundancy analysis over an embedded tree
//!
//! Files are embedded with a keyword embedder so the expected groups follow
//! from their contents.

use super::common::KeywordEmbedder;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use redundex::analysis::{NameGroupReport, VERB_PREFIXES, qualified_symbols};
use redundex::display::{Theme, render_analysis};
use redundex::{
    ArtifactRecord, EmbeddingStore, IndexBuilder, Settings, Thresholds, classify,
    find_all_pairs_duplicates, find_matches, group_by_base_name, rank,
};
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn embedded_tree() -> (TempDir, EmbeddingStore) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a_price.ts"), "price price price").unwrap();
    fs::write(root.join("b_price.ts"), "price price price").unwrap();
    fs::write(root.join("c_wallet.ts"), "wallet wallet").unwrap();
    fs::write(root.join("d_quote.ts"), "quote").unwrap();

    let embedder = KeywordEmbedder::new(&["price", "wallet", "quote"]);
    let settings = Settings::default();
    let (store, _) = IndexBuilder::new(&embedder, &settings)
        .build(root, &ProgressBar::hidden())
        .unwrap();
    (temp_dir, store)
}

#[test]
fn test_classify_finds_identical_files() {
    let (_dir, store) = embedded_tree();
    let report = classify(&store, Thresholds::default());

    assert_eq!(report.critical.len(), 1);
    assert!(report.critical[0].anchor.ends_with("a_price.ts:a_price"));
    assert_eq!(report.critical[0].members.len(), 1);
    assert!(report.critical[0].members[0].id.ends_with("b_price.ts:b_price"));
    assert!(report.potential.is_empty());

    let names = NameGroupReport::new(vec![], 3, 5);
    let text = render_analysis(&report, &names, &Theme::plain());
    assert!(text.contains("100.0% match"));
}

#[test]
fn test_search_ranks_by_keyword() {
    let (_dir, store) = embedded_tree();
    let embedder = KeywordEmbedder::new(&["price", "wallet", "quote"]);

    let ranked = rank(&store, &embedder.vector("connect wallet"), 2);
    assert_eq!(ranked.len(), 2);
    assert!(ranked[0].record.location.ends_with("c_wallet.ts"));
    assert!((ranked[0].score - 1.0).abs() < 1e-6);
    assert!(ranked[0].preview().contains("wallet"));
}

#[test]
fn test_once_claimed_vs_all_pairs() {
    // a~b, a~c and b~c all qualify; only one group of two members results,
    // while the exhaustive listing reports all three pairs
    let store: EmbeddingStore = [
        ("a.ts", "a", vec![1.0, 0.1]),
        ("b.ts", "b", vec![1.0, 0.0]),
        ("c.ts", "c", vec![1.0, 0.2]),
    ]
    .into_iter()
    .map(|(f, n, v)| ArtifactRecord::new(f, n, "ts", v))
    .collect();

    let matches = find_matches(&store, 0.9);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches.groups()[0].members.len(), 2);

    assert_eq!(find_all_pairs_duplicates(&store, 0.9).len(), 3);
}

#[test]
fn test_all_pairs_threshold_monotonicity() {
    let mut rng = StdRng::seed_from_u64(7);
    let store: EmbeddingStore = (0..40)
        .map(|i| {
            let v: Vec<f32> = (0..8).map(|_| rng.random::<f32>() - 0.3).collect();
            ArtifactRecord::new(format!("f{i}.ts"), format!("fn{i}"), "ts", v)
        })
        .collect();

    let pairs_at = |t: f32| -> HashSet<(String, String)> {
        find_all_pairs_duplicates(&store, t)
            .into_iter()
            .map(|p| (p.first, p.second))
            .collect()
    };

    let thresholds = [0.2, 0.5, 0.7, 0.85, 0.95];
    for window in thresholds.windows(2) {
        let looser = pairs_at(window[0]);
        let stricter = pairs_at(window[1]);
        assert!(stricter.is_subset(&looser), "{} ⊄ {}", window[1], window[0]);
    }
}

#[test]
fn test_exclusivity_holds_on_random_store() {
    let mut rng = StdRng::seed_from_u64(11);
    let store: EmbeddingStore = (0..60)
        .map(|i| {
            let v: Vec<f32> = (0..4).map(|_| rng.random::<f32>()).collect();
            ArtifactRecord::new(format!("f{}.ts", i % 7), format!("fn{i}"), "ts", v)
        })
        .collect();

    let report = classify(&store, Thresholds::default());
    for groups in [&report.critical, &report.potential] {
        let anchors: HashSet<_> = groups.iter().map(|g| g.anchor.as_str()).collect();
        let mut members = HashSet::new();
        for group in groups.iter() {
            for member in &group.members {
                assert!(!anchors.contains(member.id.as_str()));
                assert!(members.insert(member.id.as_str()));
            }
        }
    }

    let critical: HashSet<_> = report.critical.iter().map(|g| &g.anchor).collect();
    assert!(report.potential.iter().all(|g| !critical.contains(&g.anchor)));
}

#[test]
fn test_name_patterns_from_store() {
    let store: EmbeddingStore = [
        ("ui/utils/price.ts", "getPrice"),
        ("ui/stores/price.ts", "setPrice"),
        ("ui/hooks/price.ts", "usePrice:2"),
        ("ui/format.ts", "formatPrice"),
        ("ui/wallet.ts", "getWallet"),
    ]
    .into_iter()
    .map(|(f, n)| ArtifactRecord::new(f, n, "ts", vec![1.0]))
    .collect();

    let symbols = qualified_symbols(&store);
    let groups = group_by_base_name(symbols.iter().map(String::as_str), VERB_PREFIXES);
    let report = NameGroupReport::new(groups, 3, 5);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].base, "price");
    assert_eq!(report.groups[0].members.len(), 4);
    assert!(report.groups[0].members.contains(&"ui/hooks/price.ts:usePrice".to_string()));
}
