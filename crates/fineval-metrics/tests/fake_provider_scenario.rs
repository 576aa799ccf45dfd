use fineval_core::config::{parse_config, EvalConfig, OverlapKind, ProviderKind};
use fineval_core::providers::{build_providers, ProviderCredentials};
use fineval_core::MetricKind;
use fineval_metrics::build_aggregator;

fn fake_config() -> EvalConfig {
    EvalConfig {
        provider: ProviderKind::Fake,
        ..EvalConfig::default()
    }
}

fn scenario() -> (Vec<String>, Vec<String>, Vec<String>) {
    let q = vec!["Capital of Vietnam?".to_string(); 3];
    let a = vec!["Ho Chi Minh City".to_string(); 3];
    let g = ["Ho Chi Minh City", "Bangkok", "I had lunch at Pho Ha"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    (q, a, g)
}

#[tokio::test]
async fn vietnam_scenario_with_offline_providers() {
    let cfg = fake_config();
    let providers = build_providers(&cfg, &ProviderCredentials::default()).unwrap();
    let agg = build_aggregator(&cfg, &providers);
    let (q, a, g) = scenario();

    let table = agg.evaluate_each(&q, &a, &g).await.unwrap();
    assert_eq!(table.len(), 3);
    let exact = &table.rows[0];
    assert!((exact.f1 - 1.0).abs() < 1e-9);
    assert!((exact.cosine - 1.0).abs() < 1e-6);
    assert_eq!(exact.correctness, 5.0);
    for row in &table.rows[1..] {
        assert!(row.f1 < exact.f1);
        assert!(row.cosine < exact.cosine);
        assert!(row.correctness < exact.correctness);
    }

    let summary = agg.evaluate(&q, &a, &g).await.unwrap();
    for metric in MetricKind::ALL {
        let col = table.column(metric);
        let mean = col.iter().sum::<f64>() / col.len() as f64;
        assert!((summary.score(metric).unwrap() - mean).abs() < 1e-9);
    }
}

#[tokio::test]
async fn embedding_overlap_is_selectable_from_config() {
    let cfg = parse_config("version: 1\nprovider: fake\noverlap: embedding\nparallel: 2\n").unwrap();
    assert_eq!(cfg.overlap, OverlapKind::Embedding);
    let providers = build_providers(&cfg, &ProviderCredentials::default()).unwrap();
    let agg = build_aggregator(&cfg, &providers);
    assert_eq!(agg.settings().parallel, Some(2));

    let (q, a, g) = scenario();
    let table = agg.evaluate_each(&q, &a, &g).await.unwrap();
    assert!((table.rows[0].f1 - 1.0).abs() < 1e-6);
    assert!(table.rows[1].f1 < table.rows[0].f1);
}
