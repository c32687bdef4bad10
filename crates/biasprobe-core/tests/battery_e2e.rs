use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use biasprobe_core::fakes::{ScriptedResponder, StaticProbe};
use biasprobe_core::{
    parse_catalog, ExecutionOptions, ExportOutput, HarnessError, Metadata, OrderEffectPrevention,
    ProbeRegistry, ProbeType, ProbeVariant, RandomizationConfig, RandomizationStrategy, Responder,
    TestBattery,
};

const TYPES: [ProbeType; 3] = [ProbeType::Anchoring, ProbeType::Framing, ProbeType::SunkCost];

fn catalogs() -> HashMap<ProbeType, Vec<ProbeVariant>> {
    TYPES
        .iter()
        .map(|pt| {
            let variants = (1..=2)
                .map(|i| {
                    ProbeVariant::new(
                        format!("{pt}_{i}"),
                        if i == 1 { "health" } else { "finance" },
                        format!("{pt} prompt {i}"),
                    )
                })
                .collect();
            (*pt, variants)
        })
        .collect()
}

fn registry() -> ProbeRegistry {
    catalogs()
        .into_iter()
        .fold(ProbeRegistry::new(), |registry, (pt, variants)| {
            registry.with_provider(Arc::new(StaticProbe::new(pt, variants)))
        })
}

#[tokio::test]
async fn build_execute_summarize_export() {
    let mut battery = TestBattery::new(registry(), RandomizationConfig::default().with_seed(42));
    let session = battery.create_session(Metadata::new());

    let items = battery.create_randomized_battery(None, 1, None).unwrap();
    assert_eq!(items.len(), 3);
    let types: HashSet<ProbeType> = items.iter().map(|i| i.probe_type).collect();
    assert_eq!(types, TYPES.into_iter().collect());

    let catalogs = catalogs();
    for item in &items {
        assert!(catalogs[&item.probe_type]
            .iter()
            .any(|v| v.id == item.variant_id));
    }

    let responder: Arc<dyn Responder> = Arc::new(ScriptedResponder::new("fake", "m"));
    let results = battery
        .execute_battery(&items, responder, &ExecutionOptions::default())
        .await
        .unwrap();
    assert_eq!(results.len(), items.len());

    let summary = battery.get_battery_summary().unwrap();
    assert_eq!(summary.total_probes, 3);
    assert_eq!(summary.successful_probes, 3);
    assert_eq!(summary.success_rate, 1.0);
    assert_eq!(summary.session_id.as_ref(), Some(&session));
    assert_eq!(summary.probe_type_counts.len(), 3);

    let session_summary = battery.get_session_summary().unwrap();
    assert_eq!(session_summary.total_variants_used, 3);

    let csv = match battery.export_results("csv").unwrap() {
        ExportOutput::Csv(text) => text,
        other => panic!("expected csv, got {other:?}"),
    };
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("request_id,probe_type,variant_id"));
    assert!(lines[1].contains(&items[0].variant_id));

    let json = match battery.export_results("json").unwrap() {
        ExportOutput::Json(value) => value,
        other => panic!("expected json, got {other:?}"),
    };
    assert_eq!(json["execution_results"].as_array().unwrap().len(), 3);
    assert_eq!(json["battery_summary"]["total_probes"], 3);
    assert_eq!(json["session_summary"]["session_id"], session.as_str());

    let err = battery.export_results("xml").unwrap_err();
    assert!(matches!(err, HarnessError::UnsupportedFormat(_)));
}

#[test]
fn battery_respects_domain_filter_and_requested_types() {
    let mut battery = TestBattery::new(registry(), RandomizationConfig::default().with_seed(1));
    battery.create_session(Metadata::new());

    let items = battery
        .create_randomized_battery(Some(&[ProbeType::Framing, ProbeType::SunkCost]), 3, Some("finance"))
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.variant_id.ends_with("_2")));
    assert!(items.iter().all(|i| i.probe_type != ProbeType::Anchoring));
}

#[test]
fn battery_uses_configured_strategies() {
    let mut battery = TestBattery::new(registry(), RandomizationConfig::default());
    battery.configure_randomization(
        RandomizationConfig::default()
            .with_strategy(RandomizationStrategy::Counterbalanced)
            .with_order_prevention(OrderEffectPrevention::None)
            .with_seed(8),
    );
    assert_eq!(
        battery.randomization_config().strategy,
        RandomizationStrategy::Counterbalanced
    );
    battery.create_session(Metadata::new());

    let items = battery.create_randomized_battery(None, 2, None).unwrap();
    let order: Vec<ProbeType> = items.iter().map(|i| i.probe_type).collect();
    assert_eq!(
        order,
        vec![
            ProbeType::Anchoring,
            ProbeType::Anchoring,
            ProbeType::Framing,
            ProbeType::Framing,
            ProbeType::SunkCost,
            ProbeType::SunkCost,
        ]
    );
}

#[test]
fn new_session_drops_previous_results_marker() {
    let mut battery = TestBattery::new(registry(), RandomizationConfig::default());
    assert!(battery.get_session_summary().is_none());
    let first = battery.create_session(Metadata::new());
    let second = battery.create_session(Metadata::new());
    assert_ne!(first, second);
    assert_eq!(battery.session_id(), Some(&second));
}

#[tokio::test]
async fn catalog_backed_battery_scores_indicators() {
    let registry = parse_catalog(
        r#"{
            "overconfidence": [
                {"id": "oc_1", "domain": "trivia", "prompt": "How sure are you?",
                 "scoring_params": {"bias_indicators": ["100%", "certain"],
                                    "neutral_indicators": ["not sure"]}}
            ]
        }"#,
    )
    .unwrap();
    let mut battery = TestBattery::new(registry, RandomizationConfig::default().with_seed(2));
    battery.create_session(Metadata::new());
    let items = battery.create_randomized_battery(None, 1, None).unwrap();

    let responder: Arc<dyn Responder> = Arc::new(
        ScriptedResponder::new("fake", "m")
            .with_response("How sure are you?", "I am certain, 100% sure."),
    );
    let results = battery
        .execute_battery(&items, responder, &ExecutionOptions::default())
        .await
        .unwrap();
    assert_eq!(results[0].bias_score, 1.0);
    assert!((results[0].confidence - 2.0 / 3.0).abs() < 1e-9);
}
