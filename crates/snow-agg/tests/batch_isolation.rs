mod common;

use std::collections::BTreeMap;

use snow_agg::{build_model, run_batch, BatchJob, BatchOpts, CancelToken};
use snow_core::ChannelRegistry;

use common::{key, MemoryModels, StepSource};

fn healthy(scale: f64) -> StepSource {
    StepSource::default()
        .with("ibd", 0, &[scale, 1.0])
        .with("ibd", 1, &[0.0, scale])
        .with("ibd", 2, &[1.0, 1.0])
}

fn models() -> MemoryModels {
    let mut models = BTreeMap::new();
    models.insert(key("13"), healthy(1.0));
    models.insert(key("20"), StepSource::default().with("ibd", 0, &[1.0, 1.0]));
    models.insert(key("30"), healthy(3.0));
    MemoryModels {
        time_grid: vec![0.0, 0.005, 0.010],
        energy_bins: vec![10.0, 20.0],
        models,
    }
}

fn jobs(registry: &ChannelRegistry) -> Vec<BatchJob<'_>> {
    ["30", "13", "20", "50"]
        .into_iter()
        .map(|mass| BatchJob {
            key: key(mass),
            registry,
        })
        .collect()
}

#[test]
fn failing_models_do_not_affect_siblings() {
    let registry = common::ibd_registry();
    let source = models();
    let opts = BatchOpts {
        concurrency: 4,
        parallel_steps: false,
    };
    let report = run_batch(&source, &jobs(&registry), &opts, &CancelToken::new()).expect("batch");

    assert!(!report.is_complete());
    assert_eq!(report.tables.len(), 2);
    assert!(report.tables.contains_key(&key("13")));
    assert!(report.tables.contains_key(&key("30")));
    let failed: Vec<_> = report.failures.iter().map(|failure| failure.key.clone()).collect();
    assert_eq!(failed, vec![key("20"), key("50")]);
    assert_eq!(report.failures[0].error.family(), "missing-data");
    assert!(report.skipped.is_empty());
}

#[test]
fn tables_match_single_model_builds() {
    let registry = common::ibd_registry();
    let source = models();
    let expected = build_model(&source, &key("30"), &registry, false).expect("direct build");
    for parallel_steps in [false, true] {
        let opts = BatchOpts {
            concurrency: 2,
            parallel_steps,
        };
        let report = run_batch(&source, &jobs(&registry), &opts, &CancelToken::new())
            .expect("batch");
        assert_eq!(report.tables[&key("30")], expected);
    }
}

#[test]
fn cancelled_batch_skips_every_model() {
    let registry = common::ibd_registry();
    let source = models();
    let cancel = CancelToken::new();
    cancel.cancel();
    let report = run_batch(&source, &jobs(&registry), &BatchOpts::default(), &cancel)
        .expect("batch");
    assert!(report.tables.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(
        report.skipped,
        vec![key("30"), key("13"), key("20"), key("50")]
    );
}

#[test]
fn default_options_run_serially() {
    let opts: BatchOpts = serde_json::from_str("{}").expect("defaults");
    assert_eq!(opts, BatchOpts::default());
    assert_eq!(opts.concurrency, 1);
    assert!(!opts.parallel_steps);
}
