use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use snow_agg::{run_batch, BatchJob, CancelToken};
use snow_core::ChannelRegistry;
use snow_io::paths::{report_path, timebin_path};
use snow_io::{
    sha256_hex, write_report, write_timebin_table, AnalyzeReport, SnowglobesSource, WrittenTable,
};
use tracing::info;

use super::DataArgs;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub data: DataArgs,
    /// SNOwGLoBES output root with one subdirectory per mixing scheme.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Models built concurrently, overriding the configuration.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Also load the time steps of each model concurrently.
    #[arg(long)]
    pub parallel_steps: bool,
}

pub fn run(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let mut config = args.data.resolve_config()?;
    if let Some(concurrency) = args.concurrency {
        config.batch.concurrency = concurrency;
    }
    config.batch.parallel_steps |= args.parallel_steps;
    config.validate()?;

    let mut registries: BTreeMap<String, ChannelRegistry> = BTreeMap::new();
    for detector in &config.models.detectors {
        registries.insert(detector.clone(), config.registry_for(detector)?);
    }
    let keys = config.model_keys();
    let jobs = keys
        .iter()
        .map(|key| {
            let registry = registries
                .get(&key.detector)
                .ok_or_else(|| format!("no registry resolved for detector {}", key.detector))?;
            Ok(BatchJob {
                key: key.clone(),
                registry,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let source = SnowglobesSource::new(&args.input);
    let batch = run_batch(&source, &jobs, &config.batch, &CancelToken::new())?;

    let mut written = Vec::with_capacity(batch.tables.len());
    for (key, table) in &batch.tables {
        let path = timebin_path(&args.data.data, key);
        let text = write_timebin_table(&path, table)?;
        written.push(WrittenTable {
            model: key.clone(),
            path: path.display().to_string(),
            rows: table.len(),
            sha256: sha256_hex(text.as_bytes()),
        });
    }

    let report = AnalyzeReport::new(&config, written, &batch)?;
    std::fs::create_dir_all(&args.data.data)?;
    let report_file = report_path(&args.data.data);
    write_report(&report_file, &report)?;
    info!(path = %report_file.display(), "wrote analyze report");

    println!(
        "analyzed {} models: {} tables written, {} failed",
        jobs.len(),
        report.tables.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {}: {}", failure.key, failure.error);
    }
    Ok(())
}
