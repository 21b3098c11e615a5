use std::error::Error;

use clap::Args;
use snow_agg::integrate;
use snow_io::paths::cumulative_path;
use snow_io::{render_cumulative_csv, write_csv};
use tracing::{info, warn};

use super::{group_models, load_tables, DataArgs};

#[derive(Args, Debug)]
pub struct CumulativeArgs {
    #[command(flatten)]
    pub data: DataArgs,
    /// Largest number of leading time bins, overriding the configuration.
    #[arg(long)]
    pub max_bins: Option<usize>,
}

pub fn run(args: &CumulativeArgs) -> Result<(), Box<dyn Error>> {
    let config = args.data.resolve_config()?;
    let max_bins = args.max_bins.unwrap_or(config.integration.max_bins);
    for ((family, detector, mixing), keys) in group_models(&config.model_keys()) {
        let tables = load_tables(&args.data.data, &keys)?;
        if tables.is_empty() {
            warn!(
                family = %family,
                detector = %detector,
                mixing = %mixing,
                "no time series to integrate"
            );
            continue;
        }
        let cumulative = integrate(&tables, max_bins)?;
        let path = cumulative_path(&args.data.data, &family, &detector, &mixing);
        write_csv(&path, &render_cumulative_csv(&cumulative)?)?;
        info!(
            path = %path.display(),
            models = cumulative.len(),
            max_bins,
            "wrote cumulative table"
        );
        println!("{}", path.display());
    }
    Ok(())
}
