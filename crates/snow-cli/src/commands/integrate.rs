use std::error::Error;

use clap::Args;
use snow_agg::integrate_window_all;
use snow_io::paths::window_path;
use snow_io::write_window_table;
use tracing::{info, warn};

use super::{group_models, load_tables, DataArgs};

#[derive(Args, Debug)]
pub struct IntegrateArgs {
    #[command(flatten)]
    pub data: DataArgs,
    /// Window length in time bins, overriding the configuration.
    #[arg(long)]
    pub bins: Option<usize>,
}

pub fn run(args: &IntegrateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = args.data.resolve_config()?;
    if let Some(bins) = args.bins {
        config.integration.window_bins = bins;
        config.validate()?;
    }
    let window_ms = config.integration.window_ms();
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
        let window = integrate_window_all(&tables, config.integration.window_bins)?;
        let path = window_path(&args.data.data, &family, &detector, &mixing, window_ms);
        write_window_table(&path, &window)?;
        info!(path = %path.display(), models = window.len(), window_ms, "wrote window table");
        println!("{}", path.display());
    }
    Ok(())
}
