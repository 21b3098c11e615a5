use std::collections::BTreeMap;
use std::error::Error;

use clap::Args;
use snow_agg::fractions;
use snow_core::ModelKey;
use snow_io::paths::fractions_path;
use snow_io::{render_fractions_csv, write_csv};
use tracing::{info, warn};

use super::{load_tables, DataArgs};

#[derive(Args, Debug)]
pub struct FractionsArgs {
    #[command(flatten)]
    pub data: DataArgs,
    /// Categories to report; defaults to every category of the detector.
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,
}

pub fn run(args: &FractionsArgs) -> Result<(), Box<dyn Error>> {
    let config = args.data.resolve_config()?;
    let mut comparisons: BTreeMap<(String, String, String), Vec<ModelKey>> = BTreeMap::new();
    for key in config.model_keys() {
        comparisons
            .entry((key.detector.clone(), key.mixing.clone(), key.mass.clone()))
            .or_default()
            .push(key);
    }
    for ((detector, mixing, mass), keys) in comparisons {
        let categories = if args.categories.is_empty() {
            config.registry_for(&detector)?.category_names()
        } else {
            args.categories.clone()
        };
        let by_family: BTreeMap<String, _> = load_tables(&args.data.data, &keys)?
            .into_iter()
            .map(|(key, table)| (key.family, table))
            .collect();
        if by_family.is_empty() {
            warn!(
                detector = %detector,
                mixing = %mixing,
                mass = %mass,
                "no time series to compare"
            );
            continue;
        }
        let shares = fractions(&by_family, &categories)?;
        let path = fractions_path(&args.data.data, &detector, &mixing, &mass);
        write_csv(&path, &render_fractions_csv(&shares)?)?;
        info!(path = %path.display(), families = shares.len(), "wrote fraction table");
        println!("{}", path.display());
    }
    Ok(())
}
