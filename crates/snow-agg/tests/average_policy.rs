mod common;

use proptest::prelude::*;
use snow_agg::{average, summarize};
use snow_core::EnergyBins;

use common::{approx, bins};

#[test]
fn weighted_mean_of_binned_counts() {
    let stats = summarize(&[2.0, 1.0], &bins(&[10.0, 20.0])).expect("summarize");
    assert_eq!(stats.counts, 3.0);
    assert!(approx(stats.mean_energy, 40.0 / 3.0));
}

#[test]
fn zero_counts_give_exactly_zero() {
    let mean = average(&[0.0, 0.0, 0.0], &bins(&[1.0, 2.0, 3.0])).expect("average");
    assert_eq!(mean, 0.0);
    assert!(!mean.is_nan());
}

#[test]
fn single_occupied_bin_returns_that_energy() {
    let mean = average(&[0.0, 7.0, 0.0], &bins(&[5.0, 15.0, 25.0])).expect("average");
    assert_eq!(mean, 15.0);
}

#[test]
fn length_mismatch_is_a_shape_error() {
    let err = average(&[1.0], &bins(&[1.0, 2.0])).expect_err("mismatch");
    assert_eq!(err.family(), "data-shape");
    assert_eq!(err.info().code, "average-length");
}

fn binned() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            (0.0f64..50.0, proptest::collection::vec(0.01f64..5.0, n)),
            proptest::collection::vec(0.0f64..1.0e3, n),
        )
            .prop_map(|((start, steps), counts)| {
                let mut energy = Vec::with_capacity(steps.len());
                let mut current = start;
                for step in steps {
                    current += step;
                    energy.push(current);
                }
                (energy, counts)
            })
    })
}

proptest! {
    #[test]
    fn mean_stays_within_the_energy_axis((energy, counts) in binned()) {
        let axis = EnergyBins::new(energy).expect("ascending");
        let stats = summarize(&counts, &axis).expect("summarize");
        if stats.counts == 0.0 {
            prop_assert_eq!(stats.mean_energy, 0.0);
        } else {
            prop_assert!(stats.mean_energy >= axis.min());
            prop_assert!(stats.mean_energy <= axis.max());
        }
    }
}
