mod common;

use proptest::prelude::*;
use snow_agg::aggregate;
use snow_core::materials::{preset_registry, WATER};
use snow_core::{Category, ChannelCounts};

use common::{approx, two_group_registry};

fn counts(entries: &[(&str, &[f64])]) -> ChannelCounts {
    entries
        .iter()
        .map(|(channel, values)| (channel.to_string(), values.to_vec()))
        .collect()
}

#[test]
fn sums_members_into_categories_and_total() {
    let registry = two_group_registry();
    let input = counts(&[
        ("ibd", &[1.0, 2.0, 3.0]),
        ("nue_e", &[0.5, 0.0, 1.0]),
        ("nuebar_e", &[0.25, 0.25, 0.0]),
    ]);
    let groups = aggregate(&input, &registry).expect("aggregate");
    assert_eq!(groups.by_label("IBD"), Some(&vec![1.0, 2.0, 3.0]));
    assert_eq!(groups.by_label("ES"), Some(&vec![0.75, 0.25, 1.0]));
    assert_eq!(groups.total, vec![1.75, 2.25, 4.0]);
    let order: Vec<&str> = groups.category_names().collect();
    assert_eq!(order, vec!["IBD", "ES"]);
}

#[test]
fn ignores_channels_outside_the_registry() {
    let registry = two_group_registry();
    let input = counts(&[
        ("ibd", &[1.0]),
        ("nue_e", &[1.0]),
        ("nuebar_e", &[1.0]),
        ("nc_nue_O16", &[100.0]),
    ]);
    let groups = aggregate(&input, &registry).expect("aggregate");
    assert_eq!(groups.get(&Category::Total), Some(&vec![3.0]));
}

#[test]
fn missing_channel_is_reported() {
    let registry = two_group_registry();
    let input = counts(&[("ibd", &[1.0]), ("nue_e", &[1.0])]);
    let err = aggregate(&input, &registry).expect_err("nuebar_e missing");
    assert_eq!(err.family(), "missing-data");
    assert_eq!(err.info().code, "aggregate-missing-channel");
    assert_eq!(
        err.info().context.get("channel").map(String::as_str),
        Some("nuebar_e")
    );
}

#[test]
fn mismatched_lengths_are_a_shape_error() {
    let registry = two_group_registry();
    let input = counts(&[
        ("ibd", &[1.0, 1.0]),
        ("nue_e", &[1.0]),
        ("nuebar_e", &[1.0, 2.0]),
    ]);
    let err = aggregate(&input, &registry).expect_err("length mismatch");
    assert_eq!(err.family(), "data-shape");
    assert_eq!(err.info().code, "aggregate-length");
}

#[test]
fn negative_or_nan_counts_are_rejected() {
    let registry = two_group_registry();
    for bad in [-1.0, f64::NAN, f64::INFINITY] {
        let input = counts(&[("ibd", &[1.0]), ("nue_e", &[bad]), ("nuebar_e", &[0.0])]);
        let err = aggregate(&input, &registry).expect_err("invalid count");
        assert_eq!(err.info().code, "aggregate-invalid-count");
    }
}

#[test]
fn empty_category_contributes_zeros() {
    let registry = snow_core::ChannelRegistry::from_static(&[("IBD", &["ibd"]), ("NC", &[])])
        .expect("registry");
    let input = counts(&[("ibd", &[4.0, 5.0])]);
    let groups = aggregate(&input, &registry).expect("aggregate");
    assert_eq!(groups.by_label("NC"), Some(&vec![0.0, 0.0]));
    assert_eq!(groups.total, vec![4.0, 5.0]);
}

fn water_counts() -> impl Strategy<Value = Vec<Vec<f64>>> {
    let channels = preset_registry(WATER).expect("water").channel_count();
    (1usize..8).prop_flat_map(move |n_bins| {
        proptest::collection::vec(proptest::collection::vec(0.0f64..1.0e4, n_bins), channels)
    })
}

proptest! {
    #[test]
    fn total_equals_sum_of_all_channels(vectors in water_counts()) {
        let registry = preset_registry(WATER).expect("water");
        let input: ChannelCounts = registry
            .flatten()
            .iter()
            .cloned()
            .zip(vectors.iter().cloned())
            .collect();
        let groups = aggregate(&input, &registry).expect("aggregate");
        let n_bins = vectors[0].len();
        for bin in 0..n_bins {
            let expected: f64 = vectors.iter().map(|values| values[bin]).sum();
            prop_assert!(approx(groups.total[bin], expected));
        }
        for (category, members) in registry.groups() {
            let summed = groups.by_label(category).expect("category present");
            for bin in 0..n_bins {
                let expected: f64 = members.iter().map(|channel| input[channel][bin]).sum();
                prop_assert!(approx(summed[bin], expected));
            }
        }
    }
}
