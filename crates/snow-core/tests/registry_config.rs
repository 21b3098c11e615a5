use indexmap::IndexMap;
use snow_core::materials::{self, ARGON, WATER};
use snow_core::{ChannelRegistry, SnowError};

fn groups(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(name, members)| {
            (
                name.to_string(),
                members.iter().map(|m| m.to_string()).collect(),
            )
        })
        .collect()
}

#[test]
fn flatten_is_category_major_in_insertion_order() {
    let registry = ChannelRegistry::build(groups(&[
        ("NC", &["nc_b", "nc_a"]),
        ("IBD", &["ibd"]),
        ("ES", &["nue_e", "nuebar_e"]),
    ]))
    .expect("registry");
    assert_eq!(
        registry.flatten(),
        ["nc_b", "nc_a", "ibd", "nue_e", "nuebar_e"]
    );
    assert_eq!(registry.category_names(), ["NC", "IBD", "ES"]);
    assert_eq!(registry.channel_count(), 5);
    assert_eq!(registry.category_count(), 3);
}

#[test]
fn category_of_resolves_owner() {
    let registry =
        ChannelRegistry::from_static(&[("IBD", &["ibd"]), ("ES", &["nue_e", "numu_e"])])
            .expect("registry");
    assert_eq!(registry.category_of("numu_e"), Some("ES"));
    assert_eq!(registry.category_of("ibd"), Some("IBD"));
    assert_eq!(registry.category_of("unknown"), None);
    assert_eq!(
        registry.members("ES").expect("members"),
        ["nue_e", "numu_e"]
    );
}

#[test]
fn duplicate_channel_across_categories_is_rejected() {
    let err = ChannelRegistry::from_static(&[("ES", &["nue_e"]), ("IBD", &["ibd", "nue_e"])])
        .expect_err("duplicate must fail");
    match err {
        SnowError::Config(info) => {
            assert_eq!(info.code, "registry-duplicate-channel");
            assert_eq!(info.context.get("first").map(String::as_str), Some("ES"));
            assert_eq!(info.context.get("second").map(String::as_str), Some("IBD"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn duplicate_channel_within_category_is_rejected() {
    let err = ChannelRegistry::from_static(&[("NC", &["nc_nue_O16", "nc_nue_O16"])])
        .expect_err("duplicate must fail");
    assert!(matches!(err, SnowError::Config(_)));
}

#[test]
fn reserved_and_empty_configurations_are_rejected() {
    assert!(matches!(
        ChannelRegistry::from_static(&[("total", &["ibd"])]),
        Err(SnowError::Config(_))
    ));
    assert!(matches!(
        ChannelRegistry::build(IndexMap::new()),
        Err(SnowError::Config(_))
    ));
    assert!(matches!(
        ChannelRegistry::from_static(&[("IBD", &[""])]),
        Err(SnowError::Config(_))
    ));
}

#[test]
fn empty_category_is_allowed() {
    let registry =
        ChannelRegistry::from_static(&[("IBD", &["ibd"]), ("spare", &[])]).expect("registry");
    assert_eq!(registry.members("spare").expect("members").len(), 0);
    assert_eq!(registry.flatten(), ["ibd"]);
}

#[test]
fn registry_without_any_channel_is_rejected() {
    let err = ChannelRegistry::from_static(&[("NC", &[]), ("spare", &[])])
        .expect_err("no channels");
    assert!(matches!(&err, SnowError::Config(info) if info.code == "registry-no-channels"));
    assert!(serde_json::from_str::<ChannelRegistry>(r#"{"NC": []}"#).is_err());
}

#[test]
fn presets_partition_their_channels() {
    for material in [WATER, ARGON] {
        let registry = materials::preset_registry(material).expect("preset");
        let summed: usize = registry
            .categories()
            .map(|name| registry.members(name).expect("members").len())
            .sum();
        assert_eq!(summed, registry.channel_count());
    }
    let water = materials::preset_registry(WATER).expect("water");
    assert_eq!(water.category_names(), ["IBD", "ES", "nue_O16", "nuebar_O16", "NC"]);
    assert!(materials::preset_registry("lead").is_err());
    assert_eq!(
        materials::default_detector_materials().get("ar40kt").map(String::as_str),
        Some(ARGON)
    );
}

#[test]
fn registry_deserializes_with_validation() {
    let ok: ChannelRegistry =
        serde_json::from_str(r#"{"IBD":["ibd"],"ES":["nue_e"]}"#).expect("valid registry");
    assert_eq!(ok.flatten(), ["ibd", "nue_e"]);
    let err = serde_json::from_str::<ChannelRegistry>(r#"{"IBD":["ibd"],"ES":["ibd"]}"#);
    assert!(err.is_err());
}
