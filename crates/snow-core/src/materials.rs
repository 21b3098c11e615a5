//! Built-in channel groupings for the supported detector materials.

use indexmap::IndexMap;

use crate::errors::{ErrorInfo, SnowError};
use crate::registry::ChannelRegistry;

/// Water Cherenkov material label.
pub const WATER: &str = "water";
/// Liquid argon material label.
pub const ARGON: &str = "argon";

const WATER_GROUPS: &[(&str, &[&str])] = &[
    ("IBD", &["ibd"]),
    ("ES", &["nue_e"]),
    ("nue_O16", &["nue_O16"]),
    ("nuebar_O16", &["nuebar_O16"]),
    (
        "NC",
        &[
            "nc_nue_O16",
            "nc_nuebar_O16",
            "nc_numu_O16",
            "nc_numubar_O16",
            "nc_nutau_O16",
            "nc_nutaubar_O16",
        ],
    ),
];

const ARGON_GROUPS: &[(&str, &[&str])] = &[
    (
        "ES",
        &[
            "nue_e",
            "nuebar_e",
            "numu_e",
            "numubar_e",
            "nutau_e",
            "nutaubar_e",
        ],
    ),
    ("nue_Ar40", &["nue_Ar40"]),
    ("nuebar_Ar40", &["nuebar_Ar40"]),
    (
        "NC",
        &[
            "nc_nue_Ar40",
            "nc_nuebar_Ar40",
            "nc_numu_Ar40",
            "nc_numubar_Ar40",
            "nc_nutau_Ar40",
            "nc_nutaubar_Ar40",
        ],
    ),
];

const DETECTOR_MATERIALS: &[(&str, &str)] = &[
    ("wc100kt30prct", WATER),
    ("icecube", WATER),
    ("ar40kt", ARGON),
];

fn to_groups(groups: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
    groups
        .iter()
        .map(|(category, members)| {
            (
                category.to_string(),
                members.iter().map(|member| member.to_string()).collect(),
            )
        })
        .collect()
}

/// Channel grouping preset for a material, if one is built in.
pub fn preset_groups(material: &str) -> Option<IndexMap<String, Vec<String>>> {
    match material {
        WATER => Some(to_groups(WATER_GROUPS)),
        ARGON => Some(to_groups(ARGON_GROUPS)),
        _ => None,
    }
}

/// Every built-in material grouping keyed by material.
pub fn default_material_groups() -> IndexMap<String, IndexMap<String, Vec<String>>> {
    [WATER, ARGON]
        .into_iter()
        .filter_map(|material| preset_groups(material).map(|groups| (material.to_string(), groups)))
        .collect()
}

/// Built-in detector → material assignments.
pub fn default_detector_materials() -> IndexMap<String, String> {
    DETECTOR_MATERIALS
        .iter()
        .map(|(detector, material)| (detector.to_string(), material.to_string()))
        .collect()
}

/// Validated registry for a built-in material.
pub fn preset_registry(material: &str) -> Result<ChannelRegistry, SnowError> {
    let groups = preset_groups(material).ok_or_else(|| {
        SnowError::Config(
            ErrorInfo::new("material-unknown", "no built-in channel grouping for material")
                .with_context("material", material)
                .with_hint("expected `water` or `argon`"),
        )
    })?;
    ChannelRegistry::build(groups)
}
