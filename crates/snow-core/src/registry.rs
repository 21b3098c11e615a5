//! Validated channel-to-category grouping for one detector material.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SnowError};
use crate::types::TOTAL;

fn config_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

/// Immutable partition of interaction channels into named categories.
///
/// Every channel belongs to exactly one category. The synthetic `total`
/// category is implicit and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Vec<String>>",
    into = "IndexMap<String, Vec<String>>"
)]
pub struct ChannelRegistry {
    groups: IndexMap<String, Vec<String>>,
    channels: Vec<String>,
    owners: HashMap<String, usize>,
}

impl ChannelRegistry {
    /// Validates an ordered category → channels mapping.
    pub fn build(groups: IndexMap<String, Vec<String>>) -> Result<Self, SnowError> {
        if groups.is_empty() {
            return Err(SnowError::Config(
                config_error("registry-empty", "registry requires at least one category")
                    .with_hint("declare at least one channel group for the material"),
            ));
        }
        let mut channels = Vec::new();
        let mut owners: HashMap<String, usize> = HashMap::new();
        for (index, (category, members)) in groups.iter().enumerate() {
            if category.is_empty() {
                return Err(SnowError::Config(config_error(
                    "registry-empty-category-name",
                    "category names must not be empty",
                )));
            }
            if category == TOTAL {
                return Err(SnowError::Config(
                    config_error(
                        "registry-reserved-category",
                        "`total` is reserved for the sum over all channels",
                    )
                    .with_hint("rename the category"),
                ));
            }
            for channel in members {
                if channel.is_empty() {
                    return Err(SnowError::Config(
                        config_error("registry-empty-channel", "channel ids must not be empty")
                            .with_context("category", category),
                    ));
                }
                if let Some(&owner) = owners.get(channel) {
                    let first = groups
                        .get_index(owner)
                        .map(|(name, _)| name.as_str())
                        .unwrap_or(category.as_str());
                    return Err(SnowError::Config(
                        config_error(
                            "registry-duplicate-channel",
                            "channel is assigned more than once",
                        )
                        .with_context("channel", channel)
                        .with_context("first", first)
                        .with_context("second", category),
                    ));
                }
                owners.insert(channel.clone(), index);
                channels.push(channel.clone());
            }
        }
        if channels.is_empty() {
            return Err(SnowError::Config(
                config_error("registry-no-channels", "registry assigns no channels")
                    .with_context("categories", groups.len())
                    .with_hint("list at least one channel in some category"),
            ));
        }
        Ok(Self {
            groups,
            channels,
            owners,
        })
    }

    /// Convenience constructor from borrowed literals.
    pub fn from_static(groups: &[(&str, &[&str])]) -> Result<Self, SnowError> {
        Self::build(
            groups
                .iter()
                .map(|(category, members)| {
                    (
                        category.to_string(),
                        members.iter().map(|member| member.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    /// All channel ids, category-major in insertion order.
    pub fn flatten(&self) -> &[String] {
        &self.channels
    }

    /// Category owning the channel, if registered.
    pub fn category_of(&self, channel: &str) -> Option<&str> {
        self.owners
            .get(channel)
            .and_then(|&index| self.groups.get_index(index))
            .map(|(name, _)| name.as_str())
    }

    /// Named categories in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.keys().map(String::as_str)
    }

    /// Owned copy of the category names, as used for table headers.
    pub fn category_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Member channels of a category.
    pub fn members(&self, category: &str) -> Option<&[String]> {
        self.groups.get(category).map(Vec::as_slice)
    }

    /// Category → members mapping as supplied.
    pub fn groups(&self) -> &IndexMap<String, Vec<String>> {
        &self.groups
    }

    /// Number of named categories.
    pub fn category_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of registered channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl TryFrom<IndexMap<String, Vec<String>>> for ChannelRegistry {
    type Error = SnowError;

    fn try_from(groups: IndexMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::build(groups)
    }
}

impl From<ChannelRegistry> for IndexMap<String, Vec<String>> {
    fn from(registry: ChannelRegistry) -> Self {
        registry.groups
    }
}
