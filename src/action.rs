// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Backup item action contract between a backup host and its hooks.
//!
//! A backup host calls every registered [`BackupItemAction`] whose
//! [`ResourceSelector`] matches an item, immediately before that item is
//! written to backup storage. The action may return a modified item and may ask
//! for additional items to be included in the backup.
//!
//! Items travel as unstructured JSON documents ([`serde_json::Value`]); each
//! action decodes the shape it needs at its own boundary.

use crate::constants::SELECTOR_WILDCARD;
use crate::errors::ConversionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Selects which items an action is called for.
///
/// Empty include lists match everything. The `*` wildcard matches every value
/// in both include and exclude lists. Exclusions always win over inclusions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSelector {
    /// Resource types to include (e.g. "persistentvolumes")
    #[serde(default)]
    pub included_resources: Vec<String>,

    /// Resource types to exclude
    #[serde(default)]
    pub excluded_resources: Vec<String>,

    /// Namespaces to include; ignored for cluster-scoped items
    #[serde(default)]
    pub included_namespaces: Vec<String>,

    /// Namespaces to exclude; ignored for cluster-scoped items
    #[serde(default)]
    pub excluded_namespaces: Vec<String>,
}

impl ResourceSelector {
    /// Selector matching only the given resource types.
    #[must_use]
    pub fn for_resources<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            included_resources: resources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns `true` if an item of `resource` type in `namespace` is selected.
    ///
    /// Resource names compare ASCII case-insensitively. Pass `None` for
    /// cluster-scoped items such as `PersistentVolume`s.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pv_zone_labeler::action::ResourceSelector;
    ///
    /// let selector = ResourceSelector::for_resources(["persistentvolumes"]);
    /// assert!(selector.matches("PersistentVolumes", None));
    /// assert!(!selector.matches("persistentvolumeclaims", Some("default")));
    /// ```
    #[must_use]
    pub fn matches(&self, resource: &str, namespace: Option<&str>) -> bool {
        let resource_selected = filter_matches(
            &self.included_resources,
            &self.excluded_resources,
            resource,
            true,
        );

        let namespace_selected = namespace.is_none_or(|ns| {
            filter_matches(
                &self.included_namespaces,
                &self.excluded_namespaces,
                ns,
                false,
            )
        });

        resource_selected && namespace_selected
    }
}

fn filter_matches(included: &[String], excluded: &[String], value: &str, fold_case: bool) -> bool {
    let matches = |entry: &String| {
        entry == SELECTOR_WILDCARD
            || if fold_case {
                entry.eq_ignore_ascii_case(value)
            } else {
                entry == value
            }
    };

    if excluded.iter().any(&matches) {
        return false;
    }

    included.is_empty() || included.iter().any(&matches)
}

/// Identifies an additional item an action wants included in the backup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceIdentifier {
    /// Group-qualified resource type (e.g. "persistentvolumeclaims")
    pub group_resource: String,

    /// Namespace of the item; `None` for cluster-scoped items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Name of the item
    pub name: String,
}

/// The backup an item is being processed for.
///
/// Actions receive this for diagnostics only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupContext {
    /// Name of the backup
    pub name: String,

    /// Namespace the backup object lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl BackupContext {
    /// Create a context for the backup `name` in `namespace`.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}

/// Result of executing a backup item action on one item.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecuteOutput {
    /// The item to persist, possibly modified
    pub item: Value,

    /// Further items the action wants backed up
    pub additional_items: Vec<ResourceIdentifier>,
}

impl ExecuteOutput {
    /// Output carrying `item` and no additional items.
    #[must_use]
    pub fn item_only(item: Value) -> Self {
        Self {
            item,
            additional_items: Vec::new(),
        }
    }
}

/// A hook invoked by the backup host for each selected item.
///
/// Implementations must be stateless across items: the host may call
/// `execute` concurrently for different items.
pub trait BackupItemAction: Send + Sync {
    /// Which items this action wants to see.
    fn applies_to(&self) -> ResourceSelector;

    /// Process one item before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the item cannot be interpreted as the
    /// resource the action expects, or cannot be re-encoded afterwards.
    fn execute(
        &self,
        item: Value,
        backup: &BackupContext,
    ) -> Result<ExecuteOutput, ConversionError>;
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod action_tests;
