// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Registration and dispatch of backup item actions.
//!
//! The registry plays the host's part for stand-alone use: actions are
//! registered under a unique name, and every item is passed through each
//! action whose selector matches it, in registration order.

use crate::action::{BackupContext, BackupItemAction, ExecuteOutput};
use crate::constants::PLUGIN_NAME;
use crate::errors::RegistryError;
use crate::zone_labeler::ZoneLabeler;
use serde_json::Value;
use tracing::debug;

/// Ordered collection of named backup item actions.
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<(String, Box<dyn BackupItemAction>)>,
}

impl ActionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the actions this crate ships.
    ///
    /// Currently that is the [`ZoneLabeler`], registered as [`PLUGIN_NAME`].
    #[must_use]
    pub fn with_default_actions() -> Self {
        let labeler: Box<dyn BackupItemAction> = Box::new(ZoneLabeler::new());
        Self {
            actions: vec![(PLUGIN_NAME.to_string(), labeler)],
        }
    }

    /// Register `action` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if `name` is already taken.
    pub fn register<A>(&mut self, name: impl Into<String>, action: A) -> Result<(), RegistryError>
    where
        A: BackupItemAction + 'static,
    {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(RegistryError::DuplicateAction { name });
        }

        debug!(action = %name, "Registered backup item action");
        self.actions.push((name, Box::new(action)));
        Ok(())
    }

    /// Look up an action by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn BackupItemAction> {
        self.actions
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, action)| action.as_ref())
    }

    /// Names of all registered actions, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|(name, _)| name.as_str())
    }

    /// Number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no action is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Names of the actions selected for an item of `resource` in `namespace`.
    #[must_use]
    pub fn applicable(&self, resource: &str, namespace: Option<&str>) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|(_, action)| action.applies_to().matches(resource, namespace))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Run `item` through every applicable action in registration order.
    ///
    /// Each action sees the output of the previous one. Additional items are
    /// concatenated. When no action applies the item is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Action`] for the first action that fails; later
    /// actions are not run.
    pub fn execute(
        &self,
        resource: &str,
        namespace: Option<&str>,
        item: Value,
        backup: &BackupContext,
    ) -> Result<ExecuteOutput, RegistryError> {
        let mut output = ExecuteOutput::item_only(item);

        for (name, action) in &self.actions {
            if !action.applies_to().matches(resource, namespace) {
                continue;
            }

            let target = item_name(&output.item);
            debug!(action = %name, resource, item = %target, "Running backup item action");

            let result = action
                .execute(output.item, backup)
                .map_err(|source| RegistryError::Action {
                    name: name.clone(),
                    resource: resource.to_string(),
                    item: target,
                    source,
                })?;

            output.item = result.item;
            output.additional_items.extend(result.additional_items);
        }

        Ok(output)
    }
}

fn item_name(item: &Value) -> String {
    item.pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
