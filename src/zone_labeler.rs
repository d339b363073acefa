// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Availability-zone labeling for `PersistentVolume` backups.
//!
//! Volumes provisioned by the AWS EBS CSI driver are pinned to a zone through a
//! required node-affinity term, but do not always carry the well-known zone
//! label. Restores rely on that label to place volumes, so this action adds it
//! right before a volume is written to backup storage.
//!
//! # Processing
//!
//! 1. Decode the item into a typed `PersistentVolume`.
//! 2. If [`ZONE_LABEL`] (or, when that is absent or empty, [`ZONE_LABEL_DEPRECATED`])
//!    holds a non-empty value, return the item unchanged. An existing label is
//!    trusted even if node affinity disagrees.
//! 3. Otherwise take the first value of the first `In` expression on
//!    [`ZONE_TOPOLOGY_KEY`] in the required node-affinity terms.
//! 4. If a zone was found, set [`ZONE_LABEL`] and re-encode the volume; if not,
//!    return the item unchanged.
//!
//! The action never asks for additional items and keeps no state between calls.
//!
//! # Example
//!
//! ```rust
//! use pv_zone_labeler::action::{BackupContext, BackupItemAction};
//! use pv_zone_labeler::zone_labeler::ZoneLabeler;
//! use serde_json::json;
//!
//! let pv = json!({
//!     "apiVersion": "v1",
//!     "kind": "PersistentVolume",
//!     "metadata": { "name": "pv-1" },
//!     "spec": {
//!         "nodeAffinity": {
//!             "required": {
//!                 "nodeSelectorTerms": [{
//!                     "matchExpressions": [{
//!                         "key": "topology.ebs.csi.aws.com/zone",
//!                         "operator": "In",
//!                         "values": ["us-west-2b"]
//!                     }]
//!                 }]
//!             }
//!         }
//!     }
//! });
//!
//! let output = ZoneLabeler::new()
//!     .execute(pv, &BackupContext::new("nightly", "velero"))
//!     .unwrap();
//! assert_eq!(
//!     output.item["metadata"]["labels"]["topology.kubernetes.io/zone"],
//!     "us-west-2b"
//! );
//! ```

use crate::action::{BackupContext, BackupItemAction, ExecuteOutput, ResourceSelector};
use crate::constants::{NODE_SELECTOR_OP_IN, PLUGIN_NAME, RESOURCE_PERSISTENT_VOLUMES};
use crate::convert::{decode_persistent_volume, encode_persistent_volume};
use crate::errors::ConversionError;
use crate::labels::{ZONE_LABEL, ZONE_LABEL_DEPRECATED, ZONE_TOPOLOGY_KEY};
use k8s_openapi::api::core::v1::PersistentVolumeSpec;
use kube::ResourceExt;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, info_span, Span};

/// Backup item action that adds the availability-zone label to volumes.
///
/// The only field is the span used for structured logging; it is never
/// consulted for control flow.
#[derive(Clone, Debug)]
pub struct ZoneLabeler {
    span: Span,
}

impl ZoneLabeler {
    /// Create a labeler logging under a span tagged with the plugin name.
    #[must_use]
    pub fn new() -> Self {
        Self::with_span(info_span!("backup_item_action", plugin = PLUGIN_NAME))
    }

    /// Create a labeler logging under `span`.
    ///
    /// Pass [`Span::none()`] to silence it.
    #[must_use]
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }
}

impl Default for ZoneLabeler {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupItemAction for ZoneLabeler {
    fn applies_to(&self) -> ResourceSelector {
        ResourceSelector::for_resources([RESOURCE_PERSISTENT_VOLUMES])
    }

    fn execute(
        &self,
        item: Value,
        backup: &BackupContext,
    ) -> Result<ExecuteOutput, ConversionError> {
        let _entered = self.span.enter();
        info!(backup = %backup.name, "Executing AWS backup item action");

        let mut pv = decode_persistent_volume(&item)?;
        let name = pv.name_any();

        if let Some(zone) = zone_from_labels(pv.labels()) {
            info!(persistent_volume = %name, zone, "Found zone info from label");
            return Ok(ExecuteOutput::item_only(item));
        }

        let Some(zone) = pv
            .spec
            .as_ref()
            .and_then(zone_from_node_affinity)
            .map(str::to_owned)
        else {
            info!(persistent_volume = %name, "Zone not found from node affinity requirements");
            return Ok(ExecuteOutput::item_only(item));
        };

        pv.labels_mut().insert(ZONE_LABEL.to_string(), zone.clone());
        info!(
            persistent_volume = %name,
            key = ZONE_LABEL,
            value = %zone,
            "Added the availability zone from node affinity requirements"
        );

        let updated = encode_persistent_volume(&pv)?;
        debug!(persistent_volume = %name, "Re-encoded labeled persistent volume");

        Ok(ExecuteOutput::item_only(updated))
    }
}

/// Zone already recorded in a volume's labels, if any.
///
/// [`ZONE_LABEL`] is read first. [`ZONE_LABEL_DEPRECATED`] is read only when the
/// canonical label is absent or empty. Empty values count as no zone.
#[must_use]
pub fn zone_from_labels(labels: &BTreeMap<String, String>) -> Option<&str> {
    labels
        .get(ZONE_LABEL)
        .filter(|zone| !zone.is_empty())
        .or_else(|| labels.get(ZONE_LABEL_DEPRECATED))
        .map(String::as_str)
        .filter(|zone| !zone.is_empty())
}

/// Zone a volume is pinned to by its required node-affinity terms, if any.
///
/// Terms and their match expressions are scanned in document order. The first
/// expression with key [`ZONE_TOPOLOGY_KEY`], operator `In` and at least one
/// value ends the scan, and its first value is the result. An empty first value
/// yields `None`.
#[must_use]
pub fn zone_from_node_affinity(spec: &PersistentVolumeSpec) -> Option<&str> {
    let required = spec.node_affinity.as_ref()?.required.as_ref()?;

    required
        .node_selector_terms
        .iter()
        .filter_map(|term| term.match_expressions.as_deref())
        .flatten()
        .find_map(|expression| {
            if expression.key != ZONE_TOPOLOGY_KEY || expression.operator != NODE_SELECTOR_OP_IN {
                return None;
            }
            expression.values.as_deref()?.first()
        })
        .map(String::as_str)
        .filter(|zone| !zone.is_empty())
}

#[cfg(test)]
#[path = "zone_labeler_tests.rs"]
mod zone_labeler_tests;
