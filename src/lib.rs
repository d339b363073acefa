// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # pv-zone-labeler - availability-zone labels for PersistentVolume backups
//!
//! A backup item action that makes sure every backed-up `PersistentVolume`
//! carries the `topology.kubernetes.io/zone` label, deriving the zone from the
//! volume's required node affinity when the label is missing.
//!
//! ## Modules
//!
//! - [`action`] - Backup item action contract (selector, context, output)
//! - [`zone_labeler`] - The zone-labeling action itself
//! - [`convert`] - Unstructured document ⇄ typed `PersistentVolume` conversion
//! - [`registry`] - Registration and dispatch of named actions
//! - [`manifest`] - Manifest I/O for the command-line driver
//! - [`errors`] - Error types
//! - [`constants`] / [`labels`] - Shared string constants and label keys
//!
//! ## Example
//!
//! ```rust
//! use pv_zone_labeler::action::BackupContext;
//! use pv_zone_labeler::registry::ActionRegistry;
//! use serde_json::json;
//!
//! let registry = ActionRegistry::with_default_actions();
//! let pv = json!({
//!     "apiVersion": "v1",
//!     "kind": "PersistentVolume",
//!     "metadata": {
//!         "name": "pv-1",
//!         "labels": { "topology.kubernetes.io/zone": "eu-west-1a" }
//!     }
//! });
//!
//! let output = registry
//!     .execute("persistentvolumes", None, pv.clone(), &BackupContext::default())
//!     .unwrap();
//! assert_eq!(output.item, pv);
//! assert!(output.additional_items.is_empty());
//! ```

pub mod action;
pub mod constants;
pub mod convert;
pub mod errors;
pub mod labels;
pub mod manifest;
pub mod registry;
pub mod zone_labeler;
