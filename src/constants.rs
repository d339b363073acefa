// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the zone labeler.
//!
//! This module contains the string constants shared by the backup item action,
//! the registry and the command-line driver. Label keys live in [`crate::labels`].

// ============================================================================
// Plugin Constants
// ============================================================================

/// Name the zone labeler is registered and logged under
pub const PLUGIN_NAME: &str = "AwsBackupItemAction";

/// Wildcard accepted in resource and namespace selectors
pub const SELECTOR_WILDCARD: &str = "*";

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// API version of core resources such as `PersistentVolume`
pub const API_VERSION_CORE_V1: &str = "v1";

/// Kind name for `PersistentVolume` resources
pub const KIND_PERSISTENT_VOLUME: &str = "PersistentVolume";

/// Kind name for list wrappers (`kubectl get -o yaml` output)
pub const KIND_LIST: &str = "List";

/// Plural resource name the zone labeler applies to
pub const RESOURCE_PERSISTENT_VOLUMES: &str = "persistentvolumes";

/// Node selector operator testing set membership
pub const NODE_SELECTOR_OP_IN: &str = "In";

// ============================================================================
// Driver Defaults
// ============================================================================

/// Backup name used when none is given on the command line
pub const DEFAULT_BACKUP_NAME: &str = "manual";

/// Namespace backups live in when none is given on the command line
pub const DEFAULT_BACKUP_NAMESPACE: &str = "velero";

/// Path meaning "read from standard input"
pub const STDIN_PATH: &str = "-";
