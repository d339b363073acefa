// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Topology label constants read and written by the zone labeler.
//!
//! The keys below are part of the wire contract with Kubernetes and the AWS EBS
//! CSI driver and must match exactly.

// ============================================================================
// Kubernetes Well-Known Labels
// https://kubernetes.io/docs/reference/labels-annotations-taints/
// ============================================================================

/// Canonical availability-zone label, written when a zone is derived
pub const ZONE_LABEL: &str = "topology.kubernetes.io/zone";

/// Deprecated availability-zone label, only consulted when checking for an existing zone
pub const ZONE_LABEL_DEPRECATED: &str = "failure-domain.beta.kubernetes.io/zone";

// ============================================================================
// CSI Topology Keys
// ============================================================================

/// Node-affinity key the AWS EBS CSI driver uses to pin a volume to its zone
pub const ZONE_TOPOLOGY_KEY: &str = "topology.ebs.csi.aws.com/zone";
