// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the zone labeler.
//!
//! This module provides specialized error types for:
//! - Converting between the unstructured document form and a typed `PersistentVolume`
//! - Registering and dispatching backup item actions
//! - Reading and writing manifest files in the command-line driver
//!
//! Only [`ConversionError`] can come out of the zone labeler itself. Absence of
//! zone information is never an error.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Direction of a failed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionDirection {
    /// Unstructured document to typed resource
    Decode,
    /// Typed resource back to unstructured document
    Encode,
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => f.write_str("decode"),
            Self::Encode => f.write_str("encode"),
        }
    }
}

/// Errors raised while converting a document to or from a `PersistentVolume`.
///
/// A document that produced one of these errors must be treated as unprocessed.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The document has no usable `apiVersion`/`kind` pair
    ///
    /// Returned when the input is not a mapping, or when either type field is
    /// missing or not a string.
    #[error("unable to convert unstructured to pv: missing type information: {source}")]
    MissingTypeMeta {
        /// Underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The document describes a resource other than a `PersistentVolume`
    #[error("unable to convert unstructured to pv: expected v1/PersistentVolume, found {api_version}/{kind}")]
    UnexpectedKind {
        /// The `apiVersion` found in the document
        api_version: String,
        /// The `kind` found in the document
        kind: String,
    },

    /// The document has the right kind but a field has an incompatible shape
    ///
    /// For example labels that are not a string map, or a node affinity whose
    /// terms are not a list.
    #[error("unable to convert unstructured to pv: {source}")]
    Decode {
        /// Underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The (possibly labeled) volume could not be turned back into a document
    #[error("error converting pv '{name}' to unstructured: {source}")]
    Encode {
        /// Name of the `PersistentVolume` being encoded
        name: String,
        /// Underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

impl ConversionError {
    /// Which conversion direction failed.
    #[must_use]
    pub fn direction(&self) -> ConversionDirection {
        match self {
            Self::MissingTypeMeta { .. } | Self::UnexpectedKind { .. } | Self::Decode { .. } => {
                ConversionDirection::Decode
            }
            Self::Encode { .. } => ConversionDirection::Encode,
        }
    }
}

/// Errors raised by the [`crate::registry::ActionRegistry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An action with the same name is already registered
    #[error("backup item action '{name}' is already registered")]
    DuplicateAction {
        /// The conflicting action name
        name: String,
    },

    /// A registered action failed while processing an item
    #[error("backup item action '{name}' failed on {resource} '{item}': {source}")]
    Action {
        /// Name of the failing action
        name: String,
        /// Resource type of the item (e.g. "persistentvolumes")
        resource: String,
        /// Name of the item, or `<unnamed>` if it has none
        item: String,
        /// The conversion error reported by the action
        #[source]
        source: ConversionError,
    },
}

/// Errors raised while reading or writing manifest documents.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file or standard input could not be read
    #[error("failed to read manifest from {}: {source}", .path.display())]
    Io {
        /// The path that was being read (`-` for standard input)
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The input did not parse as YAML (JSON is read as YAML too)
    #[error("failed to parse YAML manifest: {source}")]
    ParseYaml {
        /// Underlying parse error
        #[source]
        source: serde_yaml::Error,
    },

    /// A `List` document has an `items` field that is not a sequence
    #[error("list document has a non-sequence 'items' field")]
    InvalidList,

    /// Documents could not be rendered as JSON
    #[error("failed to render JSON output: {source}")]
    RenderJson {
        /// Underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Documents could not be rendered as YAML
    #[error("failed to render YAML output: {source}")]
    RenderYaml {
        /// Underlying serialization error
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
