// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Conversion between unstructured documents and typed `PersistentVolume`s.
//!
//! Backup hosts hand items to actions as schema-flexible JSON documents. All of
//! that flexibility is confined to the two functions here: the rest of the crate
//! only ever sees a typed [`PersistentVolume`].
//!
//! # Example
//!
//! ```rust
//! use pv_zone_labeler::convert::{decode_persistent_volume, encode_persistent_volume};
//! use serde_json::json;
//!
//! let item = json!({
//!     "apiVersion": "v1",
//!     "kind": "PersistentVolume",
//!     "metadata": { "name": "pv-1" }
//! });
//!
//! let pv = decode_persistent_volume(&item).unwrap();
//! assert_eq!(pv.metadata.name.as_deref(), Some("pv-1"));
//!
//! let document = encode_persistent_volume(&pv).unwrap();
//! assert_eq!(document["kind"], "PersistentVolume");
//! ```

use crate::constants::{API_VERSION_CORE_V1, KIND_PERSISTENT_VOLUME};
use crate::errors::ConversionError;
use k8s_openapi::api::core::v1::PersistentVolume;
use kube::core::TypeMeta;
use kube::ResourceExt;
use serde::Deserialize;
use serde_json::Value;

/// Decode an unstructured document into a [`PersistentVolume`].
///
/// The document must carry `apiVersion: v1` and `kind: PersistentVolume`, and
/// every typed field must have the shape the Kubernetes API defines. Fields the
/// typed model does not know about are ignored.
///
/// # Errors
///
/// * [`ConversionError::MissingTypeMeta`] - the document is not a mapping or lacks
///   `apiVersion`/`kind`
/// * [`ConversionError::UnexpectedKind`] - the document is some other resource
/// * [`ConversionError::Decode`] - a field has an incompatible shape
pub fn decode_persistent_volume(item: &Value) -> Result<PersistentVolume, ConversionError> {
    let types =
        TypeMeta::deserialize(item).map_err(|source| ConversionError::MissingTypeMeta { source })?;

    if types.api_version != API_VERSION_CORE_V1 || types.kind != KIND_PERSISTENT_VOLUME {
        return Err(ConversionError::UnexpectedKind {
            api_version: types.api_version,
            kind: types.kind,
        });
    }

    PersistentVolume::deserialize(item).map_err(|source| ConversionError::Decode { source })
}

/// Encode a [`PersistentVolume`] back into an unstructured document.
///
/// # Errors
///
/// Returns [`ConversionError::Encode`] if serialization fails.
pub fn encode_persistent_volume(pv: &PersistentVolume) -> Result<Value, ConversionError> {
    serde_json::to_value(pv).map_err(|source| ConversionError::Encode {
        name: pv.name_any(),
        source,
    })
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod convert_tests;
