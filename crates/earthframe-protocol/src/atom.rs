//! Catalogue atoms: data records published by the map's backing service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of resource an atom describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtomType {
    /// A published map layer service.
    LayerService,
    /// A database table.
    Jdbc,
    /// An HTTP endpoint.
    Http,
}

/// Service description of a layer-backed atom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerServiceInfo {
    /// Service URL.
    pub url: String,
    /// Layer name within the service.
    pub source_layer: String,
    /// Service standard, such as `WMTS` or `COG_TIF`.
    #[serde(default)]
    pub standard: Option<String>,
    /// Encoding, such as `PNG` or `MAPBOX_VECTOR_TILE`.
    #[serde(default)]
    pub format: Option<String>,
    /// Loading method, such as `COG` or `WMS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A catalogue record the map can turn into a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atom {
    /// Numeric id.
    pub id: i64,
    /// Stable unique id.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Resource kind.
    pub atom_type: AtomType,
    /// Data type label.
    #[serde(default)]
    pub data_type: String,
    /// How to load the atom as a layer.
    pub layer_service_info: LayerServiceInfo,
    /// WKT polygon bounding the data.
    #[serde(default, rename = "boundaryWKT")]
    pub boundary_wkt: Option<String>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
