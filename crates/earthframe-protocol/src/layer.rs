//! Layers, data sets, and the layer-manager entries the map reports back.
//!
//! Layer metadata varies by loading method and the map tolerates fields it
//! does not know. Only the fields the bridge or its callers inspect are typed;
//! everything else is kept in `extra` and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How the map loads a layer's data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerMethod {
    /// OGC Web Map Service.
    Wms,
    /// OGC Web Map Tile Service.
    Wmts,
    /// Tile Map Service, raster or vector.
    Tms,
    /// Tianditu tiles.
    Tdt,
    /// `AMap` tiles.
    Amap,
    /// `ArcGIS` map service.
    Arcgis,
    /// Single georeferenced image.
    Pic,
    /// `GeoJSON` document or URL.
    Geojson,
    /// `GeoJSON` rendered as primitives.
    Primitive,
    /// Heat map from point features.
    Heat,
    /// `MapV` visualisation.
    Mapv,
    /// Mapbox vector tiles.
    Pbf,
    /// Cloud-optimised `GeoTIFF`.
    Cog,
    /// `NetCDF` wind/current field.
    Nc,
    /// 3D Tiles.
    Tdtiles,
    /// KML document.
    Kml,
}

/// Broad rendering category of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    /// Raster imagery.
    Raster,
    /// Raster served through an OGC endpoint.
    Ogc,
    /// Vector features.
    Vector,
    /// `NetCDF` particle field.
    Nc,
    /// 3D Tiles.
    Tdtiles,
    /// KML.
    Kml,
}

/// Layer metadata as accepted by `addLayer` and reported in layer events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerItem {
    /// Layer id, unique within the map.
    pub id: String,
    /// Display name.
    pub layer_name: String,
    /// Loading method.
    pub method: LayerMethod,
    /// Service URL, or an inline `GeoJSON` object.
    pub url: Value,
    /// Rendering category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<LayerType>,
    /// Owning data set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    /// WKT polygon bounding the layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<String>,
    /// Camera position `[lon, lat, height]` used when zooming to the layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_port: Option<Vec<f64>>,
    /// Method-specific render options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_options: Option<Value>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayerItem {
    /// A layer loaded from `url` with no optional metadata.
    pub fn new(
        id: impl Into<String>,
        layer_name: impl Into<String>,
        method: LayerMethod,
        url: impl Into<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            layer_name: layer_name.into(),
            method,
            url: url.into(),
            layer_type: None,
            dataset_id: None,
            boundary: None,
            view_port: None,
            render_options: None,
            extra: Map::new(),
        }
    }

    /// Set the rendering category.
    #[must_use]
    pub fn with_layer_type(mut self, layer_type: LayerType) -> Self {
        self.layer_type = Some(layer_type);
        self
    }

    /// Set method-specific render options.
    #[must_use]
    pub fn with_render_options(mut self, options: Value) -> Self {
        self.render_options = Some(options);
        self
    }
}

/// An entry in the map's layer manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerManageItem {
    /// Layer id.
    pub id: String,
    /// Display name.
    pub layer_name: String,
    /// Full layer metadata.
    pub layer: LayerItem,
    /// Whether the layer is visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Whether click queries are enabled. Off unless set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_query: Option<bool>,
    /// Whether the layer takes part in the split-screen comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<bool>,
}

/// Time and space filters applied to a data set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetParams {
    /// Youngest bound, in millions of years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    /// Oldest bound, in millions of years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
    /// WKT area filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_wkt: Option<String>,
}

/// A named group of layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSet {
    /// Data set id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Member layers. May be empty when only registering the set.
    #[serde(default)]
    pub layers: Vec<LayerItem>,
    /// Whether the set can be filtered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    /// Add layers automatically as the global time changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_geo_layer_add: Option<bool>,
    /// Filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<DataSetParams>,
}

impl DataSet {
    /// An empty data set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            layers: Vec::new(),
            filterable: None,
            auto_geo_layer_add: None,
            params: None,
        }
    }
}

/// Terrain options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainOptions {
    /// Request water mask tiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_water_mask: Option<bool>,
    /// Request vertex normals, needed for slope shading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_vertex_normals: Option<bool>,
}

/// Terrain provider used by `mapConfig`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainLayer {
    /// Terrain id.
    pub id: String,
    /// Display name.
    pub layer_name: String,
    /// Terrain service URL. `None` selects the flat ellipsoid.
    #[serde(default)]
    pub url: Option<String>,
    /// Provider options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<TerrainOptions>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn layer_item_keeps_unknown_fields() {
        let raw = json!({
            "id": "l1",
            "layerName": "Coastlines",
            "method": "wms",
            "url": "https://tiles.example/wms",
            "layerType": "raster",
            "sourceLayer": "coast",
            "headers": {"x-auth": "t"}
        });
        let layer: LayerItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(layer.method, LayerMethod::Wms);
        assert_eq!(layer.layer_type, Some(LayerType::Raster));
        assert_eq!(layer.extra["sourceLayer"], json!("coast"));
        assert_eq!(serde_json::to_value(&layer).unwrap(), raw);
    }

    #[test]
    fn geojson_layer_accepts_inline_document() {
        let doc = json!({"type": "FeatureCollection", "features": []});
        let layer = LayerItem::new("g", "Sites", LayerMethod::Geojson, doc.clone())
            .with_layer_type(LayerType::Vector);
        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["url"], doc);
        assert_eq!(value["method"], json!("geojson"));
        assert!(value.get("boundary").is_none());
    }

    #[test]
    fn data_set_without_layers_decodes() {
        let set: DataSet = serde_json::from_value(json!({"id": "d1", "name": "Cambrian"})).unwrap();
        assert_eq!(set, DataSet::new("d1", "Cambrian"));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let raw = json!({"id": "x", "layerName": "x", "method": "ftp", "url": ""});
        assert!(serde_json::from_value::<LayerItem>(raw).is_err());
    }
}
