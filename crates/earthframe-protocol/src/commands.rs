//! Outbound commands.
//!
//! Each struct is the body of one command and names the shape of its
//! acknowledgment through [`Command::Response`]. [`OutboundCommand`] is the
//! closed union over all of them.

use earthframe_core::Command;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::atom::Atom;
use crate::config::MapConfig;
use crate::layer::{DataSet, LayerItem, LayerManageItem, LayerMethod};

/// Options shared by `addAtom` and `addLayer`. The map treats every unset
/// flag as `true` except `zoom`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddOptions {
    /// Show the layer once added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Toast success or failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_message: Option<bool>,
    /// Fly to the layer extent afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<bool>,
    /// Insert below this layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_layer_id: Option<String>,
}

/// Add a catalogue atom as a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddAtom {
    /// The atom.
    pub atom: Atom,
    /// Placement options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<AddOptions>,
}

/// Add a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddLayer {
    /// Layer metadata.
    pub layer: LayerItem,
    /// Placement options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<AddOptions>,
}

impl AddLayer {
    /// Add `layer` with the map's default options.
    pub fn new(layer: LayerItem) -> Self {
        Self {
            layer,
            options: None,
        }
    }
}

/// Options for `removeLayer`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveOptions {
    /// Toast success or failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_message: Option<bool>,
}

/// Remove a layer by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoveLayer {
    /// Layer id.
    pub id: String,
    /// Options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RemoveOptions>,
}

impl RemoveLayer {
    /// Remove the layer `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: None,
        }
    }
}

/// Move one layer next to another in the draw order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLayerById {
    /// Layer to move.
    pub source_id: String,
    /// Layer to move it to.
    pub target_id: String,
}

/// Register a data set and its layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddDataSet(pub DataSet);

/// Remove a data set by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDataSet {
    /// Data set id.
    pub id: String,
}

/// Point styling for `addPoints`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointStyle {
    /// CSS fill colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Point diameter in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<f64>,
    /// CSS outline colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_color: Option<String>,
    /// Outline width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<f64>,
}

/// Draw a point collection. Reusing an id replaces the earlier collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddPoints {
    /// Collection id.
    pub id: String,
    /// `[lon, lat]` or `[lon, lat, height]` positions.
    pub positions: Vec<Vec<f64>>,
    /// Styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<PointStyle>,
    /// Attributes shown on pick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

/// Remove a point collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovePoints {
    /// Collection id.
    pub id: String,
}

/// Data-set panel switches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetManage {
    /// Hide the remove button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_remove: Option<bool>,
    /// Hide the layer player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_layer_player: Option<bool>,
}

/// Panel offset in pixels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelPosition {
    /// Horizontal offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Layer manager panel settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerManageConfig {
    /// Data-set panel switches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_manage: Option<DatasetManage>,
    /// Panel position. The map uses `[20, 20]` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PanelPosition>,
}

/// Configure the map's built-in panels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentConfig {
    /// Layer manager panel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_manage: Option<LayerManageConfig>,
    /// Show the legend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,
}

/// Toggle the cartography view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cartography {
    /// Show or hide.
    pub show: bool,
    /// Authorisation token forwarded to the cartography service.
    #[serde(default, rename = "rzpj", skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

/// Tools the map can open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    /// Palaeogeographic reconstruction.
    GeoReconstruct,
    /// Swipe comparison.
    LayerSplit,
    /// Layer animation player.
    LayerVideo,
    /// Add a layer by URL.
    CustomLayer,
    /// Draw and export `GeoJSON`.
    CustomGeoJson,
    /// Place search.
    Geocoder,
    /// Subsurface data clipping.
    DepthDataClip,
    /// Contour analysis.
    ContourLine,
    /// Build terrain from a COG raster.
    #[serde(rename = "COG2Terrain")]
    Cog2Terrain,
    /// Sonify an image.
    #[serde(rename = "ImgToAudio")]
    ImgToAudio,
}

/// Pixel insets for tool panels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelInsets {
    /// Right inset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    /// Left inset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    /// Top inset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    /// Bottom inset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

/// Open or close a tool panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpenTool {
    /// Which tool.
    pub tool: Tool,
    /// Open (`true`, the default) or close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Initial panel position. Top left when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<PanelInsets>,
    /// Drag limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<PanelInsets>,
}

impl OpenTool {
    /// Open `tool` with default placement.
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            show: None,
            style: None,
            bounds: None,
        }
    }
}

/// Re-render a layer with new options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderLayer {
    /// Layer id.
    pub id: String,
    /// Method-specific render options.
    pub options: Value,
    /// Render as this method regardless of the layer's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_method: Option<LayerMethod>,
}

/// Enable feature queries on one vector layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialQuery {
    /// Vector layer id. Empty disables querying.
    pub id: String,
}

impl SpatialQuery {
    /// Query `id`. Only one layer is queryable at a time.
    pub fn enable(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Turn querying off.
    pub fn disable() -> Self {
        Self { id: String::new() }
    }
}

/// Toggle pixel queries on a COG layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CogQuery {
    /// COG layer id.
    pub id: String,
    /// On or off.
    pub enable: bool,
}

/// Shape drawn by the drawing tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawShape {
    /// Closed polygon.
    Polygon,
    /// Open line.
    Polyline,
    /// Single point.
    Point,
    /// Circle.
    Circle,
    /// Axis-aligned rectangle.
    Rectangle,
}

/// Start or stop the drawing tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawOperation {
    /// Begin drawing.
    Start,
    /// Tear the tool down.
    Destroy,
}

/// Drive the drawing tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawer {
    /// Shape to draw.
    #[serde(rename = "type")]
    pub shape: DrawShape,
    /// Start or stop.
    pub operate: DrawOperation,
    /// Stop after the first shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub once: Option<bool>,
    /// Drawing a new shape discards the previous one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_instance: Option<bool>,
}

impl Drawer {
    /// Start drawing `shape`.
    pub fn start(shape: DrawShape) -> Self {
        Self {
            shape,
            operate: DrawOperation::Start,
            once: None,
            one_instance: None,
        }
    }
}

/// A finished drawing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// Shape drawn.
    #[serde(rename = "type")]
    pub shape: DrawShape,
    /// `[lon, lat]` vertices.
    pub positions: Vec<Vec<f64>>,
}

macro_rules! command_catalog {
    ($($variant:ident => $name:literal : $response:ty),* $(,)?) => {
        $(
            impl Command for $variant {
                const TYPE: &'static str = $name;
                type Response = $response;
            }

            impl From<$variant> for OutboundCommand {
                fn from(command: $variant) -> Self {
                    Self::$variant(command)
                }
            }
        )*

        /// Every command the map accepts, tagged by wire name.
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "body")]
        pub enum OutboundCommand {
            $(
                #[allow(missing_docs)]
                #[serde(rename = $name)]
                $variant($variant),
            )*
        }

        impl OutboundCommand {
            /// Every command wire name.
            pub const NAMES: &'static [&'static str] = &[$($name),*];

            /// Wire name of this command.
            pub fn message_type(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $name,)*
                }
            }

            /// JSON body of this command.
            pub fn body(&self) -> serde_json::Result<Value> {
                match self {
                    $(Self::$variant(command) => serde_json::to_value(command),)*
                }
            }
        }
    };
}

command_catalog! {
    AddAtom => "addAtom": LayerManageItem,
    AddLayer => "addLayer": LayerManageItem,
    RemoveLayer => "removeLayer": bool,
    MoveLayerById => "moveLayerById": bool,
    AddDataSet => "addDataSet": bool,
    RemoveDataSet => "removeDataSet": bool,
    AddPoints => "addPoints": bool,
    RemovePoints => "removePoints": bool,
    ComponentConfig => "componentConfig": bool,
    MapConfig => "mapConfig": bool,
    Cartography => "cartography": bool,
    OpenTool => "openTool": bool,
    RenderLayer => "renderLayer": bool,
    SpatialQuery => "spatialQuery": bool,
    CogQuery => "cogQuery": bool,
    Drawer => "drawer": Drawing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body<C: Command>(command: &C) -> Value {
        serde_json::to_value(command).unwrap()
    }

    #[test]
    fn config_command_matches_handshake_name() {
        assert_eq!(MapConfig::TYPE, earthframe_core::CONFIG_COMMAND);
    }

    #[test]
    fn names_are_unique() {
        let mut names = OutboundCommand::NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn remove_layer_omits_unset_options() {
        assert_eq!(body(&RemoveLayer::new("l1")), json!({"id": "l1"}));
    }

    #[test]
    fn move_layer_uses_camel_case() {
        let command = MoveLayerById {
            source_id: "a".into(),
            target_id: "b".into(),
        };
        assert_eq!(body(&command), json!({"sourceId": "a", "targetId": "b"}));
    }

    #[test]
    fn add_data_set_is_the_bare_set() {
        let command = AddDataSet(DataSet::new("d1", "Permian"));
        assert_eq!(body(&command), json!({"id": "d1", "name": "Permian", "layers": []}));
    }

    #[test]
    fn cartography_auth_uses_wire_name() {
        let command = Cartography {
            show: true,
            auth: Some("secret".into()),
        };
        assert_eq!(body(&command), json!({"show": true, "rzpj": "secret"}));
    }

    #[test]
    fn tool_names() {
        assert_eq!(body(&OpenTool::new(Tool::Cog2Terrain)), json!({"tool": "COG2Terrain"}));
        assert_eq!(body(&OpenTool::new(Tool::CustomGeoJson)), json!({"tool": "customGeoJson"}));
        assert_eq!(body(&OpenTool::new(Tool::Geocoder)), json!({"tool": "geocoder"}));
    }

    #[test]
    fn spatial_query_disable_sends_empty_id() {
        assert_eq!(body(&SpatialQuery::disable()), json!({"id": ""}));
    }

    #[test]
    fn drawer_shape_is_the_type_field() {
        let mut command = Drawer::start(DrawShape::Rectangle);
        command.once = Some(true);
        assert_eq!(
            body(&command),
            json!({"type": "RECTANGLE", "operate": "start", "once": true})
        );
    }

    #[test]
    fn drawing_reply_decodes() {
        let reply: Drawing = serde_json::from_value(json!({
            "type": "POLYLINE",
            "positions": [[100.0, 30.0], [101.5, 31.0]]
        }))
        .unwrap();
        assert_eq!(reply.shape, DrawShape::Polyline);
        assert_eq!(reply.positions.len(), 2);
    }

    #[test]
    fn outbound_command_is_a_tagged_envelope() {
        let command = OutboundCommand::from(CogQuery {
            id: "cog".into(),
            enable: true,
        });
        assert_eq!(command.message_type(), "cogQuery");
        assert_eq!(command.body().unwrap(), json!({"id": "cog", "enable": true}));
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"type": "cogQuery", "body": {"id": "cog", "enable": true}})
        );

        let back: OutboundCommand =
            serde_json::from_value(json!({"type": "removePoints", "body": {"id": "p"}})).unwrap();
        assert_eq!(back, OutboundCommand::RemovePoints(RemovePoints { id: "p".into() }));
    }
}
