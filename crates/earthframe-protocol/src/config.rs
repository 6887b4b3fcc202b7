//! Map-wide configuration pushed with `mapConfig`.
//!
//! Every field is optional; the map keeps its current value for anything
//! omitted. The same shape comes back in `mapConfig:update` events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProtocolError;
use crate::layer::{LayerItem, TerrainLayer};

/// Interface language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English.
    #[serde(rename = "en-US")]
    EnUs,
    /// Simplified Chinese.
    #[serde(rename = "zh-CN")]
    ZhCn,
    /// German.
    #[serde(rename = "de-DE")]
    DeDe,
    /// French.
    #[serde(rename = "fr-FR")]
    FrFr,
    /// Spanish.
    #[serde(rename = "es-ES")]
    EsEs,
    /// Russian.
    #[serde(rename = "ru-RU")]
    RuRu,
    /// Arabic.
    #[serde(rename = "ar-EG")]
    ArEg,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Self; 7] = [
        Self::EnUs,
        Self::ZhCn,
        Self::DeDe,
        Self::FrFr,
        Self::EsEs,
        Self::RuRu,
        Self::ArEg,
    ];

    /// BCP 47 tag used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhCn => "zh-CN",
            Self::DeDe => "de-DE",
            Self::FrFr => "fr-FR",
            Self::EsEs => "es-ES",
            Self::RuRu => "ru-RU",
            Self::ArEg => "ar-EG",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProtocolError::InvalidValue {
                field: "language",
                value: s.to_owned(),
            })
    }
}

/// Globe projection mode. Encoded as `1`, `2`, or `3` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DisplayMode {
    /// 2.5D (Columbus view).
    Columbus,
    /// Flat 2D map.
    Flat,
    /// 3D globe.
    Globe,
}

impl From<DisplayMode> for u8 {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Columbus => 1,
            DisplayMode::Flat => 2,
            DisplayMode::Globe => 3,
        }
    }
}

impl TryFrom<u8> for DisplayMode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Columbus),
            2 => Ok(Self::Flat),
            3 => Ok(Self::Globe),
            other => Err(ProtocolError::InvalidValue {
                field: "displayMode",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s.trim().parse().map_err(|_| ProtocolError::InvalidValue {
            field: "displayMode",
            value: s.to_owned(),
        })?;
        Self::try_from(n)
    }
}

/// Corner where the copyright graphic is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GraphPosition {
    /// Bottom left.
    LeftBottom,
    /// Bottom right. The map's default.
    RightBottom,
}

/// Configuration body of `mapConfig` and `mapConfig:update`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapConfig {
    /// Interface language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    /// Projection mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
    /// Draw the atmosphere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sky_atmosphere: Option<bool>,
    /// Fog density.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_density: Option<f64>,
    /// Base imagery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_map: Option<LayerItem>,
    /// Label overlay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_map: Option<LayerItem>,
    /// Terrain provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainLayer>,
    /// Show the cursor coordinate readout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lonlat_indicator: Option<bool>,
    /// Show the 2D/3D switch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_mode_switch: Option<bool>,
    /// Show the request progress bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ajax_bar: Option<bool>,
    /// Show the measuring tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_tool: Option<bool>,
    /// Show the navigation control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigator: Option<bool>,
    /// Show the status bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_status_bar: Option<bool>,
    /// Show the frame-rate counter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_frames: Option<bool>,
    /// Render quality in `0.0..=1.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
    /// Vertical terrain exaggeration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain_exaggeration: Option<f64>,
    /// Draw the graticule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graticules: Option<bool>,
    /// FXAA anti-aliasing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_aliasing: Option<bool>,
    /// Show the copyright graphic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intellectual_graph_vis: Option<bool>,
    /// Copyright graphic position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intellectual_graph_pos: Option<GraphPosition>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MapConfig {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Encode as the JSON body sent on the wire.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}
