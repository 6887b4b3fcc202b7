//! # earthframe-protocol
//!
//! Typed catalog of the messages exchanged with the embedded map.
//!
//! - **Commands**: one body struct per outbound command, each implementing
//!   [`Command`](earthframe_core::Command) so [`EarthFrame::dispatch`]
//!   returns the typed acknowledgment
//! - **Events**: one marker per unsolicited event, each implementing
//!   [`Event`](earthframe_core::Event) for [`EarthFrame::on_event`]
//! - **Unions**: [`OutboundCommand`] and [`InboundEvent`] for whole-envelope
//!   handling
//!
//! Deep schemas (layers, atoms, render options) are only partially typed.
//! Unrecognised fields are kept and written back unchanged.
//!
//! [`EarthFrame::dispatch`]: earthframe_core::EarthFrame::dispatch
//! [`EarthFrame::on_event`]: earthframe_core::EarthFrame::on_event

#![deny(unsafe_code)]

pub mod atom;
pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod layer;

pub use atom::{Atom, AtomType, LayerServiceInfo};
pub use commands::*;
pub use config::{DisplayMode, GraphPosition, Language, MapConfig};
pub use errors::ProtocolError;
pub use events::*;
pub use layer::{
    DataSet, DataSetParams, LayerItem, LayerManageItem, LayerMethod, LayerType, TerrainLayer,
    TerrainOptions,
};

/// Protocol revision this catalog describes.
pub const PROTOCOL_VERSION: u32 = 1;
