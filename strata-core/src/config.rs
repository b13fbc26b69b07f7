//! The world-generation configuration distributed to connecting peers.
//!
//! The sync protocol treats the encoded form as an opaque, immutable blob;
//! the only fields it observes are `world_uid` and `enabled`. Everything
//! else is consumed by the terrain pipeline after synchronization.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::serialization;

/// One image-derived generation layer (heightmap, biome map, ...).
///
/// The pixel data is carried pre-decoded and opaque; only its originating
/// path is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    /// Path the layer was loaded from on the host.
    pub source_path: String,
    /// Raw layer data.
    pub data: Vec<u8>,
}

/// Full generation configuration for one world, finalized for distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Unique id of the world this configuration was finalized for.
    pub world_uid: u64,
    /// Whether generation override is enabled for this world.
    ///
    /// When false the mod is inert for the world and peers skip the
    /// version agreement check.
    pub enabled: bool,
    /// Overall feature scale.
    pub global_scale: f32,
    /// Mountains amount, 0..=1.
    pub mountains_amount: f32,
    /// Sea level adjustment, 0..=1 (changes the land:sea ratio).
    pub sea_level_adjustment: f32,
    /// Max height of ridge features (0 disables ridges).
    pub max_ridge_height: f32,
    /// Scales forested/cleared area size, 0..=1.
    pub forest_scale: f32,
    /// Whether ocean channels are carved.
    pub ocean_channels: bool,
    /// Whether rivers are generated.
    pub rivers: bool,
    /// Whether the map drops off at the edges.
    pub map_edge_dropoff: bool,
    /// Optional heightmap layer.
    pub heightmap: Option<MapLayer>,
    /// Optional biome map layer.
    pub biome_map: Option<MapLayer>,
}

impl WorldConfig {
    /// Configuration for a world the mod is disabled for.
    ///
    /// Used on hosts with no configuration file for the loaded world, and
    /// on clients until synchronization has delivered the host's config.
    pub fn disabled(world_uid: u64) -> Self {
        Self {
            world_uid,
            enabled: false,
            global_scale: 1.0,
            mountains_amount: 0.5,
            sea_level_adjustment: 0.5,
            max_ridge_height: 0.5,
            forest_scale: 0.5,
            ocean_channels: true,
            rivers: true,
            map_edge_dropoff: true,
            heightmap: None,
            biome_map: None,
        }
    }

    /// Encode to the canonical blob form used for distribution and caching.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serialization::encode(self)
    }

    /// Decode a configuration from its blob form.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        serialization::decode(bytes)
    }
}
