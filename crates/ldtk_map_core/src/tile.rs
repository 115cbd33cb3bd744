//! Tile instances inside tile-bearing layers

use crate::coords::{LevelSpace, Point};
use crate::defs::TilesetDef;
use crate::error::DecodeError;
use crate::image::TileTexture;
use crate::raw::{decode_record, RawTile};
use serde_json::Value as Json;

/// Split the 2-bit flip field: bit 0 flips X, bit 1 flips Y
pub fn decode_flip_bits(bits: u8) -> (bool, bool) {
    (bits & 1 != 0, bits & 2 != 0)
}

/// One placed tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileInstance {
    pub alpha: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Converted position of the tile's top-left corner
    pub position: Point,
    /// Tile id inside the layer's tileset
    pub tile_id: usize,
    pub texture: TileTexture,
}

impl TileInstance {
    pub(crate) fn decode(
        raw: &RawTile,
        tileset: &TilesetDef,
        space: &LevelSpace,
        path: &str,
    ) -> Result<Self, DecodeError> {
        let texture = tileset
            .tile(raw.t)
            .cloned()
            .ok_or_else(|| DecodeError::TileIndexOutOfRange {
                tileset: tileset.identifier.clone(),
                index: raw.t,
                count: tileset.tile_count(),
                path: path.to_string(),
            })?;
        let (flip_x, flip_y) = decode_flip_bits(raw.f);

        Ok(TileInstance {
            alpha: raw.a,
            flip_x,
            flip_y,
            position: space.convert(f64::from(raw.px[0]), f64::from(raw.px[1])),
            tile_id: raw.t,
            texture,
        })
    }
}

/// Decode a tile list in document order
pub(crate) fn decode_tiles(
    list: &[Json],
    tileset: &TilesetDef,
    space: &LevelSpace,
    path: &str,
) -> Result<Vec<TileInstance>, DecodeError> {
    list.iter()
        .enumerate()
        .map(|(i, json)| {
            let path = format!("{path}[{i}]");
            let raw: RawTile = decode_record(json, &path)?;
            TileInstance::decode(&raw, tileset, space, &path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_bits() {
        assert_eq!(decode_flip_bits(0), (false, false));
        assert_eq!(decode_flip_bits(1), (true, false));
        assert_eq!(decode_flip_bits(2), (false, true));
        assert_eq!(decode_flip_bits(3), (true, true));
    }
}
