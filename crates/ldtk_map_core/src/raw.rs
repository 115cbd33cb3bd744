//! Document records, one per record kind
//!
//! These mirror the file format key for key. Nested collections that need
//! their own error path stay as `serde_json::Value` and are decoded one
//! element at a time with [`decode_record`].

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as Json;
use uuid::Uuid;

/// Decode one record, reporting failures at `path`
pub(crate) fn decode_record<T: DeserializeOwned>(json: &Json, path: &str) -> Result<T, DecodeError> {
    T::deserialize(json).map_err(|e| DecodeError::from_serde(path, e))
}

/// Decode a list of records, reporting failures at `path[i]`
pub(crate) fn decode_list<T: DeserializeOwned>(
    items: &[Json],
    path: &str,
) -> Result<Vec<T>, DecodeError> {
    items
        .iter()
        .enumerate()
        .map(|(i, json)| decode_record(json, &format!("{path}[{i}]")))
        .collect()
}

/// Decode a nullable record; absent and `null` both give `None`
pub(crate) fn decode_optional<T: DeserializeOwned>(
    json: Option<&Json>,
    path: &str,
) -> Result<Option<T>, DecodeError> {
    json.filter(|json| !json.is_null())
        .map(|json| decode_record(json, path))
        .transpose()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProject {
    pub bg_color: String,
    pub defs: Json,
    pub external_levels: bool,
    pub iid: Uuid,
    pub json_version: String,
    pub levels: Vec<Json>,
    #[serde(default)]
    pub toc: Vec<Json>,
    pub world_grid_height: Option<i32>,
    pub world_grid_width: Option<i32>,
    pub world_layout: Option<String>,
    #[serde(default)]
    pub worlds: Vec<Json>,
    pub default_grid_size: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDefs {
    pub tilesets: Vec<Json>,
    #[serde(default)]
    pub enums: Vec<Json>,
    #[serde(default)]
    pub external_enums: Vec<Json>,
    #[serde(default)]
    pub entities: Vec<Json>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTileset {
    pub uid: i64,
    pub identifier: String,
    pub rel_path: Option<String>,
    #[serde(rename = "__cWid")]
    pub c_wid: u32,
    #[serde(rename = "__cHei")]
    pub c_hei: u32,
    pub tile_grid_size: u32,
    pub spacing: u32,
    pub padding: u32,
    pub embed_atlas: Option<String>,
    pub tags_source_enum_uid: Option<i64>,
    #[serde(default)]
    pub custom_data: Vec<Json>,
    #[serde(default)]
    pub enum_tags: Vec<Json>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub px_wid: Option<u32>,
    pub px_hei: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCustomData {
    pub tile_id: usize,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEnumTag {
    pub enum_value_id: String,
    pub tile_ids: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTileRect {
    pub tileset_uid: i64,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEnum {
    pub uid: i64,
    pub identifier: String,
    pub values: Vec<Json>,
    pub external_rel_path: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEnumValue {
    pub id: String,
    #[serde(default)]
    pub color: u32,
    pub tile_rect: Option<Json>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEntityDef {
    pub uid: i64,
    pub identifier: String,
    pub color: String,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub nine_slice_borders: Vec<i32>,
    pub pivot_x: f64,
    pub pivot_y: f64,
    pub tileset_id: Option<i64>,
    pub tile_rect: Option<Json>,
    #[serde(default)]
    pub tile_render_mode: String,
    pub ui_tile_rect: Option<Json>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLevel {
    pub uid: i64,
    pub iid: Uuid,
    pub identifier: String,
    pub external_rel_path: Option<String>,
    #[serde(rename = "__bgColor")]
    pub bg_color: String,
    #[serde(rename = "__bgPos")]
    pub bg_pos: Option<Json>,
    pub bg_rel_path: Option<String>,
    #[serde(default)]
    pub field_instances: Vec<Json>,
    pub layer_instances: Option<Vec<Json>>,
    pub px_wid: i32,
    pub px_hei: i32,
    pub world_depth: i32,
    pub world_x: i32,
    pub world_y: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBgPos {
    pub crop_rect: [f64; 4],
    pub scale: [f64; 2],
    pub top_left_px: [i32; 2],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLayer {
    #[serde(rename = "__cWid")]
    pub c_wid: u32,
    #[serde(rename = "__cHei")]
    pub c_hei: u32,
    #[serde(rename = "__gridSize")]
    pub grid_size: u32,
    #[serde(rename = "__identifier")]
    pub identifier: String,
    #[serde(rename = "__opacity")]
    pub opacity: f32,
    #[serde(rename = "__pxTotalOffsetX")]
    pub px_total_offset_x: i32,
    #[serde(rename = "__pxTotalOffsetY")]
    pub px_total_offset_y: i32,
    #[serde(rename = "__tilesetDefUid")]
    pub tileset_def_uid: Option<i64>,
    #[serde(rename = "__type")]
    pub layer_type: crate::layer::LayerType,
    #[serde(default)]
    pub auto_layer_tiles: Vec<Json>,
    #[serde(default)]
    pub grid_tiles: Vec<Json>,
    #[serde(default)]
    pub entity_instances: Vec<Json>,
    #[serde(default)]
    pub int_grid_csv: Vec<i32>,
    pub iid: Uuid,
    pub layer_def_uid: i64,
    pub level_id: i64,
    pub override_tileset_uid: Option<i64>,
    pub px_offset_x: i32,
    pub px_offset_y: i32,
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTile {
    pub a: f32,
    pub f: u8,
    pub px: [i32; 2],
    pub t: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEntity {
    #[serde(rename = "__grid")]
    pub grid: [i32; 2],
    #[serde(rename = "__identifier")]
    pub identifier: String,
    pub def_uid: i64,
    #[serde(rename = "__tags", default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub field_instances: Vec<Json>,
    pub iid: Uuid,
    #[serde(rename = "__worldX")]
    pub world_x: Option<i32>,
    #[serde(rename = "__worldY")]
    pub world_y: Option<i32>,
    pub width: i32,
    pub height: i32,
    pub px: [i32; 2],
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawField {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    #[serde(rename = "__type")]
    pub field_type: String,
    #[serde(rename = "__value")]
    pub value: Option<Json>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGridPoint {
    pub cx: f64,
    pub cy: f64,
}
