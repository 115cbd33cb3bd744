//! A two-level project used by the integration tests
//!
//! "Hall" sits at world (0, 0) and "Vault" at world (64, 64); both are
//! 128x128, so they overlap on `[64, 128) x [64, 128)`.

#![allow(dead_code)]

use ldtk_map_core::{DeclaredImageProvider, DecodeError, LoadOptions, Project};
use serde_json::{json, Value as Json};
use std::path::Path;
use uuid::Uuid;

pub const HALL: &str = "a0000000-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const VAULT: &str = "a0000001-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const HALL_ENTITIES: &str = "b0000000-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const HALL_GROUND: &str = "b0000001-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const HALL_COLLISIONS: &str = "b0000002-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const VAULT_ENTITIES: &str = "b0000003-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const LEVER: &str = "c0000000-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const DOOR: &str = "c0000001-3b70-11ee-8a5a-5bd7b1a6d4e1";
pub const WORLD: &str = "d0000000-3b70-11ee-8a5a-5bd7b1a6d4e1";

pub fn iid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

fn tilesets() -> Json {
    json!([
        {
            "uid": 1,
            "identifier": "Cavernas",
            "relPath": "atlas/cavernas.png",
            "__cWid": 8,
            "__cHei": 4,
            "pxWid": 128,
            "pxHei": 64,
            "tileGridSize": 16,
            "spacing": 0,
            "padding": 0,
            "embedAtlas": null,
            "tagsSourceEnumUid": null,
            "customData": [{ "tileId": 5, "data": "lava" }],
            "enumTags": [],
            "tags": []
        },
        {
            "uid": 99,
            "identifier": "Internal_Icons",
            "relPath": null,
            "__cWid": 64,
            "__cHei": 64,
            "pxWid": 1024,
            "pxHei": 1024,
            "tileGridSize": 16,
            "spacing": 0,
            "padding": 0,
            "embedAtlas": "LdtkIcons",
            "tagsSourceEnumUid": null,
            "customData": [],
            "enumTags": [],
            "tags": []
        }
    ])
}

fn entity_defs() -> Json {
    json!([
        {
            "uid": 20,
            "identifier": "Door",
            "color": "#BE4A2F",
            "width": 16,
            "height": 32,
            "nineSliceBorders": [],
            "pivotX": 0.5,
            "pivotY": 1.0,
            "tilesetId": 99,
            "tileRect": { "tilesetUid": 99, "x": 0, "y": 0, "w": 16, "h": 16 },
            "uiTileRect": null,
            "tags": ["solid"]
        },
        {
            "uid": 21,
            "identifier": "Lever",
            "color": "#FEAE34",
            "width": 16,
            "height": 16,
            "nineSliceBorders": [],
            "pivotX": 0.0,
            "pivotY": 0.0,
            "tilesetId": 1,
            "tileRect": { "tilesetUid": 1, "x": 16, "y": 0, "w": 16, "h": 16 },
            "uiTileRect": null,
            "tags": []
        }
    ])
}

pub fn layer(
    identifier: &str,
    iid: &str,
    layer_type: &str,
    tileset: Option<i64>,
    level_id: i64,
) -> Json {
    json!({
        "__cWid": 8,
        "__cHei": 8,
        "__gridSize": 16,
        "__identifier": identifier,
        "__opacity": 1.0,
        "__pxTotalOffsetX": 0,
        "__pxTotalOffsetY": 0,
        "__tilesetDefUid": tileset,
        "__type": layer_type,
        "autoLayerTiles": [],
        "gridTiles": [],
        "entityInstances": [],
        "intGridCsv": [],
        "iid": iid,
        "layerDefUid": 100,
        "levelId": level_id,
        "overrideTilesetUid": null,
        "pxOffsetX": 0,
        "pxOffsetY": 0,
        "visible": true
    })
}

fn hall() -> Json {
    let mut entities = layer("Entities", HALL_ENTITIES, "Entities", None, 0);
    entities["entityInstances"] = json!([{
        "__grid": [2, 3],
        "__identifier": "Lever",
        "__tags": [],
        "__worldX": 32,
        "__worldY": 48,
        "defUid": 21,
        "iid": LEVER,
        "width": 16,
        "height": 16,
        "px": [32, 48],
        "fieldInstances": [
            {
                "__identifier": "target",
                "__type": "EntityRef",
                "__value": {
                    "entityIid": DOOR,
                    "layerIid": VAULT_ENTITIES,
                    "levelIid": VAULT,
                    "worldIid": WORLD
                }
            },
            {
                "__identifier": "path",
                "__type": "Array<Point>",
                "__value": [{ "cx": 1, "cy": 1 }, { "cx": 4, "cy": 2 }]
            }
        ]
    }]);

    let mut ground = layer("Ground", HALL_GROUND, "AutoLayer", Some(1), 0);
    ground["autoLayerTiles"] = json!([
        { "a": 1.0, "f": 0, "px": [0, 112], "t": 3 },
        { "a": 1.0, "f": 1, "px": [16, 112], "t": 1 },
        { "a": 1.0, "f": 2, "px": [32, 112], "t": 2 }
    ]);

    let mut collisions = layer("Collisions", HALL_COLLISIONS, "IntGrid", None, 0);
    let mut csv = vec![0; 64];
    csv[56..64].fill(1);
    collisions["intGridCsv"] = json!(csv);

    json!({
        "uid": 0,
        "iid": HALL,
        "identifier": "Hall",
        "externalRelPath": null,
        "__bgColor": "#40465B",
        "__bgPos": null,
        "bgRelPath": null,
        "fieldInstances": [
            { "__identifier": "music", "__type": "String", "__value": "cave" }
        ],
        "layerInstances": [entities, ground, collisions],
        "pxWid": 128,
        "pxHei": 128,
        "worldDepth": 0,
        "worldX": 0,
        "worldY": 0
    })
}

fn vault() -> Json {
    let mut entities = layer("Entities", VAULT_ENTITIES, "Entities", None, 1);
    entities["entityInstances"] = json!([{
        "__grid": [4, 8],
        "__identifier": "Door",
        "__tags": ["solid"],
        "__worldX": 128,
        "__worldY": 192,
        "defUid": 20,
        "iid": DOOR,
        "width": 16,
        "height": 32,
        "px": [64, 128],
        "fieldInstances": [
            { "__identifier": "locked", "__type": "Bool", "__value": true },
            { "__identifier": "key", "__type": "LocalEnum.Item", "__value": "Sword" }
        ]
    }]);

    json!({
        "uid": 1,
        "iid": VAULT,
        "identifier": "Vault",
        "externalRelPath": null,
        "__bgColor": "#1E1E2E",
        "__bgPos": null,
        "bgRelPath": null,
        "fieldInstances": [],
        "layerInstances": [entities],
        "pxWid": 128,
        "pxHei": 128,
        "worldDepth": 0,
        "worldX": 64,
        "worldY": 64
    })
}

pub fn document() -> Json {
    json!({
        "bgColor": "#40465B",
        "defaultGridSize": 16,
        "defs": {
            "tilesets": tilesets(),
            "enums": [{
                "uid": 10,
                "identifier": "Item",
                "externalRelPath": null,
                "values": [
                    { "id": "Sword", "color": 0xC0C0C0, "tileRect": null },
                    { "id": "Potion", "color": 0xFF0000, "tileRect": null }
                ]
            }],
            "externalEnums": [],
            "entities": entity_defs()
        },
        "externalLevels": false,
        "iid": WORLD,
        "jsonVersion": "1.5.3",
        "levels": [hall(), vault()],
        "toc": [],
        "worldGridHeight": 256,
        "worldGridWidth": 256,
        "worldLayout": "Free",
        "worlds": []
    })
}

/// Decode a document without touching the filesystem
pub fn decode(json: &Json) -> Result<Project, DecodeError> {
    decode_with(json, &LoadOptions::default())
}

pub fn decode_with(json: &Json, options: &LoadOptions) -> Result<Project, DecodeError> {
    Project::decode(Path::new("/game"), json, options, &DeclaredImageProvider)
}
