//! Decoder for LDtk level-design projects
//!
//! This crate turns an LDtk project document into a typed, navigable graph:
//! - `Project` - Levels, the shared definition catalog and world metadata
//! - `Definitions` - Tilesets, enums and entity templates, keyed by uid and identifier
//! - `Level` - Geometry, background, fields and ordered layers
//! - `Layer` - Int grid values, entity instances or paint-ordered tiles
//! - `FieldValue` - Typed field payloads, including unresolved `EntityRef`s
//!
//! All geometry is converted once at decode time from the document's Y-down
//! frame to a Y-up frame (`(x, height - y)` per level).

mod color;
mod coords;
mod defs;
mod entity;
mod error;
mod field;
mod image;
mod layer;
mod level;
mod options;
mod project;
mod raw;
mod tile;
mod value;

pub use color::Color;
pub use coords::{LevelSpace, Point};
pub use defs::{DefMap, Definition, Definitions, EntityDef, EnumDef, EnumValue, TilesetDef};
pub use entity::EntityInstance;
pub use error::{DecodeError, RefKind, Unsupported};
pub use field::{decode_value, EntityRef, FieldInstance, FieldMap, FieldValue};
pub use image::{
    DeclaredImageProvider, FsImageProvider, ImageHandle, ImageInfo, ImageProvider, ImageRequest,
    Rect, TileGrid, TileTexture,
};
pub use layer::{Layer, LayerData, LayerType, TileSprite};
pub use level::{BackgroundPlacement, Level, Scene, SceneLayer};
pub use options::{ImageSource, LoadOptions, OptionsError, INTERNAL_ICONS};
pub use project::{load_project, load_project_with, Project, WorldLayout, DEFAULT_GRID_SIZE};
pub use tile::{decode_flip_bits, TileInstance};
pub use value::Value;
