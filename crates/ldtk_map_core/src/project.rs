//! Project loading and cross-level lookups

use crate::color::Color;
use crate::defs::{Definitions, TilesetRecords};
use crate::entity::EntityInstance;
use crate::error::{DecodeError, RefKind, Unsupported};
use crate::field::EntityRef;
use crate::image::{DeclaredImageProvider, FsImageProvider, ImageProvider};
use crate::layer::Layer;
use crate::level::{Level, LevelContext};
use crate::options::{ImageSource, LoadOptions};
use crate::raw::{decode_record, RawDefs, RawLevel, RawProject};
use log::info;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Grid size assumed when the document does not declare one
pub const DEFAULT_GRID_SIZE: u32 = 16;

/// How levels are arranged in world space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldLayout {
    Free,
    GridVania,
    LinearHorizontal,
    LinearVertical,
}

impl WorldLayout {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Free" => Some(WorldLayout::Free),
            "GridVania" => Some(WorldLayout::GridVania),
            "LinearHorizontal" => Some(WorldLayout::LinearHorizontal),
            "LinearVertical" => Some(WorldLayout::LinearVertical),
            _ => None,
        }
    }

    /// Whether entities carry world coordinates under this layout
    pub fn has_world_coords(self) -> bool {
        matches!(self, WorldLayout::Free | WorldLayout::GridVania)
    }
}

/// A fully decoded project
#[derive(Debug, Clone)]
pub struct Project {
    pub iid: Uuid,
    pub json_version: String,
    pub bg_color: Color,
    pub default_grid_size: u32,
    pub world_layout: Option<WorldLayout>,
    pub world_grid_width: Option<i32>,
    pub world_grid_height: Option<i32>,
    /// Shared by every level
    pub defs: Arc<Definitions>,
    pub levels: Vec<Level>,
    levels_by_iid: HashMap<Uuid, usize>,
}

impl Project {
    /// Decode a project from its JSON text.
    ///
    /// Relative image paths are joined onto `base_dir`.
    pub fn from_json_str(
        base_dir: &Path,
        json: &str,
        options: &LoadOptions,
        provider: &dyn ImageProvider,
    ) -> Result<Self, DecodeError> {
        let json: Json = serde_json::from_str(json)?;
        Self::decode(base_dir, &json, options, provider)
    }

    /// Decode a project from a parsed document
    pub fn decode(
        base_dir: &Path,
        json: &Json,
        options: &LoadOptions,
        provider: &dyn ImageProvider,
    ) -> Result<Self, DecodeError> {
        let raw: RawProject = decode_record(json, "")?;

        // Unsupported features are rejected before any image is requested
        if raw.external_levels {
            return Err(DecodeError::unsupported(Unsupported::ExternalLevels));
        }
        if !raw.worlds.is_empty() {
            return Err(DecodeError::unsupported(Unsupported::MultiWorld));
        }
        if !raw.toc.is_empty() {
            return Err(DecodeError::unsupported(Unsupported::TableOfContents));
        }

        let raw_defs: RawDefs = decode_record(&raw.defs, "defs")?;
        let tilesets = TilesetRecords::decode(&raw_defs, options)?;
        tilesets.check_supported()?;

        let raw_levels = raw
            .levels
            .iter()
            .enumerate()
            .map(|(i, json)| {
                let path = format!("levels[{i}]");
                let level: RawLevel = decode_record(json, &path)?;
                if level.external_rel_path.is_some() {
                    return Err(DecodeError::unsupported(Unsupported::ExternalLevels));
                }
                Ok((path, level))
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let bg_color = Color::from_hex(&raw.bg_color).ok_or_else(|| {
            DecodeError::malformed("bgColor", format!("bad color '{}'", raw.bg_color))
        })?;

        let default_grid_size = match raw.default_grid_size {
            None => DEFAULT_GRID_SIZE,
            Some(size) => u32::try_from(size)
                .ok()
                .filter(|&size| size > 0)
                .ok_or_else(|| {
                    DecodeError::malformed("defaultGridSize", format!("invalid grid size {size}"))
                })?,
        };

        let world_layout = raw
            .world_layout
            .as_deref()
            .map(|name| {
                WorldLayout::from_name(name).ok_or_else(|| {
                    DecodeError::malformed("worldLayout", format!("unknown layout '{name}'"))
                })
            })
            .transpose()?;

        let defs = Arc::new(Definitions::decode(base_dir, &raw_defs, tilesets, provider)?);

        let ctx = LevelContext {
            base_dir,
            defs: &defs,
            options,
            provider,
            default_grid_size,
        };
        let levels = raw_levels
            .into_iter()
            .map(|(path, raw)| Level::decode(raw, &path, &ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let mut levels_by_iid = HashMap::with_capacity(levels.len());
        for (i, level) in levels.iter().enumerate() {
            if levels_by_iid.insert(level.iid, i).is_some() {
                return Err(DecodeError::malformed(
                    format!("levels[{i}].iid"),
                    format!("level iid {} is used twice", level.iid),
                ));
            }
        }

        Ok(Project {
            iid: raw.iid,
            json_version: raw.json_version,
            bg_color,
            default_grid_size,
            world_layout,
            world_grid_width: raw.world_grid_width,
            world_grid_height: raw.world_grid_height,
            defs,
            levels,
            levels_by_iid,
        })
    }

    pub fn level(&self, iid: &Uuid) -> Option<&Level> {
        self.levels_by_iid.get(iid).map(|&i| &self.levels[i])
    }

    /// Look up a level, failing with [`DecodeError::UnresolvedReference`]
    pub fn get_level(&self, iid: &Uuid) -> Result<&Level, DecodeError> {
        self.level(iid)
            .ok_or_else(|| DecodeError::unresolved(RefKind::Level, iid))
    }

    /// First level with this identifier
    pub fn level_by_identifier(&self, identifier: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.identifier == identifier)
    }

    /// Resolve an entity reference through level, layer and entity indexes
    pub fn get_entity(
        &self,
        target: &EntityRef,
    ) -> Result<(&Level, &Layer, &EntityInstance), DecodeError> {
        let level = self.get_level(&target.level_iid)?;
        let layer = level.get_layer(&target.layer_iid)?;
        let entity = layer.get_entity(&target.entity_iid)?;
        Ok((level, layer, entity))
    }

    /// Every level containing the world point, in project order
    pub fn get_levels_at_point(&self, x: f64, y: f64) -> Vec<&Level> {
        self.levels
            .iter()
            .filter(|level| level.contains_world_coord(x, y))
            .collect()
    }
}

/// Load a project file with default options
pub fn load_project(path: impl AsRef<Path>) -> Result<Project, DecodeError> {
    load_project_with(path, &LoadOptions::default())
}

/// Load a project file.
///
/// Relative paths inside the document resolve against the file's directory.
pub fn load_project_with(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Project, DecodeError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let provider: &dyn ImageProvider = match options.image_source {
        ImageSource::Filesystem => &FsImageProvider,
        ImageSource::Declared => &DeclaredImageProvider,
    };
    let project = Project::from_json_str(base_dir, &content, options, provider)?;

    info!(
        "Loaded {} ({} levels, {} tilesets, {} entity definitions)",
        path.display(),
        project.levels.len(),
        project.defs.tilesets.len(),
        project.defs.entities.len()
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Json {
        json!({
            "bgColor": "#40465B",
            "defs": { "tilesets": [], "enums": [], "externalEnums": [], "entities": [] },
            "externalLevels": false,
            "iid": "e4a1b2c0-3b70-11ee-8a5a-5bd7b1a6d4e1",
            "jsonVersion": "1.5.3",
            "levels": [],
            "toc": [],
            "worldGridHeight": 256,
            "worldGridWidth": 256,
            "worldLayout": "Free",
            "worlds": []
        })
    }

    fn decode(json: &Json) -> Result<Project, DecodeError> {
        Project::decode(
            Path::new("."),
            json,
            &LoadOptions::default(),
            &DeclaredImageProvider,
        )
    }

    #[test]
    fn test_empty_project() {
        let project = decode(&document()).unwrap();
        assert!(project.levels.is_empty());
        assert_eq!(project.world_layout, Some(WorldLayout::Free));
        assert_eq!(project.default_grid_size, DEFAULT_GRID_SIZE);
        assert_eq!(project.json_version, "1.5.3");
        assert!(project.get_levels_at_point(0.0, 0.0).is_empty());
    }

    #[test]
    fn test_project_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Project>();
    }

    #[test]
    fn test_top_level_gates() {
        let cases = [
            ("externalLevels", json!(true), Unsupported::ExternalLevels),
            ("worlds", json!([{ "identifier": "World" }]), Unsupported::MultiWorld),
            (
                "toc",
                json!([{ "identifier": "Door", "instances": [] }]),
                Unsupported::TableOfContents,
            ),
        ];
        for (key, value, expected) in cases {
            let mut json = document();
            json[key] = value;
            match decode(&json) {
                Err(DecodeError::UnsupportedFeature { feature }) => assert_eq!(feature, expected),
                other => panic!("{key}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_top_level_key() {
        let mut json = document();
        json.as_object_mut().unwrap().remove("jsonVersion");
        match decode(&json) {
            Err(DecodeError::MissingKey { path }) => assert_eq!(path, "jsonVersion"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_layout_and_grid_size() {
        let mut json = document();
        json["worldLayout"] = json!(null);
        json["defaultGridSize"] = json!(8);
        let project = decode(&json).unwrap();
        assert_eq!(project.world_layout, None);
        assert_eq!(project.default_grid_size, 8);

        json["worldLayout"] = json!("Spiral");
        assert!(matches!(decode(&json), Err(DecodeError::MalformedValue { .. })));

        json["worldLayout"] = json!("GridVania");
        json["defaultGridSize"] = json!(0);
        assert!(matches!(
            decode(&json),
            Err(DecodeError::MalformedValue { path, .. }) if path == "defaultGridSize"
        ));
    }

    #[test]
    fn test_invalid_json_text() {
        let result = Project::from_json_str(
            Path::new("."),
            "{ not json",
            &LoadOptions::default(),
            &DeclaredImageProvider,
        );
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_project("/nonexistent/world.ldtk");
        assert!(matches!(result, Err(DecodeError::Io { .. })));
    }
}
