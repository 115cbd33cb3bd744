//! Print the structure of an LDtk project
//!
//! ```text
//! ldtk_map_inspect <project.ldtk> [--config options.toml] [--point X Y]
//! ```
//!
//! Set `RUST_LOG=debug` to trace each decoded level and layer.

use ldtk_map_core::{load_project_with, Layer, LayerData, Level, LoadOptions, Project};
use log::warn;
use std::env;
use std::path::PathBuf;
use std::process;

const USAGE: &str = "usage: ldtk_map_inspect <project.ldtk> [--config options.toml] [--point X Y]";

struct Args {
    project: PathBuf,
    config: Option<PathBuf>,
    point: Option<(f64, f64)>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut project = None;
    let mut config = None;
    let mut point = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a file")?;
                config = Some(PathBuf::from(path));
            }
            "--point" => {
                let mut coord = || -> Result<f64, String> {
                    let value = args.next().ok_or("--point needs X and Y")?;
                    value
                        .parse()
                        .map_err(|_| format!("'{value}' is not a number"))
                };
                point = Some((coord()?, coord()?));
            }
            _ if project.is_none() && !arg.starts_with("--") => project = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }

    Ok(Args {
        project: project.ok_or("missing project path")?,
        config,
        point,
    })
}

fn print_layer(layer: &Layer) {
    let tiles = if layer.has_tiles() {
        format!(", {} tiles", layer.tiles().count())
    } else {
        String::new()
    };
    println!(
        "    {:?} layer '{}' {}x{} @{}px{}{}",
        layer.layer_type,
        layer.identifier,
        layer.c_wid,
        layer.c_hei,
        layer.grid_size,
        tiles,
        if layer.visible { "" } else { " (hidden)" }
    );

    if let LayerData::Entities { entities, .. } = &layer.data {
        for entity in entities {
            let (x, y) = entity.px;
            println!(
                "      {} at ({x}, {y}), {} fields",
                entity.identifier,
                entity.fields.len()
            );
        }
    }
}

fn print_level(level: &Level) {
    println!(
        "  Level '{}' {}x{} at world ({}, {}), depth {}",
        level.identifier,
        level.width,
        level.height,
        level.world_x,
        level.world_y,
        level.world_depth
    );
    for layer in &level.layers {
        print_layer(layer);
    }
}

/// Resolve every entity reference field and report the targets
fn print_references(project: &Project) {
    for level in &project.levels {
        for layer in &level.layers {
            for entity in layer.entities() {
                for field in entity.fields.values() {
                    let Some(target) = field.as_entity_ref() else {
                        continue;
                    };
                    match project.get_entity(target) {
                        Ok((target_level, _, target_entity)) => println!(
                            "  {}.{} -> {} in '{}'",
                            entity.identifier,
                            field.identifier,
                            target_entity.identifier,
                            target_level.identifier
                        ),
                        Err(e) => warn!("{}.{}: {e}", entity.identifier, field.identifier),
                    }
                }
            }
        }
    }
}

fn main() {
    env_logger::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            process::exit(1);
        }
    };

    let options = match &args.config {
        Some(path) => match LoadOptions::load(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Failed to read options '{}': {e}", path.display());
                process::exit(1);
            }
        },
        None => LoadOptions::default(),
    };

    let project = match load_project_with(&args.project, &options) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("Failed to load project '{}': {e}", args.project.display());
            process::exit(1);
        }
    };

    println!(
        "Project {} (format {}), {} levels",
        project.iid,
        project.json_version,
        project.levels.len()
    );
    if let Some(layout) = project.world_layout {
        println!("World layout: {layout:?}");
    }
    println!(
        "Definitions: {} tilesets, {} enums, {} entities",
        project.defs.tilesets.len(),
        project.defs.enums.len(),
        project.defs.entities.len()
    );
    for tileset in project.defs.tilesets.iter() {
        println!(
            "  Tileset '{}' ({} tiles of {}px)",
            tileset.identifier,
            tileset.tile_count(),
            tileset.tile_size()
        );
    }

    println!();
    for level in &project.levels {
        print_level(level);
    }

    println!("\nReferences:");
    print_references(&project);

    if let Some((x, y)) = args.point {
        let names: Vec<_> = project
            .get_levels_at_point(x, y)
            .iter()
            .map(|level| level.identifier.as_str())
            .collect();
        if names.is_empty() {
            println!("\nNo level contains ({x}, {y})");
        } else {
            println!("\nLevels at ({x}, {y}): {}", names.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["world.ldtk", "--point", "10", "-4.5", "--config", "a.toml"]).unwrap();
        assert_eq!(parsed.project, PathBuf::from("world.ldtk"));
        assert_eq!(parsed.config, Some(PathBuf::from("a.toml")));
        assert_eq!(parsed.point, Some((10.0, -4.5)));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["world.ldtk", "--point", "1"]).is_err());
        assert!(args(&["world.ldtk", "--point", "x", "2"]).is_err());
        assert!(args(&["world.ldtk", "other.ldtk"]).is_err());
    }
}
