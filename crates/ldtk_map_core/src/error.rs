//! Decode errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Document features this decoder refuses to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unsupported {
    /// Levels saved in separate `.ldtkl` files
    ExternalLevels,
    /// Tilesets using the editor's embedded icon atlas
    EmbeddedAtlas,
    /// Documents with more than the implicit world
    MultiWorld,
    /// Tilesets with `padding > 0`
    TilesetPadding,
    /// Project-wide entity table of contents
    TableOfContents,
}

impl Unsupported {
    /// Document key naming the feature
    pub fn name(self) -> &'static str {
        match self {
            Unsupported::ExternalLevels => "externalLevels",
            Unsupported::EmbeddedAtlas => "embedAtlas",
            Unsupported::MultiWorld => "worlds",
            Unsupported::TilesetPadding => "padding",
            Unsupported::TableOfContents => "toc",
        }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an unresolved identifier was supposed to point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Level,
    Layer,
    Entity,
    EntityDef,
    Tileset,
    Enum,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefKind::Level => "level",
            RefKind::Layer => "layer",
            RefKind::Entity => "entity",
            RefKind::EntityDef => "entity definition",
            RefKind::Tileset => "tileset",
            RefKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// Errors that abort a project load or a reference lookup
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported feature: {feature}")]
    UnsupportedFeature { feature: Unsupported },

    #[error("missing key: {path}")]
    MissingKey { path: String },

    #[error("malformed value at {path}: {reason}")]
    MalformedValue { path: String, reason: String },

    #[error("field '{id}' is set twice on {owner}")]
    DuplicateFieldIdentifier { owner: String, id: String },

    #[error("unresolved {kind} reference: {id}")]
    UnresolvedReference { kind: RefKind, id: String },

    #[error("tile {index} is out of range for tileset '{tileset}' ({count} tiles) at {path}")]
    TileIndexOutOfRange {
        tileset: String,
        index: usize,
        count: usize,
        path: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load image {}: {reason}", path.display())]
    Image { path: PathBuf, reason: String },
}

impl DecodeError {
    pub fn unsupported(feature: Unsupported) -> Self {
        DecodeError::UnsupportedFeature { feature }
    }

    pub fn unresolved(kind: RefKind, id: impl ToString) -> Self {
        DecodeError::UnresolvedReference {
            kind,
            id: id.to_string(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::MalformedValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify a record-level serde failure at `path`.
    ///
    /// serde reports absent keys as "missing field `name`"; those become
    /// [`DecodeError::MissingKey`] so callers can tell schema holes from bad values.
    pub(crate) fn from_serde(path: &str, err: serde_json::Error) -> Self {
        let message = err.to_string();
        let missing = message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next());
        match missing {
            Some(key) if path.is_empty() => DecodeError::MissingKey {
                path: key.to_string(),
            },
            Some(key) => DecodeError::MissingKey {
                path: format!("{path}.{key}"),
            },
            None => DecodeError::MalformedValue {
                path: path.to_string(),
                reason: message,
            },
        }
    }
}
