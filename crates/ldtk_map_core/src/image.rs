//! Image provider capability
//!
//! Decoding never holds pixels. Tilesets and backgrounds keep an
//! [`ImageHandle`] (path plus size) and tiles are [`TileTexture`] regions of it;
//! a renderer turns those into GPU textures however it likes.

use crate::error::DecodeError;
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded image, shared by every texture cut from it
pub type ImageHandle = Arc<ImageInfo>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    /// Pixel size, when known
    pub size: Option<(u32, u32)>,
}

/// Pixel rectangle inside an image, origin at the image's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}

/// A region of an image
#[derive(Debug, Clone, PartialEq)]
pub struct TileTexture {
    pub image: ImageHandle,
    pub rect: Rect,
}

/// Grid geometry of a tileset image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub tile_size: u32,
    pub columns: u32,
    pub rows: u32,
    pub spacing: u32,
}

impl TileGrid {
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Pixel width and height the grid spans, trailing spacing included.
    ///
    /// `None` when the span does not fit in `u32`.
    pub fn extent(&self) -> Option<(u32, u32)> {
        let stride = self.tile_size.checked_add(self.spacing)?;
        Some((
            self.columns.checked_mul(stride)?,
            self.rows.checked_mul(stride)?,
        ))
    }

    /// Rectangle of tile `index` (row-major), or `None` past the grid
    pub fn rect(&self, index: usize) -> Option<Rect> {
        if index >= self.tile_count() {
            return None;
        }
        let col = (index % self.columns as usize) as u32;
        let row = (index / self.columns as usize) as u32;
        let stride = self.tile_size.checked_add(self.spacing)?;
        Some(Rect::new(
            col.checked_mul(stride)?,
            row.checked_mul(stride)?,
            self.tile_size,
            self.tile_size,
        ))
    }
}

/// A request for one image referenced by the document
#[derive(Debug, Clone)]
pub struct ImageRequest<'a> {
    pub path: &'a Path,
    /// Size the document claims the image has
    pub declared_size: Option<(u32, u32)>,
}

/// Source of images for tilesets and level backgrounds
pub trait ImageProvider: Send + Sync {
    fn load(&self, request: &ImageRequest<'_>) -> Result<ImageHandle, DecodeError>;

    /// Cut an image into a row-major list of grid cells
    fn slice_grid(&self, image: &ImageHandle, grid: &TileGrid) -> Vec<TileTexture> {
        if let (Some((width, height)), Some((needed_w, needed_h))) = (image.size, grid.extent()) {
            // Trailing spacing is optional, so allow one spacing of slack
            if needed_w > width.saturating_add(grid.spacing)
                || needed_h > height.saturating_add(grid.spacing)
            {
                warn!(
                    "Tile grid {}x{} of {}px exceeds image {} ({}x{})",
                    grid.columns,
                    grid.rows,
                    grid.tile_size,
                    image.path.display(),
                    width,
                    height
                );
            }
        }

        (0..grid.tile_count())
            .filter_map(|index| grid.rect(index))
            .map(|rect| TileTexture {
                image: Arc::clone(image),
                rect,
            })
            .collect()
    }
}

/// Reads image dimensions from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageProvider;

impl ImageProvider for FsImageProvider {
    fn load(&self, request: &ImageRequest<'_>) -> Result<ImageHandle, DecodeError> {
        let size = ::image::image_dimensions(request.path).map_err(|e| DecodeError::Image {
            path: request.path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Arc::new(ImageInfo {
            path: request.path.to_path_buf(),
            size: Some(size),
        }))
    }
}

/// Trusts the document's declared sizes and never reads a file
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredImageProvider;

impl ImageProvider for DeclaredImageProvider {
    fn load(&self, request: &ImageRequest<'_>) -> Result<ImageHandle, DecodeError> {
        Ok(Arc::new(ImageInfo {
            path: request.path.to_path_buf(),
            size: request.declared_size,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid {
            tile_size: 16,
            columns: 4,
            rows: 3,
            spacing: 2,
        }
    }

    #[test]
    fn test_grid_rects_include_spacing() {
        let grid = grid();
        assert_eq!(grid.tile_count(), 12);
        assert_eq!(grid.rect(0), Some(Rect::new(0, 0, 16, 16)));
        assert_eq!(grid.rect(1), Some(Rect::new(18, 0, 16, 16)));
        assert_eq!(grid.rect(5), Some(Rect::new(18, 18, 16, 16)));
        assert_eq!(grid.rect(11), Some(Rect::new(54, 36, 16, 16)));
        assert_eq!(grid.rect(12), None);
    }

    #[test]
    fn test_grid_extent_overflow() {
        assert_eq!(grid().extent(), Some((72, 54)));

        let huge = TileGrid {
            tile_size: 70_000,
            columns: 70_000,
            rows: 1,
            spacing: 0,
        };
        assert_eq!(huge.extent(), None);
        assert_eq!(huge.rect(0), Some(Rect::new(0, 0, 70_000, 70_000)));
        assert_eq!(huge.rect(69_999), None);

        let wide = Rect::new(u32::MAX - 1, 0, 16, 16);
        assert_eq!(wide.right(), u32::MAX);
    }

    #[test]
    fn test_slice_grid_shares_the_image() {
        let provider = DeclaredImageProvider;
        let image = provider
            .load(&ImageRequest {
                path: Path::new("atlas/tiles.png"),
                declared_size: Some((70, 52)),
            })
            .unwrap();

        let tiles = provider.slice_grid(&image, &grid());
        assert_eq!(tiles.len(), 12);
        assert!(tiles.iter().all(|t| Arc::ptr_eq(&t.image, &image)));
        assert_eq!(tiles[7].rect, Rect::new(54, 18, 16, 16));
    }

    #[test]
    fn test_fs_provider_reports_missing_file() {
        let result = FsImageProvider.load(&ImageRequest {
            path: Path::new("does/not/exist.png"),
            declared_size: None,
        });
        assert!(matches!(result, Err(DecodeError::Image { .. })));
    }
}
