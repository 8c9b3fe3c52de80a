//! A grid of tile ids drawn from one tileset texture.

use crate::error::RenderError;
use crate::sprite::Image;
use crate::texture::Texture;

/// A `width × height` grid of tiles. Negative ids are empty cells.
#[derive(Clone, Debug)]
pub struct TileLayer {
    pub tileset: Texture,
    pub tile_width: u32,
    pub tile_height: u32,
    width: u32,
    height: u32,
    tiles: Vec<i32>,
    /// Layer offset in pixels.
    pub x: f32,
    pub y: f32,
}

impl TileLayer {
    /// Create a layer with every cell set to tile 0.
    pub fn new(width: u32, height: u32, tileset: Texture, tile_width: u32, tile_height: u32) -> Self {
        Self {
            tileset,
            tile_width: tile_width.max(1),
            tile_height: tile_height.max(1),
            width,
            height,
            tiles: vec![0; width as usize * height as usize],
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Replace all cells from row-major tile ids.
    pub fn fill(&mut self, tiles: &[i32]) -> Result<(), RenderError> {
        if tiles.len() != self.tiles.len() {
            return Err(RenderError::TileCount {
                expected: self.tiles.len(),
                got: tiles.len(),
            });
        }
        self.tiles.copy_from_slice(tiles);
        Ok(())
    }

    pub fn get(&self, col: u32, row: u32) -> Option<i32> {
        self.index(col, row).map(|i| self.tiles[i])
    }

    /// Set one cell. Returns `false` if `(col, row)` is outside the layer.
    pub fn set(&mut self, col: u32, row: u32, tile: i32) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// One positioned sub-image per non-empty cell, column by column.
    pub fn images(&self) -> impl Iterator<Item = Image> + '_ {
        let sheet_columns = (self.tileset.width / self.tile_width).max(1);
        (0..self.width)
            .flat_map(move |col| (0..self.height).map(move |row| (col, row)))
            .filter_map(move |(col, row)| {
                let tile = self.get(col, row)?;
                let tile = u32::try_from(tile).ok()?;
                let image = Image::sub_image(
                    self.tileset,
                    (tile % sheet_columns) * self.tile_width,
                    (tile / sheet_columns) * self.tile_height,
                    self.tile_width,
                    self.tile_height,
                );
                Some(image.at(
                    self.x + (col * self.tile_width) as f32,
                    self.y + (row * self.tile_height) as f32,
                ))
            })
    }

    fn index(&self, col: u32, row: u32) -> Option<usize> {
        (col < self.width && row < self.height).then(|| (row * self.width + col) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{PixelFormat, TextureHandle};
    use crate::vertex::UvRect;

    fn tileset() -> Texture {
        // 2×2 tiles of 8×8.
        Texture {
            handle: TextureHandle(3),
            width: 16,
            height: 16,
            format: PixelFormat::Rgba8,
        }
    }

    #[test]
    fn test_fill_wrong_length() {
        let mut layer = TileLayer::new(3, 2, tileset(), 8, 8);
        let err = layer.fill(&[0; 5]).unwrap_err();
        assert!(matches!(err, RenderError::TileCount { expected: 6, got: 5 }));
    }

    #[test]
    fn test_images_skip_empty() {
        let mut layer = TileLayer::new(2, 2, tileset(), 8, 8);
        layer.fill(&[0, -1, 3, -1]).unwrap();
        let images: Vec<Image> = layer.images().collect();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_tile_placement_and_uv() {
        let mut layer = TileLayer::new(2, 1, tileset(), 8, 8);
        layer.x = 100.0;
        layer.fill(&[-1, 3]).unwrap();

        let img = layer.images().next().unwrap();
        assert_eq!((img.x, img.y), (108.0, 0.0));
        assert_eq!(img.uv, UvRect { u0: 0.5, v0: 0.5, u1: 1.0, v1: 1.0 });
    }

    #[test]
    fn test_set_and_get() {
        let mut layer = TileLayer::new(2, 2, tileset(), 8, 8);
        assert!(layer.set(1, 1, 2));
        assert_eq!(layer.get(1, 1), Some(2));
        assert!(!layer.set(2, 0, 1));
        assert_eq!(layer.get(0, 5), None);
    }
}
