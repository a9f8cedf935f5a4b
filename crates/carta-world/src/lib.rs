//! World data model and chunk-source collaborators for the map renderer.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod mem;
pub mod source;
pub mod worldgen;

pub use chunk::{ChunkBuf, SectionBuf};
pub use worldgen::NoiseWorld;
pub use mem::MemoryWorld;
pub use source::{ChunkSource, GenTicket};

/// Horizontal edge length of a chunk, in columns.
pub const CHUNK_SIZE: usize = 16;
/// Vertical extent of one section (sub-chunk), in blocks.
pub const SECTION_SIZE_Y: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    /// World-space x of this chunk's first column.
    #[inline]
    pub fn base_x(self) -> i32 {
        self.cx * CHUNK_SIZE as i32
    }

    #[inline]
    pub fn base_z(self) -> i32 {
        self.cz * CHUNK_SIZE as i32
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Inclusive chunk-coordinate rectangle to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x1: i32,
    pub z1: i32,
    pub x2: i32,
    pub z2: i32,
}

impl Region {
    pub fn new(x1: i32, z1: i32, x2: i32, z2: i32) -> Result<Self, MapError> {
        if x1 > x2 || z1 > z2 {
            return Err(MapError::InvalidRegion(
                "region max corner must not be less than min corner",
            ));
        }
        Ok(Self { x1, z1, x2, z2 })
    }

    #[inline]
    pub fn width_chunks(&self) -> usize {
        (1 + self.x2 - self.x1) as usize
    }

    #[inline]
    pub fn height_chunks(&self) -> usize {
        (1 + self.z2 - self.z1) as usize
    }

    /// Output raster width in pixels (one pixel per column).
    #[inline]
    pub fn width_px(&self) -> usize {
        self.width_chunks() * CHUNK_SIZE
    }

    #[inline]
    pub fn height_px(&self) -> usize {
        self.height_chunks() * CHUNK_SIZE
    }

    #[inline]
    pub fn origin(&self) -> ChunkCoord {
        ChunkCoord::new(self.x1, self.z1)
    }
}

#[derive(Debug)]
pub enum MapError {
    InvalidRegion(&'static str),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::InvalidRegion(msg) => write!(f, "invalid region: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_rejects_inverted_corners() {
        assert!(Region::new(1, 0, 0, 0).is_err());
        assert!(Region::new(0, 1, 0, 0).is_err());
        assert!(Region::new(0, 0, 0, 0).is_ok());
        assert!(Region::new(-3, -2, 4, 7).is_ok());
    }

    #[test]
    fn region_pixel_dimensions() {
        let r = Region::new(-1, -1, 1, 0).unwrap();
        assert_eq!(r.width_chunks(), 3);
        assert_eq!(r.height_chunks(), 2);
        assert_eq!(r.width_px(), 3 * CHUNK_SIZE);
        assert_eq!(r.height_px(), 2 * CHUNK_SIZE);
    }
}
