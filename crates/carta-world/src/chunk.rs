//! Sectioned chunk storage with an empty fast-path per section.

use carta_palette::MaterialId;

use crate::{CHUNK_SIZE, ChunkCoord, SECTION_SIZE_Y};

/// One vertical slab of a chunk. Linear storage indexed like the rest of
/// the engine: (y * sz + z) * sx + x.
#[derive(Clone, Debug)]
pub struct SectionBuf {
    blocks: Vec<MaterialId>,
}

impl SectionBuf {
    pub fn new() -> Self {
        Self {
            blocks: vec![MaterialId::AIR; CHUNK_SIZE * SECTION_SIZE_Y * CHUNK_SIZE],
        }
    }

    #[inline]
    fn idx(x: usize, y: usize, z: usize) -> usize {
        (y * CHUNK_SIZE + z) * CHUNK_SIZE + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> MaterialId {
        self.blocks[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, m: MaterialId) {
        self.blocks[Self::idx(x, y, z)] = m;
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|m| *m != MaterialId::AIR)
    }
}

impl Default for SectionBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only chunk handle: per-section emptiness plus per-block material
/// lookups at absolute y. `None` sections are the empty fast-skip.
#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    section_min: i32,
    sections: Vec<Option<SectionBuf>>,
}

impl ChunkBuf {
    pub fn new(coord: ChunkCoord, section_min: i32, section_count: usize) -> Self {
        Self {
            coord,
            section_min,
            sections: (0..section_count).map(|_| None).collect(),
        }
    }

    #[inline]
    pub fn section_min(&self) -> i32 {
        self.section_min
    }

    #[inline]
    pub fn section_max(&self) -> i32 {
        self.section_min + self.sections.len() as i32 - 1
    }

    /// Sections outside the stored range read as empty.
    #[inline]
    pub fn section_is_empty(&self, sy: i32) -> bool {
        let idx = sy - self.section_min;
        if idx < 0 || idx as usize >= self.sections.len() {
            return true;
        }
        self.sections[idx as usize].is_none()
    }

    /// Material at local (x, z) and absolute y; air outside the stored
    /// vertical range.
    #[inline]
    pub fn material_at(&self, lx: usize, y: i32, lz: usize) -> MaterialId {
        let sy = y.div_euclid(SECTION_SIZE_Y as i32);
        let idx = sy - self.section_min;
        if idx < 0 || idx as usize >= self.sections.len() {
            return MaterialId::AIR;
        }
        match &self.sections[idx as usize] {
            Some(sec) => sec.get(lx, y.rem_euclid(SECTION_SIZE_Y as i32) as usize, lz),
            None => MaterialId::AIR,
        }
    }

    /// Write used by worldgen and tests; air writes into a missing
    /// section do not materialize it.
    pub fn set_material(&mut self, lx: usize, y: i32, lz: usize, m: MaterialId) {
        let sy = y.div_euclid(SECTION_SIZE_Y as i32);
        let idx = sy - self.section_min;
        if idx < 0 || idx as usize >= self.sections.len() {
            return;
        }
        let slot = &mut self.sections[idx as usize];
        if slot.is_none() {
            if m == MaterialId::AIR {
                return;
            }
            *slot = Some(SectionBuf::new());
        }
        if let Some(sec) = slot {
            sec.set(lx, y.rem_euclid(SECTION_SIZE_Y as i32) as usize, lz, m);
        }
    }

    pub fn is_all_air(&self) -> bool {
        self.sections.iter().all(|s| s.is_none())
    }

    /// Drops sections that hold only air, restoring the fast-skip flag
    /// after bulk writes.
    pub fn compact(&mut self) {
        for slot in &mut self.sections {
            if let Some(sec) = slot {
                if !sec.has_non_air() {
                    *slot = None;
                }
            }
        }
    }
}
