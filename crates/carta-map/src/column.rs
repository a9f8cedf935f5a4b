//! Per-chunk column resolution into visible layer stacks.

use carta_palette::{ColorId, ColorPalette};
use carta_world::{CHUNK_SIZE, ChunkBuf, SECTION_SIZE_Y};

/// Externally fixed tuning constant: a column stops accumulating after
/// this many translucent layers even without an opaque terminal. Levels
/// below the cut-off are never inspected, so deep translucent stacks are
/// approximated rather than rendered completely.
pub const MAX_STACK_DEPTH: usize = 15;

/// One visible layer of a column. `x`/`z` are chunk-local for
/// `chunk_colors` and region-relative for `MapRenderer::read`; `y` is
/// always absolute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLayer {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub color: ColorId,
}

/// Lazy layer stream for one chunk. Columns are visited in raster order
/// (local x outer, local z inner, both ascending) and each column's
/// layers come out bottom-to-top; the elevation shader depends on
/// exactly this order.
pub struct ChunkColors<'a> {
    chunk: &'a ChunkBuf,
    palette: &'a ColorPalette,
    min_section: i32,
    max_section: i32,
    lx: usize,
    lz: usize,
    cur_x: i32,
    cur_z: i32,
    // Discovery order is top-to-bottom, so popping emits bottom-to-top.
    stack: Vec<(i32, ColorId)>,
}

pub fn chunk_colors<'a>(
    chunk: &'a ChunkBuf,
    palette: &'a ColorPalette,
    min_section: i32,
    max_section: i32,
) -> ChunkColors<'a> {
    ChunkColors {
        chunk,
        palette,
        min_section,
        max_section,
        lx: 0,
        lz: 0,
        cur_x: 0,
        cur_z: 0,
        stack: Vec::with_capacity(MAX_STACK_DEPTH),
    }
}

impl ChunkColors<'_> {
    /// Scans one column top to bottom. Stops at the first fully opaque
    /// color (terminal layer) or at the depth bound, whichever first.
    fn resolve_column(&mut self, lx: usize, lz: usize) {
        debug_assert!(self.stack.is_empty());
        'column: for sy in (self.min_section..=self.max_section).rev() {
            if self.chunk.section_is_empty(sy) {
                continue;
            }
            let bottom = sy * SECTION_SIZE_Y as i32;
            for y in (bottom..bottom + SECTION_SIZE_Y as i32).rev() {
                let material = self.chunk.material_at(lx, y, lz);
                let Some(color) = self.palette.color_of(material) else {
                    // Unmapped material reads as transparent air.
                    continue;
                };
                self.stack.push((y, color));
                if self.palette.is_opaque(color) {
                    break 'column;
                }
                if self.stack.len() >= MAX_STACK_DEPTH {
                    break 'column;
                }
            }
        }
    }
}

impl Iterator for ChunkColors<'_> {
    type Item = ResolvedLayer;

    fn next(&mut self) -> Option<ResolvedLayer> {
        loop {
            if let Some((y, color)) = self.stack.pop() {
                return Some(ResolvedLayer {
                    x: self.cur_x,
                    y,
                    z: self.cur_z,
                    color,
                });
            }
            if self.lx >= CHUNK_SIZE {
                return None;
            }
            let (lx, lz) = (self.lx, self.lz);
            self.cur_x = lx as i32;
            self.cur_z = lz as i32;
            self.lz += 1;
            if self.lz >= CHUNK_SIZE {
                self.lz = 0;
                self.lx += 1;
            }
            self.resolve_column(lx, lz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carta_palette::{MaterialId, materials};
    use carta_world::ChunkCoord;
    use std::sync::Arc;

    fn flat_chunk(material: MaterialId, top_y: i32) -> ChunkBuf {
        let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0), 0, 8);
        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                for y in 0..=top_y {
                    buf.set_material(lx, y, lz, material);
                }
            }
        }
        buf
    }

    #[test]
    fn opaque_terminal_yields_one_layer_per_column() {
        let palette = Arc::new(ColorPalette::builtin());
        let chunk = flat_chunk(materials::STONE, 20);
        let layers: Vec<_> = chunk_colors(&chunk, &palette, 0, 7).collect();
        assert_eq!(layers.len(), CHUNK_SIZE * CHUNK_SIZE);
        for layer in &layers {
            assert_eq!(layer.y, 20);
        }
    }

    #[test]
    fn translucent_stack_is_capped_at_depth_bound() {
        let palette = Arc::new(ColorPalette::builtin());
        let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0), 0, 8);
        // 30 water levels, no opaque floor anywhere.
        for y in 0..30 {
            buf.set_material(3, y, 5, materials::WATER);
        }
        let layers: Vec<_> = chunk_colors(&buf, &palette, 0, 7)
            .filter(|l| l.x == 3 && l.z == 5)
            .collect();
        assert_eq!(layers.len(), MAX_STACK_DEPTH);
        // Topmost 15 levels only, emitted bottom-to-top.
        assert_eq!(layers.first().unwrap().y, 30 - MAX_STACK_DEPTH as i32);
        assert_eq!(layers.last().unwrap().y, 29);
    }

    #[test]
    fn translucent_layers_emit_bottom_to_top_over_terminal() {
        let palette = Arc::new(ColorPalette::builtin());
        let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0), 0, 8);
        buf.set_material(0, 10, 0, materials::STONE);
        buf.set_material(0, 11, 0, materials::WATER);
        buf.set_material(0, 12, 0, materials::WATER);
        let layers: Vec<_> = chunk_colors(&buf, &palette, 0, 7).take(3).collect();
        let ys: Vec<_> = layers.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![10, 11, 12]);
        assert!(palette.is_opaque(layers[0].color));
    }

    #[test]
    fn empty_sections_are_skipped() {
        let palette = Arc::new(ColorPalette::builtin());
        let buf = ChunkBuf::new(ChunkCoord::new(0, 0), 0, 8);
        assert_eq!(chunk_colors(&buf, &palette, 0, 7).count(), 0);
    }
}
