//! Noise height-field demo world.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use carta_palette::{MaterialId, materials};
use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::source::{ChunkSource, GenTicket};
use crate::{CHUNK_SIZE, ChunkBuf, ChunkCoord, SECTION_SIZE_Y};

const WORLD_HEIGHT: i32 = 128;
const WATER_LEVEL: i32 = 44;
const SNOW_LINE: i32 = 96;

/// Self-contained `ChunkSource` backed by OpenSimplex terrain. `load` is
/// generation done inline; `request_generation` runs on a spawned thread
/// so the renderer's pending path is exercised for real.
pub struct NoiseWorld {
    seed: i32,
    samplers: Samplers,
    resident: Mutex<HashMap<ChunkCoord, Arc<ChunkBuf>>>,
}

struct Samplers {
    terrain: FastNoiseLite,
    detail: FastNoiseLite,
}

impl Samplers {
    fn new(seed: i32) -> Self {
        let mut terrain = FastNoiseLite::with_seed(seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(0.004));
        let mut detail = FastNoiseLite::with_seed(seed ^ 54_321);
        detail.set_noise_type(Some(NoiseType::OpenSimplex2));
        detail.set_frequency(Some(0.03));
        Self { terrain, detail }
    }

    fn height_at(&self, wx: i32, wz: i32) -> i32 {
        let broad = self.terrain.get_noise_2d(wx as f32, wz as f32);
        let fine = self.detail.get_noise_2d(wx as f32, wz as f32);
        let h = (broad * 0.85 + fine * 0.15 + 1.0) * 0.5;
        (h * (WORLD_HEIGHT - 2) as f32) as i32
    }
}

impl NoiseWorld {
    pub fn new(seed: i32) -> Arc<Self> {
        Arc::new(Self {
            seed,
            samplers: Samplers::new(seed),
            resident: Mutex::new(HashMap::new()),
        })
    }

    /// Valid vertical scan bounds for this world, in section indices.
    pub fn section_range(&self) -> (i32, i32) {
        (0, WORLD_HEIGHT / SECTION_SIZE_Y as i32 - 1)
    }

    fn generate_cached(&self, coord: ChunkCoord) -> Arc<ChunkBuf> {
        if let Some(chunk) = self.resident(coord) {
            return chunk;
        }
        let chunk = Arc::new(generate_chunk(&self.samplers, coord));
        self.resident
            .lock()
            .expect("resident cache lock")
            .insert(coord, Arc::clone(&chunk));
        chunk
    }
}

fn generate_chunk(samplers: &Samplers, coord: ChunkCoord) -> ChunkBuf {
    let section_count = (WORLD_HEIGHT as usize).div_ceil(SECTION_SIZE_Y);
    let mut buf = ChunkBuf::new(coord, 0, section_count);
    let base_x = coord.base_x();
    let base_z = coord.base_z();
    for lx in 0..CHUNK_SIZE {
        for lz in 0..CHUNK_SIZE {
            let wx = base_x + lx as i32;
            let wz = base_z + lz as i32;
            let h = samplers.height_at(wx, wz).clamp(1, WORLD_HEIGHT - 1);
            buf.set_material(lx, h, lz, surface_material(h));
            for y in (h - 3).max(0)..h {
                buf.set_material(lx, y, lz, materials::DIRT);
            }
            for y in 0..(h - 3).max(0) {
                buf.set_material(lx, y, lz, materials::STONE);
            }
            for y in (h + 1)..=WATER_LEVEL {
                buf.set_material(lx, y, lz, materials::WATER);
            }
        }
    }
    buf
}

fn surface_material(h: i32) -> MaterialId {
    if h <= WATER_LEVEL + 1 {
        materials::SAND
    } else if h >= SNOW_LINE {
        materials::SNOW
    } else {
        materials::GRASS
    }
}

impl ChunkSource for NoiseWorld {
    fn is_loaded(&self) -> bool {
        true
    }

    fn resident(&self, coord: ChunkCoord) -> Option<Arc<ChunkBuf>> {
        self.resident
            .lock()
            .expect("resident cache lock")
            .get(&coord)
            .cloned()
    }

    fn load(&self, coord: ChunkCoord) -> Option<Arc<ChunkBuf>> {
        Some(self.generate_cached(coord))
    }

    fn request_generation(&self, coord: ChunkCoord) -> GenTicket {
        let (tx, rx) = crossbeam_channel::bounded(1);
        // The worker rebuilds its samplers from the seed; noise state is
        // cheap and this keeps the resident lock off the worker thread.
        let seed = self.seed;
        thread::spawn(move || {
            let samplers = Samplers::new(seed);
            let _ = tx.send(Some(Arc::new(generate_chunk(&samplers, coord))));
        });
        GenTicket::from_receiver(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_is_deterministic_per_seed() {
        let a = NoiseWorld::new(7);
        let b = NoiseWorld::new(7);
        let coord = ChunkCoord::new(2, -3);
        let ca = a.load(coord).unwrap();
        let cb = b.load(coord).unwrap();
        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                for y in 0..WORLD_HEIGHT {
                    assert_eq!(ca.material_at(lx, y, lz), cb.material_at(lx, y, lz));
                }
            }
        }
    }

    #[test]
    fn every_column_has_ground() {
        let w = NoiseWorld::new(1);
        let chunk = w.load(ChunkCoord::new(0, 0)).unwrap();
        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let any = (0..WORLD_HEIGHT).any(|y| chunk.material_at(lx, y, lz) != MaterialId::AIR);
                assert!(any, "empty column at ({lx}, {lz})");
            }
        }
    }

    #[test]
    fn generation_ticket_completes() {
        let w = NoiseWorld::new(3);
        let ticket = w.request_generation(ChunkCoord::new(1, 1));
        assert!(ticket.wait().is_some());
    }
}
