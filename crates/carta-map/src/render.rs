//! Renderer surface: configuration, drivers, and the public operations.

use std::collections::VecDeque;
use std::sync::Arc;

use carta_palette::ColorPalette;
use carta_world::{CHUNK_SIZE, ChunkBuf, ChunkSource, MapError, Region};

use crate::column::{ChunkColors, ResolvedLayer, chunk_colors};
use crate::image::MapImage;
use crate::scan::{Pump, RegionScan};
use crate::shade::ElevationShader;

/// Per-tick cap that can be switched off entirely. `Disabled` means the
/// operation is never attempted, not a cap of zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimit {
    Disabled,
    PerTick(u32),
}

impl RateLimit {
    #[inline]
    pub fn enabled(self) -> bool {
        !matches!(self, RateLimit::Disabled)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RenderConfig {
    /// Cap on chunks processed between suspensions; always enforced.
    pub chunks_per_tick: u32,
    /// Cap on on-demand loads; `Disabled` reads resident chunks only.
    pub chunk_loads: RateLimit,
    /// Cap on on-demand generations; `Disabled` never generates.
    pub chunk_gens: RateLimit,
    /// Inclusive vertical scan bounds, in section indices.
    pub min_section: i32,
    pub max_section: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chunks_per_tick: 4,
            chunk_loads: RateLimit::PerTick(2),
            chunk_gens: RateLimit::PerTick(1),
            min_section: -4,
            max_section: 19,
        }
    }
}

/// The host's tick suspension primitive: returns once exactly one tick
/// has elapsed.
pub trait TickScheduler {
    fn yield_tick(&mut self);
}

/// Ticker that never waits; for tests and offline rendering.
#[derive(Default)]
pub struct ImmediateTicker;

impl TickScheduler for ImmediateTicker {
    fn yield_tick(&mut self) {}
}

/// Top-down renderer. Holds only immutable configuration and a shared
/// palette, so one instance serves concurrent render calls; every call
/// owns its own elevation map, counters, and raster.
pub struct MapRenderer {
    cfg: RenderConfig,
    palette: Arc<ColorPalette>,
}

impl MapRenderer {
    pub fn new(cfg: RenderConfig, palette: Arc<ColorPalette>) -> Self {
        Self { cfg, palette }
    }

    pub fn palette(&self) -> &Arc<ColorPalette> {
        &self.palette
    }

    /// Single-chunk column resolution stream, chunk-local coordinates.
    pub fn colors<'a>(&'a self, chunk: &'a ChunkBuf) -> ChunkColors<'a> {
        chunk_colors(chunk, &self.palette, self.cfg.min_section, self.cfg.max_section)
    }

    /// Starts a cooperative render; the host pumps the returned task
    /// once per tick. Region corners are validated before any world
    /// access.
    pub fn begin_render(
        &self,
        x1: i32,
        z1: i32,
        x2: i32,
        z2: i32,
    ) -> Result<RenderTask, MapError> {
        let region = Region::new(x1, z1, x2, z2)?;
        log::debug!(
            "map render: chunks ({}, {})..({}, {}), {}x{} px",
            region.x1,
            region.z1,
            region.x2,
            region.z2,
            region.width_px(),
            region.height_px()
        );
        Ok(RenderTask {
            scan: RegionScan::new(&self.cfg, region),
            shader: ElevationShader::new(),
            image: MapImage::new(
                region.width_px(),
                region.height_px(),
                self.palette.fallback(),
            ),
            palette: Arc::clone(&self.palette),
            origin_x: region.x1 * CHUNK_SIZE as i32,
            origin_z: region.z1 * CHUNK_SIZE as i32,
            min_section: self.cfg.min_section,
            max_section: self.cfg.max_section,
        })
    }

    /// Blocking driver over `begin_render`: suspends through `ticker`
    /// when throttled and blocks on pending generation. The result is
    /// partial if the world became unavailable mid-scan.
    pub fn render<W: ChunkSource + ?Sized>(
        &self,
        world: &W,
        ticker: &mut dyn TickScheduler,
        x1: i32,
        z1: i32,
        x2: i32,
        z2: i32,
    ) -> Result<MapImage, MapError> {
        let mut task = self.begin_render(x1, z1, x2, z2)?;
        loop {
            match task.pump(world) {
                TaskStatus::AwaitTick => ticker.yield_tick(),
                TaskStatus::AwaitGeneration => task.wait_generation(),
                TaskStatus::Finished => return Ok(task.finish()),
            }
        }
    }

    /// Lazy resolve-only stream: no shading, no compositing. Layer x/z
    /// are relative to the region origin, y is absolute.
    pub fn read<'w, W, T>(
        &self,
        world: &'w W,
        ticker: T,
        x1: i32,
        z1: i32,
        x2: i32,
        z2: i32,
    ) -> Result<ReadScan<'w, W, T>, MapError>
    where
        W: ChunkSource + ?Sized,
        T: TickScheduler,
    {
        let region = Region::new(x1, z1, x2, z2)?;
        Ok(ReadScan {
            scan: RegionScan::new(&self.cfg, region),
            world,
            ticker,
            palette: Arc::clone(&self.palette),
            origin_x: region.x1 * CHUNK_SIZE as i32,
            origin_z: region.z1 * CHUNK_SIZE as i32,
            min_section: self.cfg.min_section,
            max_section: self.cfg.max_section,
            buffered: VecDeque::new(),
            done: false,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Throughput limit tripped; pump again one tick later.
    AwaitTick,
    /// Generation in flight; pump again later or call
    /// `wait_generation`.
    AwaitGeneration,
    Finished,
}

/// One in-flight render: scan state, elevation map, and the raster being
/// composited. Dropping it abandons the render; nothing needs explicit
/// release.
pub struct RenderTask {
    scan: RegionScan,
    shader: ElevationShader,
    image: MapImage,
    palette: Arc<ColorPalette>,
    origin_x: i32,
    origin_z: i32,
    min_section: i32,
    max_section: i32,
}

impl RenderTask {
    pub fn pump<W: ChunkSource + ?Sized>(&mut self, world: &W) -> TaskStatus {
        let Self {
            scan,
            shader,
            image,
            palette,
            origin_x,
            origin_z,
            min_section,
            max_section,
        } = self;
        let palette = &**palette;
        let pump = scan.pump(world, &mut |chunk: &ChunkBuf| {
            let base_x = chunk.coord.base_x() - *origin_x;
            let base_z = chunk.coord.base_z() - *origin_z;
            for layer in chunk_colors(chunk, palette, *min_section, *max_section) {
                let px = base_x + layer.x;
                let pz = base_z + layer.z;
                let rgba = palette.rgba(layer.color);
                let out = if rgba.is_opaque() {
                    shader.shade_terminal(px, pz, layer.y, rgba)
                } else {
                    rgba
                };
                image.blend_pixel(px as usize, pz as usize, out);
            }
        });
        match pump {
            Pump::Yielded => TaskStatus::AwaitTick,
            Pump::Pending => TaskStatus::AwaitGeneration,
            Pump::Finished => TaskStatus::Finished,
        }
    }

    /// Blocks until the pending generation completes.
    pub fn wait_generation(&mut self) {
        self.scan.wait_generation();
    }

    pub fn finish(self) -> MapImage {
        self.image
    }
}

/// Iterator form of the scan used by `MapRenderer::read`. Suspension is
/// internal: throttle points call the ticker, pending generation blocks.
pub struct ReadScan<'w, W: ?Sized, T> {
    scan: RegionScan,
    world: &'w W,
    ticker: T,
    palette: Arc<ColorPalette>,
    origin_x: i32,
    origin_z: i32,
    min_section: i32,
    max_section: i32,
    buffered: VecDeque<ResolvedLayer>,
    done: bool,
}

impl<W, T> Iterator for ReadScan<'_, W, T>
where
    W: ChunkSource + ?Sized,
    T: TickScheduler,
{
    type Item = ResolvedLayer;

    fn next(&mut self) -> Option<ResolvedLayer> {
        loop {
            if let Some(layer) = self.buffered.pop_front() {
                return Some(layer);
            }
            if self.done {
                return None;
            }
            let Self {
                scan,
                world,
                palette,
                origin_x,
                origin_z,
                min_section,
                max_section,
                buffered,
                ..
            } = self;
            let palette = &**palette;
            let pump = scan.pump(*world, &mut |chunk: &ChunkBuf| {
                let base_x = chunk.coord.base_x() - *origin_x;
                let base_z = chunk.coord.base_z() - *origin_z;
                for layer in chunk_colors(chunk, palette, *min_section, *max_section) {
                    buffered.push_back(ResolvedLayer {
                        x: base_x + layer.x,
                        y: layer.y,
                        z: base_z + layer.z,
                        color: layer.color,
                    });
                }
            });
            match pump {
                Pump::Yielded => self.ticker.yield_tick(),
                Pump::Pending => self.scan.wait_generation(),
                Pump::Finished => self.done = true,
            }
        }
    }
}
