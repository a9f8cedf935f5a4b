//! Top-down map rendering core: column resolution, relief shading,
//! compositing, and the cooperative region scan.
#![forbid(unsafe_code)]

pub mod column;
pub mod image;
pub mod render;
pub mod scan;
pub mod shade;

pub use carta_world::{MapError, Region};
pub use column::{ChunkColors, MAX_STACK_DEPTH, ResolvedLayer, chunk_colors};
pub use image::MapImage;
pub use render::{
    ImmediateTicker, MapRenderer, RateLimit, ReadScan, RenderConfig, RenderTask, TaskStatus,
    TickScheduler,
};
pub use scan::{Pump, RegionScan};
pub use shade::{ElevationShader, relief_modifier};
