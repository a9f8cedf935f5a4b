//! Elevation-relief shading for terminal layers.

use carta_palette::Rgba;
use hashbrown::HashMap;

// Externally fixed tuning constants; preserved verbatim, no derivation.
pub const SHADE_DEEP: f32 = 0.5294;
pub const SHADE_PARTIAL: f32 = 0.7058;
pub const SHADE_LIGHT: f32 = 0.8627;

/// Brightness modifier for a column at elevation `y` given its north
/// (same x, z-1) and northwest (x-1, z-1) neighbor elevations:
/// both strictly taller → deep shadow; only north strictly taller →
/// partial; otherwise either at-or-above → light; local high point →
/// none.
#[inline]
pub fn relief_modifier(y: i32, north: i32, northwest: i32) -> Option<f32> {
    if north > y && northwest > y {
        Some(SHADE_DEEP)
    } else if north > y {
        Some(SHADE_PARTIAL)
    } else if north >= y || northwest >= y {
        Some(SHADE_LIGHT)
    } else {
        None
    }
}

/// Sparse elevation map fed by the scan, in scan order. Only terminal
/// (fully opaque) layers are recorded or shaded; one instance lives for
/// exactly one render call.
#[derive(Default)]
pub struct ElevationShader {
    elevation: HashMap<(i32, i32), i32>,
}

impl ElevationShader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the terminal layer at (x, z) and returns its shaded
    /// color. Columns missing either neighbor's recorded elevation (the
    /// region edge, or neighbors that never produced a terminal layer)
    /// pass through unshaded.
    pub fn shade_terminal(&mut self, x: i32, z: i32, y: i32, color: Rgba) -> Rgba {
        self.elevation.insert((x, z), y);
        let (Some(&north), Some(&northwest)) = (
            self.elevation.get(&(x, z - 1)),
            self.elevation.get(&(x - 1, z - 1)),
        ) else {
            return color;
        };
        match relief_modifier(y, north, northwest) {
            Some(m) => Rgba::new(
                (color.r as f32 * m) as u8,
                (color.g as f32 * m) as u8,
                (color.b as f32 * m) as u8,
                color.a,
            ),
            None => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_table_four_way() {
        assert_eq!(relief_modifier(5, 6, 6), Some(SHADE_DEEP));
        assert_eq!(relief_modifier(5, 6, 5), Some(SHADE_PARTIAL));
        assert_eq!(relief_modifier(5, 6, 4), Some(SHADE_PARTIAL));
        assert_eq!(relief_modifier(5, 5, 6), Some(SHADE_LIGHT));
        assert_eq!(relief_modifier(5, 5, 5), Some(SHADE_LIGHT));
        assert_eq!(relief_modifier(5, 4, 6), Some(SHADE_LIGHT));
        assert_eq!(relief_modifier(5, 5, 4), Some(SHADE_LIGHT));
        assert_eq!(relief_modifier(5, 4, 4), None);
    }

    #[test]
    fn missing_neighbors_skip_shading() {
        let mut shader = ElevationShader::new();
        let c = Rgba::new(100, 150, 200, 255);
        // First column of the scan has no recorded neighbors.
        assert_eq!(shader.shade_terminal(0, 0, 10, c), c);
        // North exists, northwest does not.
        assert_eq!(shader.shade_terminal(0, 1, 5, c), c);
    }

    #[test]
    fn channels_scale_with_integer_truncation() {
        let mut shader = ElevationShader::new();
        shader.shade_terminal(3, 2, 20, Rgba::new(0, 0, 0, 255)); // north
        shader.shade_terminal(2, 2, 20, Rgba::new(0, 0, 0, 255)); // northwest
        let shaded = shader.shade_terminal(3, 3, 10, Rgba::new(101, 51, 255, 255));
        assert_eq!(
            shaded,
            Rgba::new(
                (101.0 * SHADE_DEEP) as u8,
                (51.0 * SHADE_DEEP) as u8,
                (255.0 * SHADE_DEEP) as u8,
                255
            )
        );
    }
}
