//! Map color palette: material state ids to color indices to RGBA.
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Block-state identifier as reported by the host chunk handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u16);

impl MaterialId {
    pub const AIR: MaterialId = MaterialId(0);
}

/// Index into a palette's color table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorId(pub u8);

/// One palette color. `a` is an 8-bit opacity where 255 means fully
/// opaque; anything else is translucent (0 = fully transparent).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

/// Immutable material-to-color lookup. Safe to share across concurrent
/// render calls behind an `Arc`.
#[derive(Clone, Debug)]
pub struct ColorPalette {
    colors: Vec<Rgba>,
    names: Vec<String>,
    by_material: HashMap<MaterialId, ColorId>,
    fallback: Rgba,
}

impl ColorPalette {
    /// Color index for a material, or `None` when the material is not
    /// represented on the map (scanned past as transparent air).
    #[inline]
    pub fn color_of(&self, material: MaterialId) -> Option<ColorId> {
        self.by_material.get(&material).copied()
    }

    /// RGBA for a color index; out-of-range indices resolve to the
    /// fallback quadruple.
    #[inline]
    pub fn rgba(&self, color: ColorId) -> Rgba {
        self.colors
            .get(color.0 as usize)
            .copied()
            .unwrap_or(self.fallback)
    }

    #[inline]
    pub fn fallback(&self) -> Rgba {
        self.fallback
    }

    #[inline]
    pub fn is_opaque(&self, color: ColorId) -> bool {
        self.rgba(color).is_opaque()
    }

    pub fn color_id_by_name(&self, name: &str) -> Option<ColorId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| ColorId(i as u8))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Palette shipped with the crate; covers the demo worldgen materials.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_TOML).expect("built-in palette parses")
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: PaletteConfig = toml::from_str(toml_str)?;
        if cfg.color.len() > 256 {
            return Err(format!("palette has {} colors; max is 256", cfg.color.len()).into());
        }
        let mut colors = Vec::with_capacity(cfg.color.len());
        let mut names = Vec::with_capacity(cfg.color.len());
        let mut by_material = HashMap::new();
        // Array order in the document defines ColorId assignment, so ids
        // stay stable across loads.
        for (i, entry) in cfg.color.into_iter().enumerate() {
            let id = ColorId(i as u8);
            for state in &entry.materials {
                by_material.insert(MaterialId(*state), id);
            }
            colors.push(Rgba::new(
                entry.rgb[0],
                entry.rgb[1],
                entry.rgb[2],
                entry.opacity,
            ));
            names.push(entry.name);
        }
        let fallback = Rgba::new(
            cfg.fallback.rgb[0],
            cfg.fallback.rgb[1],
            cfg.fallback.rgb[2],
            cfg.fallback.opacity,
        );
        Ok(Self {
            colors,
            names,
            by_material,
            fallback,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

static BUILTIN_TOML: &str = include_str!("builtin.toml");

/// State ids used by the built-in palette and the demo worldgen.
pub mod materials {
    use super::MaterialId;

    pub const STONE: MaterialId = MaterialId(1);
    pub const DIRT: MaterialId = MaterialId(2);
    pub const GRASS: MaterialId = MaterialId(3);
    pub const SAND: MaterialId = MaterialId(4);
    pub const GRAVEL: MaterialId = MaterialId(5);
    pub const SNOW: MaterialId = MaterialId(6);
    pub const WATER: MaterialId = MaterialId(7);
    pub const ICE: MaterialId = MaterialId(8);
    pub const WOOD: MaterialId = MaterialId(9);
    pub const FOLIAGE: MaterialId = MaterialId(10);
    pub const GLASS: MaterialId = MaterialId(11);
    pub const CLAY: MaterialId = MaterialId(12);
}

// --- Config ---

#[derive(Deserialize)]
struct PaletteConfig {
    fallback: FallbackEntry,
    #[serde(default)]
    color: Vec<ColorEntry>,
}

#[derive(Deserialize)]
struct FallbackEntry {
    rgb: [u8; 3],
    opacity: u8,
}

#[derive(Deserialize)]
struct ColorEntry {
    name: String,
    rgb: [u8; 3],
    opacity: u8,
    /// Block-state ids this color represents.
    #[serde(default)]
    materials: Vec<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_demo_materials() {
        let p = ColorPalette::builtin();
        for m in [
            materials::STONE,
            materials::DIRT,
            materials::GRASS,
            materials::SAND,
            materials::SNOW,
            materials::WATER,
        ] {
            assert!(p.color_of(m).is_some(), "missing mapping for {m:?}");
        }
        assert!(p.color_of(MaterialId::AIR).is_none());
    }

    #[test]
    fn builtin_water_is_translucent() {
        let p = ColorPalette::builtin();
        let water = p.color_of(materials::WATER).unwrap();
        assert!(!p.is_opaque(water));
        let stone = p.color_of(materials::STONE).unwrap();
        assert!(p.is_opaque(stone));
    }

    #[test]
    fn out_of_range_index_resolves_to_fallback() {
        let p = ColorPalette::builtin();
        assert_eq!(p.rgba(ColorId(255)), p.fallback());
    }

    #[test]
    fn rejects_oversized_tables() {
        let mut doc = String::from("[fallback]\nrgb = [0, 0, 0]\nopacity = 0\n");
        for i in 0..257 {
            doc.push_str(&format!(
                "[[color]]\nname = \"c{i}\"\nrgb = [1, 2, 3]\nopacity = 255\nmaterials = []\n"
            ));
        }
        assert!(ColorPalette::from_toml_str(&doc).is_err());
    }
}
