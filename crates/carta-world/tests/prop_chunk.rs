use carta_palette::MaterialId;
use carta_world::{CHUNK_SIZE, ChunkBuf, ChunkCoord, SECTION_SIZE_Y};
use proptest::prelude::*;

fn local() -> impl Strategy<Value = usize> {
    0usize..CHUNK_SIZE
}

fn small_i32() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

proptest! {
    // set_material/material_at round-trip within the stored range
    #[test]
    fn material_round_trip(
        cx in small_i32(), cz in small_i32(),
        section_min in -8i32..=8, section_count in 1usize..=8,
        lx in local(), lz in local(),
        dy in 0i32..=127, m in 1u16..=4096,
    ) {
        let mut buf = ChunkBuf::new(ChunkCoord::new(cx, cz), section_min, section_count);
        let y_min = section_min * SECTION_SIZE_Y as i32;
        let y = y_min + dy % (section_count as i32 * SECTION_SIZE_Y as i32);
        buf.set_material(lx, y, lz, MaterialId(m));
        prop_assert_eq!(buf.material_at(lx, y, lz), MaterialId(m));
        // The touched section is no longer flagged empty.
        prop_assert!(!buf.section_is_empty(y.div_euclid(SECTION_SIZE_Y as i32)));
    }

    // Lookups outside the stored vertical range read as air and empty
    #[test]
    fn out_of_range_reads_air(
        section_min in -8i32..=8, section_count in 1usize..=8,
        lx in local(), lz in local(),
    ) {
        let buf = ChunkBuf::new(ChunkCoord::new(0, 0), section_min, section_count);
        let below = section_min * SECTION_SIZE_Y as i32 - 1;
        let above = (section_min + section_count as i32) * SECTION_SIZE_Y as i32;
        prop_assert_eq!(buf.material_at(lx, below, lz), MaterialId::AIR);
        prop_assert_eq!(buf.material_at(lx, above, lz), MaterialId::AIR);
        prop_assert!(buf.section_is_empty(section_min - 1));
        prop_assert!(buf.section_is_empty(section_min + section_count as i32));
    }

    // Air writes never materialize a section; compact drops emptied ones
    #[test]
    fn empty_sections_stay_skippable(
        section_min in -4i32..=4, lx in local(), lz in local(), dy in 0i32..=15,
    ) {
        let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0), section_min, 2);
        let y = section_min * SECTION_SIZE_Y as i32 + dy;
        buf.set_material(lx, y, lz, MaterialId::AIR);
        prop_assert!(buf.section_is_empty(section_min));
        prop_assert!(buf.is_all_air());

        buf.set_material(lx, y, lz, MaterialId(9));
        prop_assert!(!buf.section_is_empty(section_min));
        buf.set_material(lx, y, lz, MaterialId::AIR);
        buf.compact();
        prop_assert!(buf.section_is_empty(section_min));
    }
}
