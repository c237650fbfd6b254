//! Property-based tests for terrain generation and edit records.

use blockworld_core::{BlockKind, ChunkPos, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};
use blockworld_world::{EditRecord, NoNeighbors, NoiseConfig, PerlinHeight, TerrainGenerator};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Property: the same seed and coordinate always produce the same grid.
    #[test]
    fn terrain_is_deterministic(
        world_seed in any::<u64>(),
        chunk_x in -64i32..64,
        chunk_z in -64i32..64,
    ) {
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let first_noise = PerlinHeight::new(world_seed, NoiseConfig::default());
        let second_noise = PerlinHeight::new(world_seed, NoiseConfig::default());
        let a = TerrainGenerator::new(world_seed, 64.0, &first_noise).generate(pos, &NoNeighbors);
        let b = TerrainGenerator::new(world_seed, 64.0, &second_noise).generate(pos, &NoNeighbors);
        prop_assert_eq!(&a.blocks, &b.blocks);
        prop_assert_eq!(&a.spills, &b.spills);
        prop_assert!(a.blocks.iter().any(|k| !k.is_air()));
    }

    /// Property: every well-formed record unpacks to what was written.
    #[test]
    fn edit_records_pack_losslessly(
        x in 0..CHUNK_SIZE,
        y in 0..CHUNK_HEIGHT,
        z in 0..CHUNK_SIZE,
        id in 0u8..BlockKind::COUNT as u8,
    ) {
        let kind = BlockKind::from_u8(id).unwrap();
        let record = EditRecord { local: LocalPos::new(x, y, z), kind };
        prop_assert_eq!(EditRecord::from_bytes(record.to_bytes()), Ok(record));
    }

    /// Property: unknown block ids are rejected, never panicking.
    #[test]
    fn unknown_ids_are_rejected(id in BlockKind::COUNT as u8..=u8::MAX) {
        prop_assert_eq!(EditRecord::from_bytes([0, 0, id]), Err(id));
    }
}
