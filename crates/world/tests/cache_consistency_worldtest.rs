//! Cache consistency worldtest
//!
//! After a Perlin world settles, the center chunk's face cache matches its
//! grid exactly: one entry per non-air block with a visible face, whose face
//! mask agrees with the visibility rule.

use blockworld_assets::BlockModelCatalog;
use blockworld_core::{BlockPos, ChunkPos, Direction, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};
use blockworld_testkit::temp_dir;
use blockworld_world::{face_visible_toward, FrameInput, World, WorldConfig};
use glam::{Mat4, Vec3};

#[test]
fn cache_consistency_worldtest() {
    let tmp = temp_dir("cache-consistency").unwrap();
    let dir = tmp.path();
    let config = WorldConfig {
        seed: 2024,
        render_distance: 1,
        save_dir: dir.to_path_buf(),
        terrain_grid_size: 48.0,
    };
    let mut world = World::new(config, BlockModelCatalog::builtin());
    let frame = FrameInput {
        view_projection: Mat4::IDENTITY,
        observer: Vec3::new(8.0, 100.0, 8.0),
    };
    world.track(Vec3::new(8.0, 100.0, 8.0));
    while world.pending_adds().next().is_some() {
        world.update(&frame);
    }
    world.update(&frame);

    let center = ChunkPos::new(0, 0);
    let chunk = world.chunk(center).expect("center loaded");
    assert!(chunk.pending_positions().is_empty());

    let mut cached = 0;
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_HEIGHT {
                let local = LocalPos::new(x, y, z);
                let kind = chunk.block(local);
                let entry = chunk.cache_entry(local);
                if kind.is_air() {
                    assert!(entry.is_none(), "air cached at {local:?}");
                    continue;
                }
                let world_pos = BlockPos::from_local(center, local);
                let mask = Direction::ALL
                    .into_iter()
                    .filter(|dir| face_visible_toward(kind, world.block(world_pos.offset(*dir))))
                    .fold(0u8, |mask, dir| mask | dir.bit());
                match entry {
                    Some(entry) => {
                        assert_eq!(entry.faces, mask, "{kind:?} at {local:?}");
                        cached += 1;
                    }
                    None => assert_eq!(mask, 0, "{kind:?} at {local:?} has visible faces"),
                }
            }
        }
    }
    assert_eq!(cached, chunk.cache_len());
}
