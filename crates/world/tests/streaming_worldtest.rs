//! Streaming worldtest
//!
//! Walks the observer across several chunk borders and checks that the
//! loaded set always converges to the square window around the center.

use std::collections::BTreeSet;

use blockworld_assets::BlockModelCatalog;
use blockworld_core::{ChunkPos, SimTick};
use blockworld_testkit::{temp_dir, EventRecord, JsonlSink};
use blockworld_world::{FlatNoise, FrameInput, World, WorldConfig};
use glam::{Mat4, Vec3};

const RADIUS: i32 = 2;

fn window(center: ChunkPos) -> BTreeSet<ChunkPos> {
    let mut out = BTreeSet::new();
    for dx in -RADIUS..=RADIUS {
        for dz in -RADIUS..=RADIUS {
            out.insert(ChunkPos::new(center.x + dx, center.z + dz));
        }
    }
    out
}

fn drain(world: &mut World, frame: &FrameInput) -> usize {
    let mut added = 0;
    while world.pending_adds().next().is_some() {
        if world.update(frame).added.is_some() {
            added += 1;
        }
    }
    added
}

#[test]
fn streaming_worldtest() {
    let tmp = temp_dir("streaming").unwrap();
    let dir = tmp.path();
    let mut events = JsonlSink::create(dir.join("streaming.jsonl")).expect("can create event log");
    let config = WorldConfig {
        seed: 77,
        render_distance: RADIUS,
        save_dir: dir.join("saves"),
        terrain_grid_size: 32.0,
    };
    let mut world = World::with_noise(config, BlockModelCatalog::builtin(), Box::new(FlatNoise(0.3)));
    let frame = FrameInput {
        view_projection: Mat4::IDENTITY,
        observer: Vec3::ZERO,
    };

    assert!(world.track(Vec3::new(8.0, 80.0, 8.0)));
    assert_eq!(drain(&mut world, &frame), 25);
    assert_eq!(world.loaded_positions().into_iter().collect::<BTreeSet<_>>(), window(ChunkPos::new(0, 0)));

    for step in 1..=3 {
        let center = ChunkPos::new(step, 0);
        let observer = Vec3::new(step as f32 * 16.0 + 8.0, 80.0, 8.0);
        assert!(world.track(observer));
        assert!(!world.track(observer + Vec3::new(0.5, 0.0, 0.0)));

        let mut removed = world.take_removed();
        removed.sort();
        let expected: Vec<ChunkPos> = (-RADIUS..=RADIUS)
            .map(|dz| ChunkPos::new(step - 1 - RADIUS, dz))
            .collect();
        assert_eq!(removed, expected);

        let added = drain(&mut world, &frame);
        assert_eq!(added, 5);
        let loaded: BTreeSet<ChunkPos> = world.loaded_positions().into_iter().collect();
        assert_eq!(loaded, window(center));
        assert!(world.chunk(center).unwrap().is_center());
        assert_eq!(world.draw_order().last(), Some(&center));

        let payload = format!("center={center} loaded={}", loaded.len());
        events
            .write(&EventRecord {
                tick: world.tick(),
                kind: "WindowSettled",
                payload: &payload,
            })
            .expect("can write event");
    }
    assert!(world.tick() > SimTick::ZERO);
}

#[test]
fn queued_adds_outside_new_window_are_dropped() {
    let tmp = temp_dir("streaming-skip").unwrap();
    let dir = tmp.path();
    let config = WorldConfig {
        seed: 1,
        render_distance: 1,
        save_dir: dir.to_path_buf(),
        terrain_grid_size: 32.0,
    };
    let mut world = World::with_noise(config, BlockModelCatalog::builtin(), Box::new(FlatNoise(0.3)));
    world.on_tracked_chunk_changed(ChunkPos::new(0, 0));
    // Jump far away before anything was generated.
    world.on_tracked_chunk_changed(ChunkPos::new(10, 10));
    let targets: Vec<ChunkPos> = world.pending_adds().collect();
    assert_eq!(targets.len(), 9);
    assert!(targets.iter().all(|t| t.chebyshev(ChunkPos::new(10, 10)) <= 1));
}
