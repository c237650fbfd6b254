use std::path::PathBuf;

use anyhow::{Context, Result};
use blockworld_assets::BlockModelCatalog;
use blockworld_core::{BlockKind, BlockPos};
use blockworld_testkit::{ChunkMeshMetric, EventRecord, JsonlSink, MeshMetricSink};
use blockworld_world::{FrameInput, RenderPiece, World, WorldConfig};
use glam::{Mat4, Vec3};
use tracing::{debug, info};

/// Observer height above the terrain.
const OBSERVER_Y: f32 = 100.0;
const FOV_DEGREES: f32 = 70.0;
const ASPECT: f32 = 16.0 / 9.0;

/// Edits applied relative to the observer's block: (tick, offset, kind).
const SCRIPTED_EDITS: &[(u64, [i32; 3], BlockKind)] = &[
    (4, [2, -4, 0], BlockKind::Glass),
    (6, [3, -4, 0], BlockKind::Leaves),
    (8, [2, -4, 0], BlockKind::Stone),
    (10, [0, -4, 2], BlockKind::Water),
];

pub struct HeadlessConfig {
    pub world: WorldConfig,
    pub catalog: BlockModelCatalog,
    pub ticks: u64,
    pub event_log: Option<PathBuf>,
    pub metrics_out: Option<PathBuf>,
}

/// Totals reported after a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub ticks: u64,
    pub loaded: usize,
    pub added: usize,
    pub removed: usize,
    pub edits: usize,
    pub opaque_triangles: usize,
    pub translucent_triangles: usize,
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let far = ((cfg.world.render_distance.max(0) + 1) * 16) as f32 * 1.5;
    let projection = Mat4::perspective_rh(FOV_DEGREES.to_radians(), ASPECT, 0.1, far);
    let mut world = World::new(cfg.world, cfg.catalog);
    let mut events = cfg
        .event_log
        .as_ref()
        .map(JsonlSink::create)
        .transpose()
        .context("failed to open event log")?;
    let mut summary = RunSummary::default();
    let start = Vec3::new(8.5, OBSERVER_Y, 8.5);

    for step in 0..cfg.ticks {
        let eye = start + Vec3::new(step as f32, 0.0, 0.0);
        let crossed = world.track(eye);
        let view = Mat4::look_at_rh(eye, eye + Vec3::X, Vec3::Y);
        let frame = FrameInput {
            view_projection: projection * view,
            observer: eye,
        };
        let stats = world.update(&frame);

        let removed = world.take_removed();
        summary.removed += removed.len();
        if stats.added.is_some() {
            summary.added += 1;
        }

        for &(at, [dx, dy, dz], kind) in SCRIPTED_EDITS {
            if at != step {
                continue;
            }
            let observer = BlockPos::containing(eye.x, eye.y, eye.z);
            let target = BlockPos::new(observer.x + dx, observer.y + dy, observer.z + dz);
            if world.set_block(target, kind) {
                summary.edits += 1;
                debug!(?target, ?kind, "Scripted edit");
            }
        }

        let (mut opaque, mut translucent) = (0, 0);
        for piece in world.render_pieces() {
            match piece {
                RenderPiece::TerrainChunk { mesh, .. } => opaque += mesh.triangle_count(),
                RenderPiece::TranslucentBatch { mesh, .. } => translucent += mesh.indices.len() / 3,
            }
        }
        summary.opaque_triangles = opaque;
        summary.translucent_triangles = translucent;

        debug!(
            tick = world.tick().0,
            added = ?stats.added,
            rebuilt = stats.rebuilt,
            visible = stats.visible,
            culled = stats.culled,
            opaque,
            translucent,
            "Tick"
        );

        if let Some(sink) = events.as_mut() {
            if crossed {
                let payload = format!("{:?}", world.tracked_chunk());
                sink.write(&EventRecord {
                    tick: world.tick(),
                    kind: "CenterChanged",
                    payload: &payload,
                })?;
            }
            if let Some(pos) = stats.added {
                let payload = pos.to_string();
                sink.write(&EventRecord {
                    tick: world.tick(),
                    kind: "ChunkAdded",
                    payload: &payload,
                })?;
            }
            for pos in &removed {
                let payload = pos.to_string();
                sink.write(&EventRecord {
                    tick: world.tick(),
                    kind: "ChunkRemoved",
                    payload: &payload,
                })?;
            }
        }
    }

    summary.ticks = cfg.ticks;
    summary.loaded = world.loaded_count();

    if let Some(path) = cfg.metrics_out {
        let metrics: Vec<ChunkMeshMetric> = world
            .loaded_positions()
            .into_iter()
            .filter_map(|pos| world.chunk(pos))
            .map(|chunk| ChunkMeshMetric {
                chunk: [chunk.position().x, chunk.position().z],
                triangles: chunk.opaque_mesh().triangle_count(),
                translucent_triangles: chunk.translucent_mesh().indices.len() / 3,
                hash: chunk.opaque_mesh().hash.to_hex(),
            })
            .collect();
        MeshMetricSink::create(&path)
            .with_context(|| format!("failed to create metrics file {}", path.display()))?
            .write(&metrics)?;
        info!(path = %path.display(), chunks = metrics.len(), "Wrote mesh metrics");
    }

    Ok(summary)
}
