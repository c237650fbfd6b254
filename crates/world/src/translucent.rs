//! Sorting and batching of blended faces.
//!
//! The chunk under the observer is sorted back-to-front by planar distance;
//! every other chunk only groups faces by category. Either way the output is
//! one indexed buffer plus contiguous index ranges that share a category, so
//! a renderer binds one material per range.

use std::cmp::Ordering;

use blockworld_assets::MeshVertex;
use blockworld_core::TransparencyCategory;

use crate::mesh::QUAD_INDICES;

/// One blended quad waiting to be ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslucentFace {
    /// Quad corners, counter-clockwise from outside.
    pub vertices: [MeshVertex; 4],
    /// Material bucket.
    pub category: TransparencyCategory,
    /// Average of the four corners.
    pub centroid: [f32; 3],
}

impl TranslucentFace {
    /// Tag a quad with its category and compute the centroid.
    pub fn new(vertices: [MeshVertex; 4], category: TransparencyCategory) -> Self {
        let mut centroid = [0.0f32; 3];
        for v in &vertices {
            for (acc, p) in centroid.iter_mut().zip(v.position) {
                *acc += p;
            }
        }
        for c in &mut centroid {
            *c *= 0.25;
        }
        Self {
            vertices,
            category,
            centroid,
        }
    }

    fn planar_distance_sq(&self, reference: [f32; 3]) -> f32 {
        let dx = self.centroid[0] - reference[0];
        let dz = self.centroid[2] - reference[2];
        dx * dx + dz * dz
    }
}

/// How faces are ordered before flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortMode {
    /// Group by category only.
    Category,
    /// Farthest first from a reference point on the XZ plane.
    Distance {
        /// Observer position.
        reference: [f32; 3],
    },
}

/// Contiguous index run drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslucentRange {
    /// First index (inclusive).
    pub index_start: u32,
    /// One past the last index.
    pub index_end: u32,
    /// Material bucket shared by the run.
    pub category: TransparencyCategory,
}

/// Flattened, ordered blended geometry for one chunk.
#[derive(Debug, Clone, Default)]
pub struct TranslucentMesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list in draw order.
    pub indices: Vec<u32>,
    /// Draw ranges in order.
    pub ranges: Vec<TranslucentRange>,
}

impl TranslucentMesh {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

fn cmp_centroid(a: &TranslucentFace, b: &TranslucentFace) -> Ordering {
    a.centroid
        .iter()
        .zip(&b.centroid)
        .map(|(x, y)| x.total_cmp(y))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Order `faces` per `mode` and flatten them into one mesh.
pub fn build_translucent(faces: &[TranslucentFace], mode: SortMode) -> TranslucentMesh {
    let mut order: Vec<usize> = (0..faces.len()).collect();
    match mode {
        SortMode::Category => order.sort_by(|&a, &b| {
            let (a, b) = (&faces[a], &faces[b]);
            a.category.cmp(&b.category).then_with(|| cmp_centroid(a, b))
        }),
        SortMode::Distance { reference } => order.sort_by(|&a, &b| {
            let (a, b) = (&faces[a], &faces[b]);
            b.planar_distance_sq(reference)
                .total_cmp(&a.planar_distance_sq(reference))
                .then_with(|| a.category.cmp(&b.category))
                .then_with(|| cmp_centroid(a, b))
        }),
    }

    let mut mesh = TranslucentMesh {
        vertices: Vec::with_capacity(faces.len() * 4),
        indices: Vec::with_capacity(faces.len() * 6),
        ranges: Vec::new(),
    };

    for face in order.into_iter().map(|i| &faces[i]) {
        let base = mesh.vertices.len() as u32;
        let index_start = mesh.indices.len() as u32;
        mesh.vertices.extend_from_slice(&face.vertices);
        mesh.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        let index_end = mesh.indices.len() as u32;

        match mesh.ranges.last_mut() {
            Some(range) if range.category == face.category => range.index_end = index_end,
            _ => mesh.ranges.push(TranslucentRange {
                index_start,
                index_end,
                category: face.category,
            }),
        }
    }

    mesh
}
