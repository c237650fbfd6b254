//! Chunked voxel world: terrain generation, face visibility, meshing,
//! streaming around an observer and per-chunk edit persistence.

mod chunk;
mod frustum;
mod mesh;
mod noise;
mod persist;
mod terrain;
mod translucent;
mod trees;
mod visibility;
mod world;

pub use chunk::*;
pub use frustum::*;
pub use mesh::*;
pub use self::noise::*;
pub use persist::*;
pub use terrain::*;
pub use translucent::*;
pub use visibility::*;
pub use world::*;
