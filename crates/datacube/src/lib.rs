//! Lazily evaluated data cubes for local EO collections.
//!
//! Every product loaded through the collection plugins ends up as a
//! [`DataCube`] with dimension order `(time, bands, y, x)`:
//!
//! ```text
//! reader.open(files, variables)
//!      │
//!      ▼
//! LazyArray per variable  (shape known, values deferred)
//!      │
//!      ├─► swath products: SwathGrid::scatter_lazy (1-D obs → (y, x))
//!      │
//!      ▼
//! DataCube::stack(time, bands)   (order preserved, one shared grid)
//!      │
//!      ▼
//! DataCube::compute() → Array4<f32>
//! ```

pub mod cube;
pub mod error;
pub mod lazy;
pub mod swath;

pub use cube::{DataCube, DIMENSIONS};
pub use error::{CubeError, CubeResult};
pub use lazy::LazyArray;
pub use swath::SwathGrid;
