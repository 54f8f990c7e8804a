//! Relaxation (bounding) engine for search nodes.

mod backend;
mod simplex_backend;

pub use backend::{RelaxResult, RelaxStatus, RelaxationBackend};
pub use simplex_backend::SimplexBackend;
