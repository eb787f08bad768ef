//! Audio-reactive geometry deformation.
//!
//! Per frame, for every active target and every vertex: pick a bin, read its
//! normalised magnitude, peak-hold it, and move the vertex from its original
//! position according to the reaction mode.

mod bins;
mod decay;
mod geometry;
mod policy;
mod set;
mod target;

// Re-export public types
pub use bins::BinMapper;
pub use decay::{frames_to_converge, peak_hold, DecayState};
pub use geometry::{estimate_normals, BaseGeometry, LiveBuffer, Vertex};
pub use policy::{DeformationPolicy, DEFORMATION_FACTOR, DISPLACEMENT_SCALE};
pub use set::{BinCoverage, TargetSet, TargetState, UpdateSummary};
pub use target::{ReactiveTarget, TargetKind};
