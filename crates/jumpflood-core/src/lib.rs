//! # Jumpflood Core
//!
//! GPU-free building blocks of the jump flood pipeline: vector math, the
//! single-scalar color packing, the seed texel layout, stroke ribbon geometry
//! and the step sequencer that decides which pass runs next.

pub mod math;
pub mod color;
pub mod texel;
pub mod stroke;
pub mod sequencer;

pub use math::{Vec2, Vec3};
pub use color::{decode_color, encode_color};
pub use texel::SeedTexel;
pub use stroke::{StrokeSegment, StrokeState};
pub use sequencer::{num_steps_for, StepAction, StepSequencer, StepState};
