//! # Jumpflood Renderer
//!
//! Double-buffered execution of the Jump Flooding Algorithm on a software
//! render device. Seeds are rasterized from pointer strokes, propagated over
//! `ceil(log2(max(width, height)))` fragment-parallel passes and finally
//! turned into a brightness-modulated distance transform.
//!
//! [`JumpFloodPipeline`] is the entry point; hosts drive it with
//! `advance`/`play`/`update` and feed it pointer samples and resizes.

pub mod error;
pub mod device;
pub mod program;
pub mod target;
pub mod pingpong;
pub mod viewport;
pub mod raster;
pub mod kernel;
pub mod finalize;
pub mod present;
pub mod settings;
pub mod pipeline;

pub use device::{RenderDevice, SoftwareDevice};
pub use error::{RenderError, SettingsError};
pub use pipeline::{JumpFloodPipeline, PointerSample};
pub use present::FrameBuffer;
pub use settings::PipelineSettings;
pub use viewport::Viewport;
