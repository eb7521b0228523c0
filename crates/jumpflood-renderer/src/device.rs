use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::program::{KernelProgram, KernelSource};
use crate::target::RenderTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramebufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramHandle(pub u32);

/// Resource creation and program compilation.
///
/// Both operations are single-attempt: a failure is reported, never retried.
pub trait RenderDevice {
    /// Allocates a target and checks it for completeness.
    fn create_target(&mut self, width: u32, height: u32) -> Result<RenderTarget, RenderError>;

    /// Compiles and links a program.
    fn compile(&mut self, source: &KernelSource) -> Result<KernelProgram, RenderError>;
}

/// CPU implementation of [`RenderDevice`].
#[derive(Debug, Clone)]
pub struct SoftwareDevice {
    max_texture_size: u32,
    next_handle: u32,
}

impl SoftwareDevice {
    pub fn new(max_texture_size: u32) -> Self {
        Self {
            max_texture_size,
            next_handle: 1,
        }
    }

    fn handle(&mut self) -> u32 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }
}

impl RenderDevice for SoftwareDevice {
    fn create_target(&mut self, width: u32, height: u32) -> Result<RenderTarget, RenderError> {
        let incomplete = |reason: String| RenderError::Resource {
            width,
            height,
            reason,
        };
        if width == 0 || height == 0 {
            return Err(incomplete("missing attachment (zero-sized texture)".into()));
        }
        if width > self.max_texture_size || height > self.max_texture_size {
            return Err(incomplete(format!(
                "exceeds maximum texture size {}",
                self.max_texture_size
            )));
        }
        let texture = TextureHandle(self.handle());
        let framebuffer = FramebufferHandle(self.handle());
        Ok(RenderTarget::new(texture, framebuffer, width, height))
    }

    fn compile(&mut self, source: &KernelSource) -> Result<KernelProgram, RenderError> {
        source.validate().map_err(|log| RenderError::Compile {
            program: source.kind,
            log,
        })?;
        Ok(KernelProgram::new(ProgramHandle(self.handle()), source))
    }
}
