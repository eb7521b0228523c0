use jumpflood_core::texel::Channels;

use crate::device::{FramebufferHandle, TextureHandle};

/// A texture with its framebuffer attachment. Row 0 is the bottom row.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    texture: TextureHandle,
    framebuffer: FramebufferHandle,
    width: u32,
    height: u32,
    texels: Vec<Channels>,
}

impl RenderTarget {
    pub(crate) fn new(
        texture: TextureHandle,
        framebuffer: FramebufferHandle,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            texture,
            framebuffer,
            width,
            height,
            texels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn texel(&self, x: u32, y: u32) -> Channels {
        self.texels[self.index(x, y)]
    }

    pub fn set_texel(&mut self, x: u32, y: u32, value: Channels) {
        let i = self.index(x, y);
        self.texels[i] = value;
    }

    /// Fetch with clamp-to-edge addressing.
    pub fn sample_clamped(&self, x: i64, y: i64) -> Channels {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.texel(x, y)
    }

    pub fn texels(&self) -> &[Channels] {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut [Channels] {
        &mut self.texels
    }
}
