use jumpflood_core::color::to_rgb_u32;
use jumpflood_core::{SeedTexel, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::program::{KernelProgram, ProgramKind};
use crate::target::RenderTarget;

/// Presentable pixels, `0x00RRGGBB`, top row first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width as usize * height as usize, 0);
    }

    /// Pixel at `(x, y)` counted from the top-left corner.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Copies `source` into `frame` through a blit program.
///
/// `Blit` shows finalized colors as stored; `SeedBlit` shows the decoded seed
/// color. Texels without a seed show `background`.
pub fn blit(
    program: &KernelProgram,
    source: &RenderTarget,
    frame: &mut FrameBuffer,
    background: Vec3,
) -> Result<(), RenderError> {
    let decode_seeds = match program.kind() {
        ProgramKind::Blit => false,
        ProgramKind::SeedBlit => true,
        found => return Err(RenderError::NotABlit { found }),
    };

    let (width, height) = (source.width(), source.height());
    frame.resize(width, height);
    let background = to_rgb_u32(background);

    frame
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, out)| {
            // Targets are stored bottom-up.
            let y = height - 1 - row as u32;
            for (x, pixel) in out.iter_mut().enumerate() {
                let texel = source.texel(x as u32, y);
                *pixel = if texel[3] == 0.0 {
                    background
                } else if decode_seeds {
                    to_rgb_u32(SeedTexel::from_channels(texel).color())
                } else {
                    to_rgb_u32(Vec3::new(texel[0], texel[1], texel[2]))
                };
            }
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{RenderDevice, SoftwareDevice};
    use crate::program::ProgramSet;
    use jumpflood_core::{encode_color, Vec2};

    #[test]
    fn test_seed_blit_flips_rows_and_decodes() {
        let mut device = SoftwareDevice::new(64);
        let programs = ProgramSet::compile(&mut device, 2).unwrap();
        let mut target = device.create_target(3, 2).unwrap();
        let red = SeedTexel::seed(Vec2::new(0.1, 0.1), encode_color(Vec3::new(1.0, 0.0, 0.0)));
        target.set_texel(0, 0, red.to_channels());

        let mut frame = FrameBuffer::default();
        blit(&programs.seed_blit, &target, &mut frame, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        // Bottom-left texel lands in the last row.
        assert_eq!(frame.pixel(0, 1), to_rgb_u32(Vec3::new(0.9, 0.0, 0.0)));
        assert_eq!(frame.pixel(0, 0), 0x0000_00FF);
    }

    #[test]
    fn test_passthrough_blit() {
        let mut device = SoftwareDevice::new(64);
        let programs = ProgramSet::compile(&mut device, 2).unwrap();
        let mut target = device.create_target(2, 2).unwrap();
        target.set_texel(1, 1, [0.0, 1.0, 0.0, 1.0]);

        let mut frame = FrameBuffer::new(2, 2);
        blit(&programs.blit, &target, &mut frame, Vec3::ZERO).unwrap();
        assert_eq!(frame.pixel(1, 0), 0x0000_FF00);
        assert_eq!(frame.pixel(0, 1), 0);
        assert!(matches!(
            blit(&programs.jump_flood, &target, &mut frame, Vec3::ZERO),
            Err(RenderError::NotABlit {
                found: ProgramKind::JumpFlood
            })
        ));
        let err = blit(&programs.stroke_fill, &target, &mut frame, Vec3::ZERO).unwrap_err();
        assert_eq!(err.to_string(), "Expected a blit program, got StrokeFill");
    }
}
