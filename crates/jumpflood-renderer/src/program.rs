use serde::{Deserialize, Serialize};

use crate::device::{ProgramHandle, RenderDevice};
use crate::error::RenderError;

/// Largest level count the jump flood kernel can be built with.
pub const MAX_KERNEL_STEPS: u32 = 16;

/// The four programs the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramKind {
    /// Copies a target to the surface unchanged.
    Blit,
    /// Shows the decoded seed color of each texel.
    SeedBlit,
    /// Writes a constant encoded color into covered texels.
    StrokeFill,
    /// Step kernel and distance transform, selected by level.
    JumpFlood,
}

/// Input to [`RenderDevice::compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSource {
    pub kind: ProgramKind,
    /// Level count baked into the jump flood kernel.
    pub num_steps: Option<u32>,
}

impl KernelSource {
    pub fn new(kind: ProgramKind) -> Self {
        Self {
            kind,
            num_steps: None,
        }
    }

    pub fn jump_flood(num_steps: u32) -> Self {
        Self {
            kind: ProgramKind::JumpFlood,
            num_steps: Some(num_steps),
        }
    }

    /// Checks the source the way a compiler front end would, returning the
    /// diagnostic text on failure.
    pub fn validate(&self) -> Result<(), String> {
        match (self.kind, self.num_steps) {
            (ProgramKind::JumpFlood, None) => {
                Err("error: 'num_steps' : undeclared constant".to_string())
            }
            (ProgramKind::JumpFlood, Some(n)) if n == 0 || n > MAX_KERNEL_STEPS => Err(format!(
                "error: num_steps = {n} outside supported range 1..={MAX_KERNEL_STEPS}"
            )),
            (ProgramKind::JumpFlood, Some(_)) => Ok(()),
            (kind, Some(_)) => Err(format!(
                "error: {kind:?} program takes no 'num_steps' constant"
            )),
            (_, None) => Ok(()),
        }
    }
}

/// A compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelProgram {
    handle: ProgramHandle,
    kind: ProgramKind,
    num_steps: u32,
}

impl KernelProgram {
    pub(crate) fn new(handle: ProgramHandle, source: &KernelSource) -> Self {
        Self {
            handle,
            kind: source.kind,
            num_steps: source.num_steps.unwrap_or(0),
        }
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    /// Baked level count; zero for programs other than the jump flood kernel.
    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    pub(crate) fn expect_kind(&self, expected: ProgramKind) -> Result<(), RenderError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(RenderError::ProgramMismatch {
                expected,
                found: self.kind,
            })
        }
    }
}

/// Every program the pipeline needs, compiled together at setup.
#[derive(Debug, Clone)]
pub struct ProgramSet {
    pub blit: KernelProgram,
    pub seed_blit: KernelProgram,
    pub stroke_fill: KernelProgram,
    pub jump_flood: KernelProgram,
}

impl ProgramSet {
    pub fn compile<D: RenderDevice>(device: &mut D, num_steps: u32) -> Result<Self, RenderError> {
        let programs = Self {
            blit: device.compile(&KernelSource::new(ProgramKind::Blit))?,
            seed_blit: device.compile(&KernelSource::new(ProgramKind::SeedBlit))?,
            stroke_fill: device.compile(&KernelSource::new(ProgramKind::StrokeFill))?,
            jump_flood: device.compile(&KernelSource::jump_flood(num_steps))?,
        };
        log::info!("Compiled kernel programs (num_steps = {num_steps})");
        Ok(programs)
    }

    /// Rebuilds the jump flood kernel when the level count changed.
    pub fn rebuild_jump_flood<D: RenderDevice>(
        &mut self,
        device: &mut D,
        num_steps: u32,
    ) -> Result<(), RenderError> {
        if self.jump_flood.num_steps() != num_steps {
            self.jump_flood = device.compile(&KernelSource::jump_flood(num_steps))?;
            log::info!("Rebuilt jump flood kernel (num_steps = {num_steps})");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SoftwareDevice;

    #[test]
    fn test_compile_program_set() {
        let mut device = SoftwareDevice::new(1024);
        let programs = ProgramSet::compile(&mut device, 10).unwrap();
        assert_eq!(programs.jump_flood.kind(), ProgramKind::JumpFlood);
        assert_eq!(programs.jump_flood.num_steps(), 10);
        assert_ne!(programs.blit.handle(), programs.seed_blit.handle());
    }

    #[test]
    fn test_compile_error_carries_log() {
        let mut device = SoftwareDevice::new(1024);
        let err = ProgramSet::compile(&mut device, MAX_KERNEL_STEPS + 1).unwrap_err();
        match err {
            RenderError::Compile { program, log } => {
                assert_eq!(program, ProgramKind::JumpFlood);
                assert!(log.contains("num_steps"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rebuild_only_when_changed() {
        let mut device = SoftwareDevice::new(1024);
        let mut programs = ProgramSet::compile(&mut device, 4).unwrap();
        let before = programs.jump_flood.handle();
        programs.rebuild_jump_flood(&mut device, 4).unwrap();
        assert_eq!(programs.jump_flood.handle(), before);
        programs.rebuild_jump_flood(&mut device, 5).unwrap();
        assert_ne!(programs.jump_flood.handle(), before);
        assert_eq!(programs.jump_flood.num_steps(), 5);
    }
}
