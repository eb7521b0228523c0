use std::time::Duration;

use jumpflood_core::{StepAction, StepSequencer, StepState, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::device::{RenderDevice, SoftwareDevice};
use crate::error::RenderError;
use crate::kernel;
use crate::pingpong::PingPongBuffers;
use crate::present::{self, FrameBuffer};
use crate::program::ProgramSet;
use crate::raster::SeedRasterizer;
use crate::settings::PipelineSettings;
use crate::target::RenderTarget;
use crate::viewport::Viewport;

/// One pointer reading in surface pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub button_down: bool,
}

/// Owns every resource of a jump flood session: device, programs, the
/// ping-pong pair, the stroke state and the sequencer.
///
/// All entry points take `&mut self`, so manual stepping, playback ticks and
/// resizes are serialized by construction. Hosts sharing a pipeline across
/// threads wrap it in a `Mutex`.
pub struct JumpFloodPipeline<D: RenderDevice = SoftwareDevice> {
    device: D,
    settings: PipelineSettings,
    viewport: Viewport,
    programs: ProgramSet,
    /// `None` after a failed allocation; nothing renders until the next
    /// successful one.
    buffers: Option<PingPongBuffers>,
    rasterizer: SeedRasterizer,
    sequencer: StepSequencer,
    pointer_down: bool,
}

impl JumpFloodPipeline<SoftwareDevice> {
    /// Pipeline on the CPU device configured from `settings`.
    pub fn with_settings(
        settings: PipelineSettings,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let device = SoftwareDevice::new(settings.max_texture_size);
        Self::new(device, settings, width, height)
    }
}

impl<D: RenderDevice> JumpFloodPipeline<D> {
    /// Compiles all programs and allocates the targets. Either failure is
    /// fatal for the session.
    pub fn new(
        mut device: D,
        settings: PipelineSettings,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let viewport = Viewport::new(width, height);
        let num_steps = viewport.num_steps();
        let programs = ProgramSet::compile(&mut device, num_steps)?;
        let buffers = PingPongBuffers::allocate(&mut device, width, height)?;
        let rasterizer = SeedRasterizer::new(settings.brush_size_px, viewport);
        let sequencer = StepSequencer::new(num_steps, settings.playback_time());

        Ok(Self {
            device,
            settings,
            viewport,
            programs,
            buffers: Some(buffers),
            rasterizer,
            sequencer,
            pointer_down: false,
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> StepState {
        self.sequencer.state()
    }

    pub fn num_steps(&self) -> u32 {
        self.sequencer.num_steps()
    }

    pub fn current_step(&self) -> u32 {
        self.sequencer.current_step()
    }

    pub fn is_done(&self) -> bool {
        self.sequencer.is_done()
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    /// False after a failed allocation.
    pub fn is_rendering(&self) -> bool {
        self.buffers.is_some()
    }

    /// The read source of the ping-pong pair.
    pub fn current_target(&self) -> Option<&RenderTarget> {
        self.buffers.as_ref().map(|b| b.current())
    }

    // ── Stepping ─────────────────────────────────────────────────────

    /// Performs one sequencer transition and returns the new state.
    pub fn advance(&mut self) -> Result<StepState, RenderError> {
        if self.buffers.is_none() {
            return Err(RenderError::Unavailable);
        }

        match self.sequencer.advance() {
            StepAction::Commit => {
                self.rasterizer.end();
                log::info!(
                    "Seeds committed, propagating over {} levels",
                    self.sequencer.num_steps()
                );
            }
            StepAction::Propagate { level } => self.run_pass(level)?,
            StepAction::Finalize => self.run_pass(self.sequencer.num_steps() + 1)?,
            StepAction::Reset => self.reallocate()?,
        }
        Ok(self.sequencer.state())
    }

    fn run_pass(&mut self, level: u32) -> Result<(), RenderError> {
        let buffers = self.buffers.as_mut().ok_or(RenderError::Unavailable)?;
        let (read, write) = buffers.split();
        kernel::run_pass(&self.programs.jump_flood, read, write, level)?;
        buffers.swap();
        Ok(())
    }

    fn reallocate(&mut self) -> Result<(), RenderError> {
        self.buffers = None;
        let (width, height) = (self.viewport.width, self.viewport.height);
        match PingPongBuffers::allocate(&mut self.device, width, height) {
            Ok(buffers) => {
                self.buffers = Some(buffers);
                Ok(())
            }
            Err(e) => {
                log::error!("{e}; rendering disabled until the next successful allocation");
                Err(e)
            }
        }
    }

    /// Abandons the current run and starts over with empty targets.
    pub fn reset(&mut self) -> Result<(), RenderError> {
        self.rasterizer.end();
        self.sequencer.reset(self.viewport.num_steps());
        self.reallocate()
    }

    /// Forces `Idle` and reallocates at the new size. Seed data is dropped.
    pub fn on_resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        log::info!("Surface resized to {width}x{height}");
        self.viewport = Viewport::new(width, height);
        let num_steps = self.viewport.num_steps();
        self.rasterizer.resize(self.viewport);
        self.sequencer.reset(num_steps);

        // No pass may run with a level count baked for the old size.
        if let Err(e) = self.programs.rebuild_jump_flood(&mut self.device, num_steps) {
            log::error!("{e}");
            self.buffers = None;
            return Err(e);
        }
        self.reallocate()
    }

    // ── Playback ─────────────────────────────────────────────────────

    pub fn play(&mut self) -> bool {
        self.buffers.is_some() && self.sequencer.play()
    }

    pub fn pause(&mut self) {
        self.sequencer.pause();
    }

    /// Returns whether playback is running afterwards.
    pub fn toggle_playback(&mut self) -> bool {
        if self.is_playing() {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    /// Advances time by `dt`, stepping when playback is due.
    pub fn update(&mut self, dt: Duration) -> Result<(), RenderError> {
        let due = self.sequencer.tick(dt);
        for _ in 0..due {
            if !self.sequencer.is_playing() {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }

    // ── Strokes ──────────────────────────────────────────────────────

    /// Starts a stroke. Rejected unless the run is idle.
    pub fn begin_stroke(&mut self, color: Vec3) -> bool {
        if !self.sequencer.is_idle() || self.buffers.is_none() {
            log::debug!("Stroke rejected at step {}", self.current_step());
            return false;
        }
        self.rasterizer.begin(color);
        true
    }

    /// Extends the active stroke to a surface pixel position and writes the
    /// new segment into the current target.
    pub fn extend_stroke(&mut self, point: Vec2) -> Result<bool, RenderError> {
        if !self.sequencer.is_idle() {
            return Ok(false);
        }
        let Some(buffers) = self.buffers.as_mut() else {
            return Ok(false);
        };
        let ndc = self.viewport.surface_to_ndc(point.x, point.y);
        let segment = self
            .rasterizer
            .extend(&self.programs.stroke_fill, buffers.current_mut(), ndc)?;
        Ok(segment.is_some())
    }

    pub fn end_stroke(&mut self) {
        self.rasterizer.end();
    }

    /// Maps raw pointer samples onto strokes: press begins a stroke with
    /// `color()`, drag extends it, release ends it.
    pub fn handle_pointer(
        &mut self,
        sample: PointerSample,
        color: impl FnOnce() -> Vec3,
    ) -> Result<bool, RenderError> {
        let pressed = sample.button_down && !self.pointer_down;
        let released = !sample.button_down && self.pointer_down;
        self.pointer_down = sample.button_down;

        if released {
            self.end_stroke();
            return Ok(false);
        }
        if pressed && !self.begin_stroke(color()) {
            return Ok(false);
        }
        if sample.button_down {
            return self.extend_stroke(Vec2::new(sample.x, sample.y));
        }
        Ok(false)
    }

    // ── Presentation ─────────────────────────────────────────────────

    /// Renders the current target: the distance transform once done, the
    /// decoded seed colors otherwise.
    pub fn present(&self, frame: &mut FrameBuffer) -> Result<(), RenderError> {
        let buffers = self.buffers.as_ref().ok_or(RenderError::Unavailable)?;
        let program = if self.sequencer.is_done() {
            &self.programs.blit
        } else {
            &self.programs.seed_blit
        };
        present::blit(
            program,
            buffers.current(),
            frame,
            self.settings.background_color(),
        )
    }
}
