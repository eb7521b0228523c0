// Draw strokes with the left mouse button, then watch them flood the window.
// Space: advance one step. P: play/pause. R: reset. Esc: quit.
// An optional JSON settings file may be passed as the first argument.

use std::error::Error;
use std::time::Instant;

use jumpflood_core::Vec3;
use jumpflood_renderer::{
    FrameBuffer, JumpFloodPipeline, PipelineSettings, PointerSample, RenderError,
};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use rand::Rng;

const INITIAL_WIDTH: usize = 960;
const INITIAL_HEIGHT: usize = 640;

/// The window plus the input queries the frame loop needs.
struct Surface {
    window: Window,
}

impl Surface {
    fn new(title: &str, width: usize, height: usize) -> Result<Self, minifb::Error> {
        let options = WindowOptions {
            resize: true,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    fn size(&self) -> (u32, u32) {
        let (w, h) = self.window.get_size();
        (w as u32, h as u32)
    }

    fn pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    fn pointer(&self) -> Option<PointerSample> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| PointerSample {
                x,
                y,
                button_down: self.window.get_mouse_down(MouseButton::Left),
            })
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), minifb::Error> {
        if frame.pixels.is_empty() {
            // Minimized; keep pumping events.
            self.window.update();
            return Ok(());
        }
        self.window
            .update_with_buffer(&frame.pixels, frame.width as usize, frame.height as usize)
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}

/// A random color on the quantization grid, kept away from black.
fn random_color() -> Vec3 {
    let mut rng = rand::thread_rng();
    let mut channel = || rng.gen_range(2..10) as f32 / 10.0;
    Vec3::new(channel(), channel(), channel())
}

fn title_for(pipeline: &JumpFloodPipeline) -> String {
    let step = pipeline.current_step();
    let n = pipeline.num_steps();
    let status = if !pipeline.is_rendering() {
        "unavailable".to_string()
    } else if step == 0 {
        "draw, then Space/P".to_string()
    } else if step <= n {
        format!("step {step}/{n}")
    } else if step == n + 1 {
        "distance transform next".to_string()
    } else {
        "done, Space to reset".to_string()
    };
    let playing = if pipeline.is_playing() { " (playing)" } else { "" };
    format!("Jump Flood | {status}{playing}")
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading settings from {path}");
            PipelineSettings::load(&path)?
        }
        None => PipelineSettings::default(),
    };

    let mut surface = Surface::new("Jump Flood", INITIAL_WIDTH, INITIAL_HEIGHT)?;
    let (mut width, mut height) = surface.size();
    let mut pipeline = JumpFloodPipeline::with_settings(settings, width, height)?;
    let mut frame = FrameBuffer::new(width, height);
    let mut title = String::new();
    let mut last_frame = Instant::now();

    while surface.is_open() {
        let now = Instant::now();
        let dt = now - last_frame;
        last_frame = now;

        let size = surface.size();
        if size != (width, height) {
            (width, height) = size;
            // A failed allocation leaves the pipeline idle until the next resize.
            if let Err(e) = pipeline.on_resize(width, height) {
                log::warn!("Resize failed: {e}");
            }
        }

        if surface.pressed(Key::Space) {
            report(pipeline.advance().map(|_| ()));
        }
        if surface.pressed(Key::P) {
            pipeline.toggle_playback();
        }
        if surface.pressed(Key::R) {
            report(pipeline.reset());
        }
        if let Some(sample) = surface.pointer() {
            report(pipeline.handle_pointer(sample, random_color).map(|_| ()));
        }
        report(pipeline.update(dt));

        if pipeline.present(&mut frame).is_err() {
            frame.resize(width.max(1), height.max(1));
            frame.pixels.fill(0);
        }
        surface.present(&frame)?;

        let next_title = title_for(&pipeline);
        if next_title != title {
            surface.set_title(&next_title);
            title = next_title;
        }
    }

    Ok(())
}

fn report(result: Result<(), RenderError>) {
    if let Err(e) = result {
        log::error!("{e}");
    }
}
