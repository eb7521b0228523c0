use crate::device::RenderDevice;
use crate::error::RenderError;
use crate::target::RenderTarget;

/// Two equally sized targets alternating between read source ("current")
/// and write destination ("next").
#[derive(Debug)]
pub struct PingPongBuffers {
    targets: [RenderTarget; 2],
    current: usize,
}

impl PingPongBuffers {
    /// Creates both targets. Nothing from a previous pair carries over.
    pub fn allocate<D: RenderDevice>(
        device: &mut D,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let first = device.create_target(width, height)?;
        let second = device.create_target(width, height)?;
        log::info!("Allocated ping-pong targets {width}x{height}");
        Ok(Self {
            targets: [first, second],
            current: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.targets[0].width()
    }

    pub fn height(&self) -> u32 {
        self.targets[0].height()
    }

    pub fn current(&self) -> &RenderTarget {
        &self.targets[self.current]
    }

    pub fn next(&self) -> &RenderTarget {
        &self.targets[1 - self.current]
    }

    /// The read source, for drawing seeds before propagation starts.
    pub fn current_mut(&mut self) -> &mut RenderTarget {
        &mut self.targets[self.current]
    }

    /// Frozen read source and disjoint write destination for one pass.
    pub fn split(&mut self) -> (&RenderTarget, &mut RenderTarget) {
        let (a, b) = self.targets.split_at_mut(1);
        if self.current == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// Makes the target just written the read source.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }
}
