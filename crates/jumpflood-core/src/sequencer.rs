//! Step sequencing for a jump flood run.
//!
//! The sequencer only decides *what* happens on each advance; executing the
//! pass and swapping buffers is the caller's job.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `ceil(log2(max(width, height)))`, never less than one.
pub fn num_steps_for(width: u32, height: u32) -> u32 {
    let longest = width.max(height).max(1);
    longest.next_power_of_two().trailing_zeros().max(1)
}

/// Progress of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    /// No seeds committed; drawing is allowed.
    Idle,
    /// Propagation level `k` in `1..=num_steps` is next.
    Stepping(u32),
    /// All propagation levels ran; the distance transform pass is next.
    FinalPass,
    /// The distance transform has been produced.
    Done,
}

impl StepState {
    /// Integer form: 0 for idle, `k` while stepping, `num_steps + 1` and
    /// `num_steps + 2` for the last two states.
    pub fn index(self, num_steps: u32) -> u32 {
        match self {
            StepState::Idle => 0,
            StepState::Stepping(k) => k,
            StepState::FinalPass => num_steps + 1,
            StepState::Done => num_steps + 2,
        }
    }
}

/// Work the caller must perform for one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// The seed buffer becomes level zero; no pass runs.
    Commit,
    /// Run the step kernel at `level`, then swap.
    Propagate { level: u32 },
    /// Run the distance transform pass, then swap.
    Finalize,
    /// Discard the run and reallocate the buffers.
    Reset,
}

/// Fixed-cadence automatic advancing.
#[derive(Debug, Clone)]
struct Playback {
    playing: bool,
    total: Duration,
    elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct StepSequencer {
    num_steps: u32,
    state: StepState,
    playback: Playback,
}

impl StepSequencer {
    /// `playback_time` is the time a full automatic run spends on the
    /// propagation levels.
    pub fn new(num_steps: u32, playback_time: Duration) -> Self {
        Self {
            num_steps: num_steps.max(1),
            state: StepState::Idle,
            playback: Playback {
                playing: false,
                total: playback_time,
                elapsed: Duration::ZERO,
            },
        }
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    pub fn current_step(&self) -> u32 {
        self.state.index(self.num_steps)
    }

    pub fn is_idle(&self) -> bool {
        self.state == StepState::Idle
    }

    pub fn is_done(&self) -> bool {
        self.state == StepState::Done
    }

    /// Moves to the next state and reports what must be executed.
    pub fn advance(&mut self) -> StepAction {
        let (next, action) = match self.state {
            StepState::Idle => (StepState::Stepping(1), StepAction::Commit),
            StepState::Stepping(k) if k < self.num_steps => {
                (StepState::Stepping(k + 1), StepAction::Propagate { level: k })
            }
            StepState::Stepping(k) => (StepState::FinalPass, StepAction::Propagate { level: k }),
            StepState::FinalPass => (StepState::Done, StepAction::Finalize),
            StepState::Done => (StepState::Idle, StepAction::Reset),
        };
        log::debug!("step {:?} -> {:?} ({:?})", self.state, next, action);
        self.state = next;
        if matches!(next, StepState::Done | StepState::Idle) {
            self.stop_playback();
        }
        action
    }

    /// Forces `Idle`, optionally with a new level count. Playback stops.
    pub fn reset(&mut self, num_steps: u32) {
        self.num_steps = num_steps.max(1);
        self.state = StepState::Idle;
        self.stop_playback();
    }

    /// Starts automatic advancing. Has no effect once the run is done.
    pub fn play(&mut self) -> bool {
        if self.is_done() {
            return false;
        }
        if !self.playback.playing {
            log::info!("playback started");
            self.playback.playing = true;
            self.playback.elapsed = Duration::ZERO;
        }
        true
    }

    /// Stops automatic advancing without touching the state.
    pub fn pause(&mut self) {
        self.stop_playback();
    }

    fn stop_playback(&mut self) {
        if self.playback.playing {
            log::info!("playback stopped at step {}", self.current_step());
        }
        self.playback.playing = false;
        self.playback.elapsed = Duration::ZERO;
    }

    pub fn is_playing(&self) -> bool {
        self.playback.playing
    }

    /// Time between two automatic advances.
    pub fn tick_interval(&self) -> Duration {
        self.playback.total / self.num_steps
    }

    /// Accumulates `dt` and returns how many advances are due.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        if !self.playback.playing {
            return 0;
        }
        let interval = self.tick_interval();
        if interval.is_zero() {
            return self.remaining_until_done();
        }
        self.playback.elapsed += dt;
        let due = self.playback.elapsed.as_nanos() / interval.as_nanos();
        self.playback.elapsed -= interval * due as u32;
        (due as u32).min(self.remaining_until_done())
    }

    fn remaining_until_done(&self) -> u32 {
        self.num_steps + 2 - self.current_step()
    }
}
