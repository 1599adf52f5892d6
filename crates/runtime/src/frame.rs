use foundation::time::Time;

/// Reference frame duration the per-frame tuning constants are expressed in.
pub const REFERENCE_DT_S: f64 = 1.0 / 60.0;

/// Longest step a single frame may take, so a backgrounded tab does not
/// teleport the scene when it resumes.
pub const MAX_DT_S: f64 = 0.25;

/// Frame metadata handed to the per-frame tick.
///
/// This is the primary timebase for the viewer. It is small and pure so a
/// test can drive the tick deterministically without a display loop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Time elapsed since the first frame (seconds).
    pub time: Time,
}

impl Frame {
    /// Fixed-timestep frame: `time = index * dt_s`.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self {
            index: self.index + 1,
            dt_s: self.dt_s,
            time: Time(self.time.0 + self.dt_s),
        }
    }

    /// How many reference frames this frame spans (1.0 at 60 Hz).
    pub fn reference_steps(&self) -> f64 {
        self.dt_s / REFERENCE_DT_S
    }
}

/// Turns host timestamps (e.g. `requestAnimationFrame` milliseconds) into
/// [`Frame`]s.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    start_ms: Option<f64>,
    last_ms: f64,
    next_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `timestamp_ms`.
    ///
    /// The first call yields a frame with one reference step so the scene
    /// moves on the very first tick. Non-monotonic timestamps produce a zero
    /// step; large gaps are clamped to [`MAX_DT_S`].
    pub fn advance(&mut self, timestamp_ms: f64) -> Frame {
        let (dt_s, elapsed_s) = match self.start_ms {
            None => {
                self.start_ms = Some(timestamp_ms);
                (REFERENCE_DT_S, 0.0)
            }
            Some(start) => {
                let dt = ((timestamp_ms - self.last_ms) / 1000.0).clamp(0.0, MAX_DT_S);
                (dt, ((timestamp_ms - start) / 1000.0).max(0.0))
            }
        };
        self.last_ms = timestamp_ms;

        let frame = Frame {
            index: self.next_index,
            dt_s,
            time: Time(elapsed_s),
        };
        self.next_index += 1;
        frame
    }
}
