use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Time {
    /// Delta of the tick currently being processed.
    pub dt: Duration,
    pub t_sec: f64,
    pub tick_index: u64,
    pub frame_index: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            dt: Duration::ZERO,
            t_sec: 0.0,
            tick_index: 0,
            frame_index: 0,
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.dt = dt;
        self.t_sec += dt.as_secs_f64();
        self.tick_index += 1;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
