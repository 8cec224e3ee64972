use std::time::{Duration, Instant};

pub struct Telemetry {
    pub fps: f32,
    pub tps: f32,
    pub dt_ms: f32,

    last: Instant,
    frames: u32,
    ticks: u32,
    period_sec: f32,
    enabled: bool,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            fps: 0.0,
            tps: 0.0,
            dt_ms: 0.0,
            last: Instant::now(),
            frames: 0,
            ticks: 0,
            period_sec: 1.0,
            enabled: false,
        }
    }

    pub fn configure_fps_logging(&mut self, enabled: bool, period_sec: f32) {
        self.enabled = enabled;
        self.period_sec = period_sec.max(0.25);
    }

    pub fn tick(&mut self, dt: Duration) {
        self.dt_ms = dt.as_secs_f32() * 1000.0;
        self.ticks += 1;
    }

    pub fn frame(&mut self) {
        self.frames += 1;

        let elapsed = self.last.elapsed().as_secs_f32();
        if elapsed < self.period_sec {
            return;
        }

        let secs = elapsed.max(0.0001);
        self.fps = (self.frames as f32) / secs;
        self.tps = (self.ticks as f32) / secs;

        if self.enabled {
            log::info!(
                target: "engine",
                "fps={:.1} tps={:.1} dt_ms={:.2}",
                self.fps, self.tps, self.dt_ms
            );
        }

        self.frames = 0;
        self.ticks = 0;
        self.last = Instant::now();
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
