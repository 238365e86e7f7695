#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
fn now() -> f32 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| (p.now() / 1000.0) as f32)
}

#[cfg(not(target_arch = "wasm32"))]
fn now(start: Instant) -> f32 {
    start.elapsed().as_secs_f32()
}

/// Counts frames & reports frames per second every `rate` seconds
#[derive(Debug, Default, Clone)]
pub struct FpsCounter {
    frames: u32,
    accumulator: f32,
    fps: u32,
}

impl FpsCounter {
    /// Adds one frame that took `delta` seconds
    pub fn update(&mut self, delta: f32, rate: u32) {
        let rate = rate.max(1);
        self.frames += 1;
        self.accumulator += delta;
        if self.accumulator > rate as f32 {
            self.fps = self.frames / rate;
            self.accumulator -= rate as f32;
            self.frames = 0;
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Wall clock frame timing, advanced once per frame by the runner
pub struct FrameTimer {
    #[cfg(not(target_arch = "wasm32"))]
    start: Instant,
    last_time: f32,
    counter: FpsCounter,
    /// Time in seconds since the last frame
    pub delta: f32,
    /// Frames per second, updated once per second
    pub fps: u32,
    /// Total number of frames since start
    pub frame: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: Instant::now(),
            last_time: 0.0,
            counter: FpsCounter::default(),
            delta: 0.0,
            fps: 0,
            frame: 0,
        }
    }
}

impl FrameTimer {
    /// Reads the clock & advances by the time since the previous call
    pub fn update(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        let cur_time = now(self.start);
        #[cfg(target_arch = "wasm32")]
        let cur_time = now();

        let delta = cur_time - self.last_time;
        self.last_time = cur_time;
        self.tick(delta);
    }

    /// Advances by a known `delta` in seconds
    pub fn tick(&mut self, delta: f32) {
        self.delta = delta;
        self.frame += 1;
        self.counter.update(delta, 1);
        self.fps = self.counter.fps();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_after_each_period() {
        // the count is taken once the accumulator passes the rate
        let mut counter = FpsCounter::default();
        for _ in 0..8 {
            counter.update(0.125, 1);
        }
        assert_eq!(counter.fps(), 0);
        counter.update(0.125, 1);
        assert_eq!(counter.fps(), 9);
    }

    #[test]
    fn longer_rates_average() {
        // frames are divided by the rate in seconds
        let mut counter = FpsCounter::default();
        for _ in 0..9 {
            counter.update(0.25, 2);
        }
        assert_eq!(counter.fps(), 4);
    }

    #[test]
    fn timer_ticks() {
        // delta & frame count follow each tick
        let mut timer = FrameTimer::default();
        timer.tick(0.5);
        timer.tick(0.25);
        assert_eq!(timer.frame, 2);
        assert_eq!(timer.delta, 0.25);
        assert_eq!(timer.fps, 0);
        timer.tick(0.5);
        assert_eq!(timer.fps, 3);
    }
}
