/// Fixed-cadence tick scheduler without catch-up.
#[derive(Debug, Clone)]
pub struct Clock {
    interval: std::time::Duration,
    next_tick: std::time::Instant,
    ticks: u64,
}

impl Clock {
    pub fn new(timestep: f32, now: std::time::Instant) -> Self {
        let interval = std::time::Duration::from_secs_f32(timestep);
        Self {
            interval,
            next_tick: now + interval,
            ticks: 0,
        }
    }

    pub fn poll(&mut self, now: std::time::Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        self.next_tick = now + self.interval;
        self.ticks += 1;
        true
    }

    pub fn next_tick(&self) -> std::time::Instant {
        self.next_tick
    }

    pub fn interval(&self) -> std::time::Duration {
        self.interval
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
