use std::time::{Duration, Instant};

/// Client-side pause between chat sends. Advisory only; the server does
/// not enforce it.
#[derive(Debug, Clone)]
pub struct SendCooldown {
    window: Duration,
    until: Option<Instant>,
}

impl SendCooldown {
    pub fn new(window: Duration) -> Self {
        Self { window, until: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn start_at(&mut self, now: Instant) {
        self.until = Some(now + self.window);
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn is_active_at(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    /// Whole seconds left, rounded up, as shown in the countdown notice.
    pub fn remaining_secs_at(&self, now: Instant) -> u64 {
        match self.until {
            Some(until) if now < until => {
                let left = until - now;
                left.as_secs() + u64::from(left.subsec_nanos() > 0)
            }
            _ => 0,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs_at(Instant::now())
    }

    pub fn reset(&mut self) {
        self.until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_expires() {
        let mut cooldown = SendCooldown::new(Duration::from_secs(30));
        let start = Instant::now();
        assert!(!cooldown.is_active_at(start));

        cooldown.start_at(start);
        assert!(cooldown.is_active_at(start));
        assert_eq!(cooldown.remaining_secs_at(start), 30);
        assert_eq!(cooldown.remaining_secs_at(start + Duration::from_millis(10_500)), 20);
        assert!(!cooldown.is_active_at(start + Duration::from_secs(30)));
        assert_eq!(cooldown.remaining_secs_at(start + Duration::from_secs(31)), 0);
    }

    #[test]
    fn zero_window_never_blocks() {
        let mut cooldown = SendCooldown::new(Duration::ZERO);
        cooldown.start();
        assert!(!cooldown.is_active());
    }
}
