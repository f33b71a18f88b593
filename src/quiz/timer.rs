/// Per-question countdown in whole seconds.
///
/// Never pauses and never goes below zero; navigation resets it to the full
/// limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    limit: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn expired(&self) -> bool {
        self.remaining == 0
    }

    /// Advances one second. Returns false once already at zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.remaining = self.limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_to_zero_and_stops() {
        let mut countdown = Countdown::new(45);
        let mut previous = countdown.remaining();
        while countdown.tick() {
            assert_eq!(countdown.remaining(), previous - 1);
            previous = countdown.remaining();
        }
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.expired());
        assert!(!countdown.tick());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_reset_restores_limit() {
        let mut countdown = Countdown::new(3);
        countdown.tick();
        countdown.tick();
        countdown.reset();
        assert_eq!(countdown.remaining(), 3);
    }
}
