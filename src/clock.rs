use embassy_time::Instant;

/// Monotonic millisecond counter that wraps to zero on overflow.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Milliseconds from `since` to `now`.
///
/// Stays correct across one rollover of the counter, as long as the real
/// gap is shorter than the counter period.
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Uptime from the embassy time driver, truncated to 32 bits so it rolls
/// over every ~49.7 days.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_without_rollover() {
        assert_eq!(elapsed_ms(500, 0), 500);
        assert_eq!(elapsed_ms(1_000, 1_000), 0);
    }

    #[test]
    fn elapsed_across_rollover() {
        assert_eq!(elapsed_ms(4, u32::MAX - 5), 10);
        assert_eq!(elapsed_ms(0, u32::MAX), 1);
    }

    #[test]
    fn embassy_clock_does_not_go_backwards() {
        let clock = EmbassyClock;
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(elapsed_ms(second, first) < 1_000);
    }
}
