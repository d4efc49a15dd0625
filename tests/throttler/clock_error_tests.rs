// tests/throttler/clock_error_tests.rs

#[cfg(test)]
mod tests {

    use crate::fixtures::requests::{rates, release, tagged, throttler};
    use tag_throttler::{ClockError, EpochTimer, Priority};

    #[test]
    fn clock_failure_does_not_drop_requests() {
        let (throttler, clock) = throttler();
        throttler.update_rates(&rates(&[("T1", 10.0)]));

        clock.fail_next_call();
        throttler.add_request(tagged(1, Priority::Default, &["T1"]));
        throttler.add_request(tagged(2, Priority::Default, &["T1"]));

        assert_eq!(throttler.queued("T1"), Some(2));
        assert_eq!(release(&throttler, 1.0).default, [1, 2]);
    }

    #[test]
    fn clock_failure_during_release_still_releases() {
        let (throttler, clock) = throttler();
        throttler.update_rates(&rates(&[("T1", 1.0)]));
        throttler.add_request(tagged(1, Priority::Default, &["T1"]));
        throttler.add_request(tagged(2, Priority::Batch, &[]));

        clock.fail_next_call();
        let released = release(&throttler, 1.0);
        assert_eq!(released.default, [1]);
        assert_eq!(released.batch, [2]);
    }

    #[test]
    fn clock_going_backwards_is_tolerated() {
        let (throttler, clock) = throttler();
        throttler.update_rates(&rates(&[("T1", 2.0)]));

        clock.set_time(10.0);
        throttler.add_request(tagged(1, Priority::Default, &["T1"]));
        clock.set_time(4.0);
        throttler.add_request(tagged(2, Priority::Default, &["T1"]));

        assert_eq!(release(&throttler, 1.0).default, [1, 2]);
    }

    #[test]
    fn epoch_timer_drives_releases() {
        let (throttler, clock) = throttler();
        let mut timer = EpochTimer::new(clock.clone());
        throttler.update_rates(&rates(&[("T1", 4.0)]));
        for id in 0..6 {
            throttler.add_request(tagged(id, Priority::Default, &["T1"]));
        }

        clock.advance(0.5);
        assert_eq!(release(&throttler, timer.tick()).default, [0, 1]);

        clock.fail_next_call();
        assert!(release(&throttler, timer.tick()).default.is_empty());

        clock.advance(0.5);
        assert_eq!(release(&throttler, timer.tick()).default, [2, 3]);
    }

    #[test]
    fn clock_error_is_a_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(ClockError::SystemTimeError);
        assert_eq!(error.to_string(), "system time is before the unix epoch");
    }
}
