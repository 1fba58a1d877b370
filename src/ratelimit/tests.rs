// src/ratelimit/tests.rs
//!
//! Tests for the per-domain fetch gate and its sweep
//!

#[cfg(test)]
mod tests {
    use crate::ratelimit::{DomainThrottle, ThrottleSweeper};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const INTERVAL: Duration = Duration::from_millis(1000);

    #[test]
    fn first_check_passes_and_records() {
        let throttle = DomainThrottle::new(INTERVAL);

        assert!(throttle.check_and_record("https://example.com/page"));
        assert_eq!(throttle.tracked_hosts(), 1);
    }

    #[test]
    fn second_check_within_interval_is_denied() {
        let throttle = DomainThrottle::new(INTERVAL);
        let now = Instant::now();

        assert!(throttle.check_and_record_at("https://example.com/a", now));
        assert!(!throttle.check_and_record_at("https://example.com/b", now + Duration::from_millis(500)));
    }

    #[test]
    fn check_passes_again_after_the_interval() {
        let throttle = DomainThrottle::new(INTERVAL);
        let now = Instant::now();

        assert!(throttle.check_and_record_at("https://example.com/", now));
        assert!(throttle.check_and_record_at("https://example.com/", now + INTERVAL));

        // The passing check overwrote the timestamp.
        assert!(!throttle.check_and_record_at(
            "https://example.com/",
            now + INTERVAL + Duration::from_millis(10)
        ));
    }

    #[test]
    fn hosts_are_throttled_independently() {
        let throttle = DomainThrottle::new(INTERVAL);
        let now = Instant::now();

        assert!(throttle.check_and_record_at("https://one.example/", now));
        assert!(throttle.check_and_record_at("https://two.example/", now));
        assert_eq!(throttle.tracked_hosts(), 2);
    }

    #[test]
    fn unparseable_url_fails_open_and_records_nothing() {
        let throttle = DomainThrottle::new(INTERVAL);

        assert!(throttle.check_and_record("not a url"));
        assert!(throttle.check_and_record("not a url"));
        assert_eq!(throttle.tracked_hosts(), 0);
    }

    #[test]
    fn url_without_host_fails_open() {
        let throttle = DomainThrottle::new(INTERVAL);

        assert!(throttle.check_and_record("data:text/plain,hello"));
        assert_eq!(throttle.tracked_hosts(), 0);
    }

    #[test]
    fn denied_check_does_not_touch_the_record() {
        let throttle = DomainThrottle::new(INTERVAL);
        let now = Instant::now();

        assert!(throttle.check_and_record_at("https://example.com/", now));
        // Denied halfway through; the original timestamp must still expire
        // on schedule.
        assert!(!throttle.check_and_record_at("https://example.com/", now + Duration::from_millis(900)));
        assert!(throttle.check_and_record_at("https://example.com/", now + INTERVAL));
    }

    #[test]
    fn sweep_removes_old_entries_and_keeps_young_ones() {
        let throttle = DomainThrottle::new(INTERVAL);
        let retention = Duration::from_secs(3600);
        let start = Instant::now();

        assert!(throttle.check_and_record_at("https://old.example/", start));
        assert!(throttle.check_and_record_at(
            "https://young.example/",
            start + Duration::from_secs(1800)
        ));

        let removed = throttle.sweep_at(retention, start + Duration::from_secs(3660));
        assert_eq!(removed, 1);
        assert_eq!(throttle.tracked_hosts(), 1);

        // The surviving entry is the young one: its host is still gated.
        assert!(!throttle.check_and_record_at(
            "https://young.example/",
            start + Duration::from_secs(1800) + Duration::from_millis(10)
        ));
    }

    #[test]
    fn sweep_of_empty_map_removes_nothing() {
        let throttle = DomainThrottle::new(INTERVAL);
        assert_eq!(throttle.sweep(Duration::from_secs(3600)), 0);
    }

    #[tokio::test]
    async fn sweeper_task_purges_on_its_cadence() {
        let throttle = Arc::new(DomainThrottle::new(INTERVAL));
        assert!(throttle.check_and_record("https://example.com/"));

        let sweeper = ThrottleSweeper::spawn(
            throttle.clone(),
            Duration::from_millis(20),
            Duration::from_millis(10),
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(throttle.tracked_hosts(), 0);

        sweeper.stop().await;
    }
}
