// tests/bucket/concurrency_tests.rs

#[cfg(test)]
mod tests {

    use crate::fixtures::test_clock::TestClock;
    use std::sync::Arc;
    use std::sync::Barrier;
    use std::thread;
    use std::time::{Duration, Instant};
    use tokenbucket::{KeyedTokenBucket, TokenBucket, TokenBucketConfig};

    #[test]
    fn never_exceeds_configured_rate() {
        // 100 tokens/sec with no burst to speak of: 100 tokens need ~1s
        let bucket = Arc::new(TokenBucket::new(100, 1).unwrap());
        let before = Instant::now();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let bucket = Arc::clone(&bucket);
                thread::spawn(move || {
                    for _ in 0..10 {
                        while !bucket.try_consume(1).unwrap() {
                            thread::sleep(Duration::from_millis(10));
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // The first token is free, the other 99 cost 10ms each
        assert!(before.elapsed() >= Duration::from_millis(980));
    }

    #[test]
    fn racing_threads_share_exactly_one_burst() {
        const BURST: u64 = 64;
        let clock = TestClock::new(1.0);
        let bucket = Arc::new(
            TokenBucket::with_config(TokenBucketConfig::new(1, BURST), clock.clone()).unwrap(),
        );
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bucket = Arc::clone(&bucket);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..100).filter(|_| bucket.try_consume(1).unwrap()).count() as u64
                })
            })
            .collect();
        let admitted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // The clock never moves, so exactly the burst is admitted
        assert_eq!(admitted, BURST);
        assert!(!bucket.try_consume(1).unwrap());
    }

    #[test]
    fn racing_multi_token_requests_never_overdraw() {
        let clock = TestClock::new(0.0);
        let bucket = Arc::new(
            TokenBucket::with_config(TokenBucketConfig::new(1, 100), clock.clone()).unwrap(),
        );
        let barrier = Arc::new(Barrier::new(6));

        let handles: Vec<_> = (1..=6u64)
            .map(|size| {
                let bucket = Arc::clone(&bucket);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut taken = 0;
                    for _ in 0..50 {
                        if bucket.try_consume(size).unwrap() {
                            taken += size;
                        }
                    }
                    taken
                })
            })
            .collect();
        let taken: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert!(taken <= 100, "admitted {taken} tokens from a burst of 100");
        // Whatever is left over is exactly what the bucket reports
        assert_eq!(bucket.available().unwrap(), 100 - taken);
    }

    #[test]
    fn keyed_buckets_race_independently() {
        let clock = TestClock::new(0.0);
        let limiter = Arc::new(
            KeyedTokenBucket::with_config(TokenBucketConfig::new(1, 10), clock.clone()).unwrap(),
        );
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let limiter = Arc::clone(&limiter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let key = format!("client{}", i % 2);
                    (0..20)
                        .filter(|_| limiter.try_consume(key.clone(), 1).unwrap())
                        .count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // Two keys, ten tokens each
        assert_eq!(admitted, 20);
        assert_eq!(limiter.len(), 2);
    }
}
