//! # Out-of-Order Completion
//!
//! Many concurrent calls, each answered after a random delay. Every result
//! must reach the continuation of the call that caused it, exactly once,
//! on the delivery thread.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{
        collector, eventually, recv, thread_name, Bridge, DELIVERY_THREAD,
    };
    use sb_call_bridge::BridgeConfig;
    use std::collections::HashSet;
    use std::time::Duration;

    const CALLS: i64 = 200;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_correlate() {
        let bridge = Bridge::start(BridgeConfig::default(), Duration::from_millis(30));
        let calc = bridge.calculator();
        let (tx, mut rx) = collector();

        bridge.on_delivery(move || {
            for i in 0..CALLS {
                let tx = tx.clone();
                calc.add(i, i * 1_000)
                    .unwrap()
                    .on_success(move |sum| {
                        let _ = tx.send((i, sum, thread_name()));
                    });
            }
        });

        let mut seen = HashSet::new();
        for _ in 0..CALLS {
            let (i, sum, thread) = recv(&mut rx).await;
            assert_eq!(sum, Some(i + i * 1_000), "call {} got another call's result", i);
            assert_eq!(thread.as_deref(), Some(DELIVERY_THREAD));
            assert!(seen.insert(i), "call {} delivered twice", i);
        }

        // Nothing further arrives once every call has completed.
        assert!(
            tokio::time::timeout(Duration::from_millis(100), rx.recv())
                .await
                .map_or(true, |next| next.is_none())
        );
        assert_eq!(bridge.dispatcher.pending_count(), 0);

        let metrics = bridge.dispatcher.metrics();
        assert!(eventually(|| metrics.snapshot().in_flight() == 0).await);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls_dispatched, CALLS as u64);
        assert_eq!(snapshot.calls_succeeded, CALLS as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_outcomes_settle() {
        let bridge = Bridge::start(BridgeConfig::default(), Duration::from_millis(20));
        let calc = bridge.calculator();
        let (tx, mut rx) = collector();

        bridge.on_delivery(move || {
            for i in 0..50_i64 {
                let ok = tx.clone();
                let err = tx.clone();
                if i % 2 == 0 {
                    calc.add(i, 1)
                        .unwrap()
                        .on_success(move |sum| {
                            let _ = ok.send((i, sum.is_some()));
                        })
                        .on_error(move |_| {
                            let _ = err.send((i, false));
                        });
                } else {
                    calc.missing()
                        .unwrap()
                        .on_success(move |_| {
                            let _ = ok.send((i, true));
                        })
                        .on_error(move |_| {
                            let _ = err.send((i, false));
                        });
                }
            }
        });

        let mut seen = HashSet::new();
        for _ in 0..50 {
            let (i, succeeded) = recv(&mut rx).await;
            assert_eq!(succeeded, i % 2 == 0);
            assert!(seen.insert(i));
        }

        let metrics = bridge.dispatcher.metrics();
        assert!(eventually(|| metrics.snapshot().in_flight() == 0).await);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls_succeeded, 25);
        assert_eq!(snapshot.remote_errors, 25);
        assert_eq!(bridge.dispatcher.pending_count(), 0);
    }
}
