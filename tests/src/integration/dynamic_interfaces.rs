//! # Dynamic Interfaces
//!
//! `DynamicStub` bound from a JSON interface description and driven
//! against the simulated engine.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{collector, recv, thread_name, Bridge, DELIVERY_THREAD};
    use sb_call_bridge::{
        BridgeConfig, BridgeError, ConversionError, DynamicStub, InterfaceDescription,
    };
    use serde_json::json;
    use std::time::Duration;

    const CALC: &str = r#"{
        "variable": "calc",
        "functions": [
            { "name": "add", "args": ["integer", "integer"], "result": "integer" },
            { "name": "sumAsText", "remote_name": "add", "args": ["integer", "integer"], "result": "string" },
            { "name": "foo", "remote_name": "makeFoo", "args": ["integer"], "result": "object" },
            { "name": "rawFoo", "remote_name": "makeFoo", "args": ["integer"], "result": "raw" },
            { "name": "reset" }
        ]
    }"#;

    const JITTER: Duration = Duration::from_millis(5);

    fn stub(bridge: &Bridge) -> DynamicStub {
        let description = InterfaceDescription::from_json(CALC).unwrap();
        DynamicStub::new(bridge.dispatcher.clone(), description).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_declared_functions_round_trip() {
        let bridge = Bridge::start(BridgeConfig::default(), JITTER);
        let calc = stub(&bridge);
        let (tx, mut rx) = collector();

        bridge.on_delivery(move || {
            let sum = tx.clone();
            calc.call("add", vec![json!(20), json!(22)])
                .unwrap()
                .on_success(move |v| {
                    let _ = sum.send(("add", v, thread_name()));
                });
            let foo = tx.clone();
            calc.call("foo", vec![json!(3)])
                .unwrap()
                .on_success(move |v| {
                    let _ = foo.send(("foo", v, thread_name()));
                });
            let reset = tx;
            calc.call("reset", vec![])
                .unwrap()
                .on_success(move |v| {
                    let _ = reset.send(("reset", v, thread_name()));
                });
        });

        let mut outcomes = Vec::new();
        for _ in 0..3 {
            outcomes.push(recv(&mut rx).await);
        }
        outcomes.sort_by_key(|(name, _, _)| *name);

        assert_eq!(outcomes[0].0, "add");
        assert_eq!(outcomes[0].1, Some(json!(42)));
        assert_eq!(outcomes[1].0, "foo");
        assert_eq!(outcomes[1].1, Some(json!({ "x": 3 })));
        assert_eq!(outcomes[2].0, "reset");
        assert_eq!(outcomes[2].1, None);
        assert!(outcomes
            .iter()
            .all(|(_, _, thread)| thread.as_deref() == Some(DELIVERY_THREAD)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_raw_result_is_verbatim() {
        let bridge = Bridge::start(BridgeConfig::default(), JITTER);
        let calc = stub(&bridge);
        let (tx, mut rx) = collector();

        bridge.on_delivery(move || {
            calc.call("rawFoo", vec![json!(9)])
                .unwrap()
                .on_success(move |v| {
                    let _ = tx.send(v);
                });
        });

        // Raw text arrives as a JSON string holding the payload.
        let text = recv(&mut rx).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.as_str().unwrap()).unwrap();
        assert_eq!(parsed, json!({ "x": 9 }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_declared_kind_mismatch_is_conversion_error() {
        let bridge = Bridge::start(BridgeConfig::default(), JITTER);
        let calc = stub(&bridge);
        let (tx, mut rx) = collector();

        bridge.on_delivery(move || {
            calc.call("sumAsText", vec![json!(1), json!(2)])
                .unwrap()
                .on_success(|_| panic!("an integer is not a string"))
                .on_error(move |e| {
                    let _ = tx.send(e);
                });
        });

        assert!(matches!(
            recv(&mut rx).await,
            BridgeError::Conversion(ConversionError::ShapeMismatch { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rejected_calls_never_reach_the_engine() {
        let bridge = Bridge::start(BridgeConfig::default(), JITTER);
        let calc = stub(&bridge);

        assert!(matches!(
            calc.call("subtract", vec![]),
            Err(BridgeError::UnknownFunction(name)) if name == "subtract"
        ));
        assert!(matches!(
            calc.call("add", vec![json!(1)]),
            Err(BridgeError::ArgumentMismatch { .. })
        ));
        assert!(matches!(
            calc.call("add", vec![json!(1), json!("two")]),
            Err(BridgeError::ArgumentMismatch { .. })
        ));

        assert_eq!(bridge.dispatcher.pending_count(), 0);
        assert_eq!(bridge.dispatcher.metrics().snapshot().calls_dispatched, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unsupported_result_type_fails_binding() {
        let bridge = Bridge::start(BridgeConfig::default(), JITTER);
        let description = InterfaceDescription::from_json(
            r#"{ "functions": [ { "name": "widget", "result": "Widget" } ] }"#,
        )
        .unwrap();

        let err = DynamicStub::new(bridge.dispatcher.clone(), description)
            .err()
            .unwrap();
        assert_eq!(err, BridgeError::UnsupportedResultType("Widget".into()));
    }
}
