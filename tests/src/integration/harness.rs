//! Shared fixture: a dispatcher wired to a `DeliveryLoop`, a
//! `ChannelTransport` and a simulated engine.

use parking_lot::Mutex;
use sb_call_bridge::{
    script_interface, BridgeConfig, CallDispatcher, ChannelTransport, CodeGenerator,
    CorrelationCode, DeliveryContext, DeliveryLoop, FaultChannel, UnhandledFault,
};
use sb_runtime::ScriptEngine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

/// Thread name of the delivery loop in every fixture.
pub const DELIVERY_THREAD: &str = "test-delivery";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Foo {
    pub x: i32,
}

script_interface! {
    /// Calculator the fixture engine defines.
    pub struct Calculator as "calc" {
        fn add(a: i64, b: i64) -> i64;
        fn echo(value: Value) -> Value;
        fn foo(x: i32) -> Foo as "makeFoo";
        fn broken() -> Foo;
        fn missing() -> i64;
        fn reset();
    }
}

/// Engine defining the `calc` functions above (except `missing`).
pub fn calculator_engine(transport: Arc<ChannelTransport>, jitter: Duration) -> ScriptEngine {
    ScriptEngine::new(transport)
        .with_jitter(jitter)
        .define("calc.add", |args| {
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(Some(json!(sum)))
        })
        .define("calc.echo", |args| Ok(args.first().cloned()))
        .define("calc.makeFoo", |args| {
            Ok(Some(json!({ "x": args.first().cloned().unwrap_or(Value::Null) })))
        })
        .define_text("calc.broken", |_| Ok(Some("{\"x\": \"not a number\"".to_string())))
        .define("calc.reset", |_| Ok(None))
}

/// Hands out a fixed sequence of codes, then random ones.
pub struct FixedCodes(Mutex<VecDeque<&'static str>>);

impl FixedCodes {
    pub fn new(codes: &[&'static str]) -> Arc<Self> {
        Arc::new(Self(Mutex::new(codes.iter().copied().collect())))
    }
}

impl CodeGenerator for FixedCodes {
    fn generate(&self) -> CorrelationCode {
        match self.0.lock().pop_front() {
            Some(code) => CorrelationCode::from(code),
            None => CorrelationCode::random_numeric(&mut rand::thread_rng(), 5),
        }
    }
}

/// A running bridge. Must be created inside a tokio runtime.
pub struct Bridge {
    pub dispatcher: Arc<CallDispatcher>,
    pub transport: Arc<ChannelTransport>,
    pub delivery: Arc<DeliveryLoop>,
    pub faults: UnboundedReceiver<UnhandledFault>,
    engine: JoinHandle<u64>,
}

impl Bridge {
    pub fn start(config: BridgeConfig, jitter: Duration) -> Self {
        let (transport, commands) = ChannelTransport::new();
        let delivery = Arc::new(DeliveryLoop::spawn(DELIVERY_THREAD).unwrap());
        let (faults, fault_rx) = FaultChannel::new();

        let dispatcher = CallDispatcher::builder()
            .config(config)
            .transport(transport.clone())
            .delivery(delivery.clone())
            .faults(Arc::new(faults))
            .build()
            .unwrap();

        let engine = calculator_engine(transport.clone(), jitter).spawn(commands);

        Self {
            dispatcher,
            transport,
            delivery,
            faults: fault_rx,
            engine,
        }
    }

    pub fn calculator(&self) -> Calculator {
        Calculator::new(self.dispatcher.clone())
    }

    /// Run `f` on the delivery loop, where calls should be dispatched from.
    pub fn on_delivery<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.delivery.run(Box::new(f));
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.engine.abort();
    }
}

/// Receive one item or fail after two seconds.
pub async fn recv<T>(rx: &mut UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a delivery")
        .expect("channel closed")
}

/// Name of the current thread, for delivery-context assertions.
pub fn thread_name() -> Option<String> {
    std::thread::current().name().map(str::to_string)
}

/// Sender/receiver pair for collecting continuation results.
pub fn collector<T>() -> (mpsc::UnboundedSender<T>, UnboundedReceiver<T>) {
    mpsc::unbounded_channel()
}

/// Poll `condition` until it holds or two seconds pass.
///
/// Metrics are updated after a continuation returns, so assertions on them
/// may briefly lag the delivery the test observed.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
