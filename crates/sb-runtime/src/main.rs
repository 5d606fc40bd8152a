//! # Script Bridge Demo Host
//!
//! Wires the bridge end to end and runs a handful of calls:
//!
//! 1. Initialize telemetry and load `BridgeConfig` from the environment
//! 2. Spawn the delivery loop, the transport and the simulated engine
//! 3. Build the dispatcher and a typed `Calculator` stub
//! 4. Dispatch calls from the delivery loop, collect their outcomes
//! 5. Report metrics and shut down

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sb_call_bridge::{
    script_interface, sweep_task, BridgeConfig, BridgeError, CallDispatcher, ChannelTransport,
    DeliveryContext, DeliveryLoop, FaultChannel,
};
use sb_runtime::ScriptEngine;
use sb_telemetry::{init_telemetry, TelemetryConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub tags: Vec<String>,
}

script_interface! {
    /// Calculator object defined by the demo script.
    pub struct Calculator as "calc" {
        fn add(a: i64, b: i64) -> i64;
        fn divide(a: f64, b: f64) -> f64;
        fn profile(id: u64) -> Profile as "loadProfile";
        fn reset();
    }
}

script_interface! {
    /// Script globals.
    pub struct Globals {
        fn version() -> String;
    }
}

/// Outcomes the demo waits for.
const DEMO_CALLS: usize = 5;

fn demo_engine(transport: Arc<ChannelTransport>) -> ScriptEngine {
    ScriptEngine::new(transport)
        .with_jitter(Duration::from_millis(25))
        .define("calc.add", |args| {
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(Some(json!(sum)))
        })
        .define("calc.divide", |args| match (args.first(), args.get(1)) {
            (Some(a), Some(b)) if b.as_f64() == Some(0.0) => {
                Err(format!("RangeError: cannot divide {} by zero", a))
            }
            (Some(a), Some(b)) => {
                let quotient = a.as_f64().unwrap_or_default() / b.as_f64().unwrap_or(1.0);
                Ok(Some(json!(quotient)))
            }
            _ => Err("TypeError: divide expects two numbers".to_string()),
        })
        .define("calc.loadProfile", |args| {
            let id = args.first().and_then(Value::as_u64).unwrap_or_default();
            Ok(Some(json!({ "id": id, "name": "ada", "tags": ["admin", "ops"] })))
        })
        .define("calc.reset", |_| Ok(None))
}

/// Dispatch the demo calls. Runs on the delivery loop, so every
/// continuation is attached before any completion can be delivered.
fn dispatch_demo_calls(
    calc: &Calculator,
    globals: &Globals,
    outcomes: mpsc::UnboundedSender<String>,
) -> Result<(), BridgeError> {
    let report = move |line: String| {
        let _ = outcomes.send(line);
    };

    let ok = report.clone();
    let err = report.clone();
    calc.add(2, 3)?
        .on_success(move |sum| ok(format!("calc.add(2, 3) = {:?}", sum)))
        .on_error(move |e| err(format!("calc.add failed: {}", e)));

    let ok = report.clone();
    let err = report.clone();
    calc.divide(1.0, 0.0)?
        .on_success(move |q| ok(format!("calc.divide(1, 0) = {:?}", q)))
        .on_error(move |e| err(format!("calc.divide(1, 0) failed: {}", e)));

    let ok = report.clone();
    let err = report.clone();
    calc.profile(7)?
        .on_success(move |profile| ok(format!("calc.loadProfile(7) = {:?}", profile)))
        .on_error(move |e| err(format!("calc.loadProfile failed: {}", e)));

    let ok = report.clone();
    calc.reset()?
        .on_success(move |_| ok("calc.reset() done".to_string()))
        .throw_on_error();

    let ok = report.clone();
    let err = report;
    globals
        .version()?
        .on_success(move |v| ok(format!("version() = {:?}", v)))
        .on_error(move |e| err(format!("version() failed: {}", e)));

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_component("runtime"))
        .context("Failed to initialize telemetry")?;

    let config = BridgeConfig::from_env().context("Invalid bridge configuration")?;
    info!(
        code_length = config.code_length,
        call_timeout_ms = config.call_timeout.map(|t| t.as_millis() as u64),
        "Starting script bridge demo"
    );

    let (transport, commands) = ChannelTransport::new();
    let delivery = Arc::new(
        DeliveryLoop::spawn("bridge-delivery").context("Failed to spawn delivery loop")?,
    );
    let (faults, mut fault_rx) = FaultChannel::new();

    let dispatcher = CallDispatcher::builder()
        .config(config.clone())
        .transport(transport.clone())
        .delivery(delivery.clone())
        .faults(Arc::new(faults))
        .build()
        .context("Failed to build call dispatcher")?;

    let engine = demo_engine(transport).spawn(commands);
    let sweeper = tokio::spawn(sweep_task(dispatcher.clone(), config.sweep_interval));

    let calc = Calculator::new(dispatcher.clone());
    let globals = Globals::new(dispatcher.clone());
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

    delivery.run(Box::new(move || {
        if let Err(e) = dispatch_demo_calls(&calc, &globals, outcome_tx) {
            error!(error = %e, "Failed to dispatch demo calls");
        }
    }));

    for _ in 0..DEMO_CALLS {
        match tokio::time::timeout(Duration::from_secs(5), outcome_rx.recv()).await {
            Ok(Some(line)) => info!(outcome = %line, "Call completed"),
            Ok(None) => break,
            Err(_) => {
                warn!("Timed out waiting for call outcomes");
                break;
            }
        }
    }

    while let Ok(fault) = fault_rx.try_recv() {
        warn!(fault = %fault, "Unhandled call error");
    }

    let snapshot = dispatcher.metrics().snapshot();
    info!(
        dispatched = snapshot.calls_dispatched,
        succeeded = snapshot.calls_succeeded,
        remote_errors = snapshot.remote_errors,
        pending = dispatcher.pending_count(),
        avg_latency_us = snapshot.avg_success_latency_us,
        "Demo finished"
    );

    sweeper.abort();
    engine.abort();
    delivery.shutdown();

    Ok(())
}
