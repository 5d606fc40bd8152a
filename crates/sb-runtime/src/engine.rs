//! Simulated script engine.

use rand::Rng;
use sb_call_bridge::{ChannelTransport, ScriptCommand};
use sb_telemetry::{call_span, log_call_event};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{info, warn, Instrument};

/// A script function: arguments in, serialized result text or an error
/// message out. `Ok(None)` means the function returned nothing.
pub type ScriptFunction = Arc<dyn Fn(&[Value]) -> Result<Option<String>, String> + Send + Sync>;

/// Evaluates bridge commands against registered functions.
pub struct ScriptEngine {
    transport: Arc<ChannelTransport>,
    functions: HashMap<String, ScriptFunction>,
    max_jitter: Duration,
}

impl ScriptEngine {
    pub fn new(transport: Arc<ChannelTransport>) -> Self {
        Self {
            transport,
            functions: HashMap::new(),
            max_jitter: Duration::from_millis(20),
        }
    }

    /// Upper bound of the random delay before each evaluation.
    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Define a function returning a JSON document.
    ///
    /// `name` is the script-side reference, e.g. `calc.add` or `version`.
    pub fn define<F>(self, name: &str, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Option<Value>, String> + Send + Sync + 'static,
    {
        self.define_text(name, move |args| {
            function(args)?
                .map(|value| serde_json::to_string(&value).map_err(|e| e.to_string()))
                .transpose()
        })
    }

    /// Define a function whose result text is reported verbatim.
    pub fn define_text<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Option<String>, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(function));
        self
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Process commands until the channel closes, then wait for in-flight
    /// evaluations. Returns the number of commands processed.
    pub async fn run(self, mut commands: mpsc::UnboundedReceiver<ScriptCommand>) -> u64 {
        info!(functions = self.functions.len(), "Script engine started");

        let engine = Arc::new(self);
        let mut in_flight = JoinSet::new();
        let mut processed = 0u64;

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    processed += 1;
                    let span = call_span!(command.code, command.function);
                    let engine = Arc::clone(&engine);
                    in_flight.spawn(async move { engine.evaluate(command).await }.instrument(span));
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            }
        }

        while in_flight.join_next().await.is_some() {}

        info!(processed = processed, "Script engine stopped");
        processed
    }

    /// Run the engine on the current tokio runtime.
    pub fn spawn(self, commands: mpsc::UnboundedReceiver<ScriptCommand>) -> JoinHandle<u64> {
        tokio::spawn(self.run(commands))
    }

    async fn evaluate(&self, command: ScriptCommand) {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms > 0 {
            let delay = rand::thread_rng().gen_range(0..=jitter_ms);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let Some(callbacks) = self.transport.callbacks(&command.target) else {
            warn!(
                code = %command.code,
                target_id = %command.target,
                "Bridge target gone, dropping completion"
            );
            return;
        };

        let name = command.function.to_string();
        let outcome = match self.functions.get(&name) {
            Some(function) => function(command.args.as_slice()),
            None => Err(format!("ReferenceError: {} is not defined", name)),
        };

        match outcome {
            Ok(payload) => {
                log_call_event!(debug, command.code, name, "Script function returned");
                callbacks.on_success_notification(command.code.as_str(), payload);
            }
            Err(message) => {
                log_call_event!(
                    debug,
                    command.code,
                    name,
                    "Script function threw",
                    message_text = %message
                );
                callbacks.on_error_notification(command.code.as_str(), message);
            }
        }
    }
}
