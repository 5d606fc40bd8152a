//! Call Dispatcher - the host side of the bridge.
//!
//! Turns a function invocation into a `ScriptCommand`, remembers the call
//! under a fresh correlation code and routes the script runtime's completion
//! notifications back to the call's continuations.
//!
//! ```text
//! host ──dispatch──► registry.register ──► transport.submit ──► script runtime
//!                                                                   │
//! continuation ◄── delivery context ◄── on_*_notification ◄─────────┘
//! ```
//!
//! Notifications may arrive on any thread. They are marshaled onto the
//! delivery context before pending-call state is touched, so continuations
//! always run there.

use crate::adapters::{JsonCodec, PanicFaultSink, RandomCodeGenerator};
use crate::domain::{
    BridgeConfig, BridgeTargetId, CallOutput, Continuations, Delivery, ErrorFn,
    FunctionDescriptor, PendingCall, RawResponse, ResultShape, ResultType, ScriptCommand,
};
use crate::error::{BridgeError, ConversionError};
use crate::metrics::BridgeMetrics;
use crate::ports::{
    CallbackChannel, CodeGenerator, DeliveryContext, FaultSink, PayloadCodec, ScriptTransport,
    UnhandledFault,
};
use crate::service::{CallRegistry, PendingCallHandle};
use serde_json::Value;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Host-side call bridge.
///
/// Always shared as `Arc<CallDispatcher>`; the transport holds only a weak
/// reference for callbacks.
pub struct CallDispatcher {
    target: BridgeTargetId,
    config: BridgeConfig,
    transport: Arc<dyn ScriptTransport>,
    delivery: Arc<dyn DeliveryContext>,
    completion: Completion,
}

impl CallDispatcher {
    pub fn builder() -> CallDispatcherBuilder {
        CallDispatcherBuilder::default()
    }

    /// Dispatch a call to `function` with already-encoded arguments.
    ///
    /// Returns as soon as the command is submitted. The handle attaches
    /// continuations; attach them before yielding the delivery context.
    pub fn dispatch<T: CallOutput>(
        &self,
        function: FunctionDescriptor,
        args: Vec<Value>,
        result_type: ResultType,
    ) -> Result<PendingCallHandle<T>, BridgeError> {
        let shape = ResultShape::resolve(&result_type).map_err(|e| {
            warn!(
                function = %function.name,
                result_type = %result_type,
                "Rejected call with unsupported result type"
            );
            e
        })?;

        let registry = &self.completion.registry;
        let code = registry.allocate_code();
        let call = PendingCall::new(code.clone(), function.clone(), args.clone(), shape)
            .with_timeout(self.config.call_timeout);
        let slot = call.slot();

        // Registered before submission so a fast completion finds the entry.
        registry.register(code.clone(), call)?;

        self.transport.submit(ScriptCommand {
            target: self.target.clone(),
            function: function.remote.clone(),
            args,
            code: code.clone(),
        });
        self.completion.metrics.record_dispatched();

        debug!(
            code = %code,
            function = %function,
            bridge = %self.target,
            "Submitted script call"
        );

        Ok(PendingCallHandle::new(code, function.name, slot))
    }

    /// Dispatch with the result type taken from `T`.
    pub fn call<T: CallOutput>(
        &self,
        function: FunctionDescriptor,
        args: Vec<Value>,
    ) -> Result<PendingCallHandle<T>, BridgeError> {
        self.dispatch(function, args, T::result_type())
    }

    /// Fail every call pending longer than its timeout with `TimedOut`.
    ///
    /// Removal happens on the caller's thread; error routing happens on the
    /// delivery context. Returns the number of expired calls.
    pub fn expire_overdue(&self) -> usize {
        let expired = self.completion.registry.remove_expired(Instant::now());
        let count = expired.len();

        for call in expired {
            let completion = self.completion.clone();
            self.delivery
                .run(Box::new(move || completion.complete_expired(call)));
        }

        count
    }

    pub fn target(&self) -> &BridgeTargetId {
        &self.target
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn pending_count(&self) -> usize {
        self.completion.registry.pending_count()
    }

    pub fn registry(&self) -> &CallRegistry {
        &self.completion.registry
    }

    pub fn metrics(&self) -> &BridgeMetrics {
        &self.completion.metrics
    }
}

impl CallbackChannel for CallDispatcher {
    fn on_success_notification(&self, code: &str, payload: Option<String>) {
        let completion = self.completion.clone();
        let code = code.to_string();
        self.delivery
            .run(Box::new(move || completion.complete_success(&code, payload)));
    }

    fn on_error_notification(&self, code: &str, message: String) {
        let completion = self.completion.clone();
        let code = code.to_string();
        self.delivery
            .run(Box::new(move || completion.complete_error(&code, message)));
    }
}

/// Completion-side state, cloned into every delivery task.
#[derive(Clone)]
struct Completion {
    registry: Arc<CallRegistry>,
    codec: Arc<dyn PayloadCodec>,
    faults: Arc<dyn FaultSink>,
    metrics: Arc<BridgeMetrics>,
}

impl Completion {
    fn complete_success(&self, code: &str, payload: Option<String>) {
        let Some(call) = self.registry.resolve(code) else {
            self.metrics.record_unknown_completion();
            debug!(code = code, "Ignoring success for unknown or resolved call");
            return;
        };

        let Continuations {
            on_success,
            on_error,
            throw_on_unhandled_error,
        } = call.take_continuations();

        let Some(on_success) = on_success else {
            self.metrics.record_discarded();
            debug!(
                code = code,
                function = %call.function,
                "No success continuation, discarding result"
            );
            return;
        };

        let delivery = match (payload, &call.shape) {
            (None, _) | (_, ResultShape::NoValue) => Delivery::Nothing,
            (Some(text), ResultShape::RawPassthrough) => Delivery::Raw(RawResponse::new(text)),
            (Some(text), ResultShape::Decodable(target)) => {
                match self.codec.decode(&text, target) {
                    Ok(document) => Delivery::Document(document),
                    Err(e) => {
                        self.fail_conversion(&call, on_error, throw_on_unhandled_error, e);
                        return;
                    }
                }
            }
        };

        match on_success(delivery) {
            Ok(()) => {
                self.metrics.record_success(call.created_at.elapsed());
                debug!(code = code, function = %call.function, "Delivered call result");
            }
            Err(e) => self.fail_conversion(&call, on_error, throw_on_unhandled_error, e),
        }
    }

    fn complete_error(&self, code: &str, message: String) {
        let Some(call) = self.registry.resolve(code) else {
            self.metrics.record_unknown_completion();
            debug!(code = code, "Ignoring error for unknown or resolved call");
            return;
        };

        let continuations = call.take_continuations();
        self.metrics.record_remote_error();
        warn!(
            code = code,
            function = %call.function,
            reason = %message,
            "Script call failed"
        );

        let error = BridgeError::RemoteExecution {
            function: call.function.remote.to_string(),
            message,
        };
        self.route_error(
            &call,
            continuations.on_error,
            continuations.throw_on_unhandled_error,
            error,
        );
    }

    fn complete_expired(&self, call: PendingCall) {
        let continuations = call.take_continuations();
        let elapsed_ms = call.created_at.elapsed().as_millis() as u64;
        self.metrics.record_timeout();
        warn!(
            code = %call.code,
            function = %call.function,
            elapsed_ms = elapsed_ms,
            "Script call timed out"
        );

        let error = BridgeError::TimedOut {
            function: call.function.remote.to_string(),
            elapsed_ms,
        };
        self.route_error(
            &call,
            continuations.on_error,
            continuations.throw_on_unhandled_error,
            error,
        );
    }

    fn fail_conversion(
        &self,
        call: &PendingCall,
        on_error: Option<ErrorFn>,
        throw_on_unhandled_error: bool,
        error: ConversionError,
    ) {
        self.metrics.record_conversion_failure();
        warn!(
            code = %call.code,
            function = %call.function,
            error = %error,
            "Failed to convert script result"
        );
        self.route_error(call, on_error, throw_on_unhandled_error, error.into());
    }

    /// Error policy: continuation, else fault sink if opted in, else drop.
    fn route_error(
        &self,
        call: &PendingCall,
        on_error: Option<ErrorFn>,
        throw_on_unhandled_error: bool,
        error: BridgeError,
    ) {
        match on_error {
            Some(on_error) => on_error(error),
            None if throw_on_unhandled_error => {
                self.metrics.record_fault();
                self.faults.raise(UnhandledFault {
                    code: call.code.clone(),
                    function: call.function.name.clone(),
                    error,
                });
            }
            None => {
                self.metrics.record_dropped_error();
                warn!(
                    code = %call.code,
                    function = %call.function,
                    error = %error,
                    "Dropping unhandled call error"
                );
            }
        }
    }
}

/// Builder wiring a dispatcher to its collaborators.
///
/// Transport and delivery context are required. Codec, fault sink and code
/// generator default to `JsonCodec`, `PanicFaultSink` and
/// `RandomCodeGenerator`.
#[derive(Default)]
pub struct CallDispatcherBuilder {
    config: Option<BridgeConfig>,
    transport: Option<Arc<dyn ScriptTransport>>,
    delivery: Option<Arc<dyn DeliveryContext>>,
    codec: Option<Arc<dyn PayloadCodec>>,
    faults: Option<Arc<dyn FaultSink>>,
    codes: Option<Arc<dyn CodeGenerator>>,
    target: Option<BridgeTargetId>,
}

impl CallDispatcherBuilder {
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ScriptTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn delivery(mut self, delivery: Arc<dyn DeliveryContext>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn faults(mut self, faults: Arc<dyn FaultSink>) -> Self {
        self.faults = Some(faults);
        self
    }

    pub fn codes(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = Some(codes);
        self
    }

    /// Use a fixed target id instead of a random one.
    pub fn target(mut self, target: BridgeTargetId) -> Self {
        self.target = Some(target);
        self
    }

    /// Build the dispatcher and register it with the transport.
    pub fn build(self) -> Result<Arc<CallDispatcher>, BridgeError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let transport = self
            .transport
            .ok_or_else(|| BridgeError::Config("a script transport is required".to_string()))?;
        let delivery = self
            .delivery
            .ok_or_else(|| BridgeError::Config("a delivery context is required".to_string()))?;
        let codes = self
            .codes
            .unwrap_or_else(|| Arc::new(RandomCodeGenerator::new(config.code_length)));
        let target = self
            .target
            .unwrap_or_else(|| BridgeTargetId::random(config.target_id_length));

        let registry = CallRegistry::new(codes).with_max_code_attempts(config.max_code_attempts);

        let dispatcher = Arc::new(CallDispatcher {
            target,
            config,
            transport,
            delivery,
            completion: Completion {
                registry: Arc::new(registry),
                codec: self.codec.unwrap_or_else(|| Arc::new(JsonCodec::new())),
                faults: self.faults.unwrap_or_else(|| Arc::new(PanicFaultSink)),
                metrics: Arc::new(BridgeMetrics::new()),
            },
        });

        let weak = Arc::downgrade(&dispatcher);
        let callbacks: Weak<dyn CallbackChannel> = weak;
        dispatcher
            .transport
            .register_target(&dispatcher.target, callbacks);

        info!(
            target_id = %dispatcher.target,
            code_length = dispatcher.config.code_length,
            call_timeout_ms = dispatcher.config.call_timeout.map(|t| t.as_millis() as u64),
            "Call dispatcher ready"
        );

        Ok(dispatcher)
    }
}

/// Background task expiring overdue calls.
///
/// Exits immediately when no call timeout is configured.
pub async fn sweep_task(dispatcher: Arc<CallDispatcher>, interval: Duration) {
    if dispatcher.config.call_timeout.is_none() {
        debug!("No call timeout configured, expiry sweep not started");
        return;
    }

    let mut sweep_interval = tokio::time::interval(interval);
    sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep_interval.tick().await;
        let expired = dispatcher.expire_overdue();
        if expired > 0 {
            debug!(expired = expired, "Expired overdue script calls");
        }
    }
}
