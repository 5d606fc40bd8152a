//! In-process script transport over a tokio channel.

use crate::domain::{BridgeTargetId, ScriptCommand};
use crate::ports::{CallbackChannel, ScriptTransport};
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Hands commands to an in-process script runtime through an unbounded
/// channel and keeps the callback channels registered per target.
///
/// The runtime side owns the receiver and reports completions through
/// `callbacks(&command.target)`.
pub struct ChannelTransport {
    commands: mpsc::UnboundedSender<ScriptCommand>,
    targets: DashMap<BridgeTargetId, Weak<dyn CallbackChannel>>,
}

impl ChannelTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ScriptCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            commands: tx,
            targets: DashMap::new(),
        });
        (transport, rx)
    }

    /// Callback channel for `target`, if it is registered and still alive.
    pub fn callbacks(&self, target: &BridgeTargetId) -> Option<Arc<dyn CallbackChannel>> {
        self.targets.get(target)?.upgrade()
    }

    /// Forget targets whose dispatcher has been dropped.
    pub fn prune(&self) -> usize {
        let before = self.targets.len();
        self.targets.retain(|_, callbacks| callbacks.strong_count() > 0);
        before - self.targets.len()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl ScriptTransport for ChannelTransport {
    fn submit(&self, command: ScriptCommand) {
        if let Err(e) = self.commands.send(command) {
            let command = e.0;
            warn!(
                code = %command.code,
                function = %command.function,
                "Script runtime gone, command not delivered"
            );
        }
    }

    fn register_target(&self, target: &BridgeTargetId, callbacks: Weak<dyn CallbackChannel>) {
        debug!(target_id = %target, "Registered bridge target");
        self.targets.insert(target.clone(), callbacks);
    }
}
