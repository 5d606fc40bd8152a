//! Delivery contexts.
//!
//! - `DeliveryLoop`: a dedicated thread draining a task channel, for hosts
//!   without an event loop of their own
//! - `QueuedDelivery`: a queue the host pumps from its own loop

use crate::ports::{DeliveryContext, Task};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

enum LoopMessage {
    Run(Task),
    Shutdown,
}

/// Dedicated delivery thread.
///
/// Tasks run one at a time in submission order. A panicking task is logged
/// and the loop keeps serving later tasks.
pub struct DeliveryLoop {
    name: String,
    tx: mpsc::UnboundedSender<LoopMessage>,
    thread_id: ThreadId,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DeliveryLoop {
    /// Spawn the loop on a new named thread.
    pub fn spawn(name: impl Into<String>) -> io::Result<Self> {
        let name = name.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<LoopMessage>();

        let loop_name = name.clone();
        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            info!(delivery_loop = %loop_name, "Delivery loop started");
            let mut executed: u64 = 0;
            let mut panicked: u64 = 0;

            while let Some(message) = rx.blocking_recv() {
                match message {
                    LoopMessage::Run(task) => {
                        executed += 1;
                        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                            panicked += 1;
                            error!(
                                delivery_loop = %loop_name,
                                panic = %panic_message(payload.as_ref()),
                                "Delivery task panicked"
                            );
                        }
                    }
                    LoopMessage::Shutdown => break,
                }
            }

            info!(
                delivery_loop = %loop_name,
                tasks_executed = executed,
                tasks_panicked = panicked,
                "Delivery loop stopped"
            );
        })?;

        Ok(Self {
            name,
            tx,
            thread_id: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the current thread is the delivery thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Whether the loop still accepts tasks.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Stop after the tasks already queued and wait for the thread.
    ///
    /// When called from the delivery thread itself the loop is only told to
    /// stop.
    pub fn shutdown(&self) {
        let _ = self.tx.send(LoopMessage::Shutdown);

        if self.is_current() {
            return;
        }

        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                warn!(delivery_loop = %self.name, "Delivery loop terminated by a panic");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl DeliveryContext for DeliveryLoop {
    fn run(&self, task: Task) {
        if self.tx.send(LoopMessage::Run(task)).is_err() {
            warn!(delivery_loop = %self.name, "Delivery loop stopped, dropping task");
        }
    }
}

impl Drop for DeliveryLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Host-pumped delivery queue.
///
/// `run` only enqueues; tasks execute on whichever thread calls
/// `run_pending`.
#[derive(Default)]
pub struct QueuedDelivery {
    tasks: Mutex<VecDeque<Task>>,
}

impl QueuedDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run queued tasks, including any they enqueue, until the queue is
    /// empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut executed = 0;
        loop {
            // The lock is released before the task runs.
            let next = self.tasks.lock().pop_front();
            match next {
                Some(task) => {
                    task();
                    executed += 1;
                }
                None => break,
            }
        }
        if executed > 0 {
            debug!(executed = executed, "Ran queued deliveries");
        }
        executed
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

impl DeliveryContext for QueuedDelivery {
    fn run(&self, task: Task) {
        self.tasks.lock().push_back(task);
    }
}
