//! One-shot delays for the cooking countdown. Each request is tagged with the
//! session's timer generation so stale completions can be told apart.

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOperation {
    /// Resolve after `millis`.
    Start { generation: u64, millis: u64 },
    /// Drop any pending delay for `generation`. Fire-and-forget.
    Cancel { generation: u64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOutput {
    Elapsed { generation: u64 },
    Cancelled,
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

#[derive(Capability)]
pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Timer<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn start<F>(&self, generation: u64, millis: u64, callback: F)
    where
        F: FnOnce(TimerOutput) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(TimerOperation::Start { generation, millis })
                .await;
            ctx.update_app(callback(output));
        });
    }

    pub fn cancel(&self, generation: u64)
    where
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(TimerOperation::Cancel { generation }).await;
        });
    }
}
