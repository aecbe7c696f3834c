use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// A message pushed to the downstream work queue.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkQueueMessage {
    /// The updated JSON representation of an artifact vertex whose
    /// detected-object visibility changed.
    DetectedObjectChange(Value),
    /// An element whose visibility descriptor changed.
    ElementVisibilityChange(Value),
}

/// Fire-and-forget notification seam to downstream workers.
///
/// Delivery failures are the implementation's concern (log and drop);
/// publishing never fails because a notification could not be sent.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn push(&self, message: WorkQueueMessage);
}

/// In-process queue capturing messages, for tests and embedders.
#[derive(Debug, Default)]
pub struct InMemoryWorkQueue {
    messages: Mutex<Vec<WorkQueueMessage>>,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<WorkQueueMessage> {
        self.messages.lock().expect("work queue poisoned").clone()
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn push(&self, message: WorkQueueMessage) {
        self.messages.lock().expect("work queue poisoned").push(message);
    }
}
