use crate::domain::envelope::{CheckoutEvent, Envelope};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A registered result callback.
pub type Handler = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Listeners keyed by event, invoked in registration order.
///
/// Handlers are only ever removed all at once through [`ListenerRegistry::clear`].
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    handlers: Arc<RwLock<HashMap<CheckoutEvent, Vec<Handler>>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, event: CheckoutEvent, handler: Handler) {
        let mut handlers = self.handlers.write().await;
        handlers.entry(event).or_default().push(handler);
    }

    /// Delivers `payload` to every handler of `event` and returns how many ran.
    ///
    /// The handler list is copied out first, so the read lock is not held
    /// while handlers run.
    pub async fn emit(&self, event: CheckoutEvent, payload: &Envelope) -> usize {
        let snapshot: Vec<Handler> = {
            let handlers = self.handlers.read().await;
            handlers.get(&event).cloned().unwrap_or_default()
        };
        for handler in &snapshot {
            handler(payload);
        }
        snapshot.len()
    }

    pub async fn clear(&self) {
        self.handlers.write().await.clear();
    }
}
