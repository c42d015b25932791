use crate::domain::method::{Method, MethodCall};
use crate::domain::ports::CheckoutChannel;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(Value),
    Error(String),
}

/// A scripted stand-in for the native handler.
///
/// Replies are configured per method with the `with_*` builders, which should
/// be used before the channel is cloned. Every call is recorded, `initilizeSDK`
/// stores the session key, and `resync` drains the single buffered result.
/// Methods without a scripted reply answer `null`.
#[derive(Default, Clone)]
pub struct InMemoryChannel {
    replies: Arc<HashMap<Method, Scripted>>,
    calls: Arc<RwLock<Vec<MethodCall>>>,
    pending: Arc<RwLock<Option<Value>>>,
    session_key: Arc<RwLock<Option<String>>>,
}

impl InMemoryChannel {
    /// Creates a channel with no scripted replies and nothing buffered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a channel from a JSON object mapping wire method names to
    /// replies. A non-null `"resync"` entry becomes the buffered result.
    pub fn from_fixture(fixture: Map<String, Value>) -> Result<Self> {
        let mut channel = Self::new();
        for (name, reply) in fixture {
            let method: Method = name.parse()?;
            channel = match method {
                Method::Resync if reply.is_null() => channel,
                Method::Resync => channel.with_pending(reply),
                _ => channel.with_reply(method, reply),
            };
        }
        Ok(channel)
    }

    pub fn with_reply(mut self, method: Method, reply: Value) -> Self {
        Arc::make_mut(&mut self.replies).insert(method, Scripted::Reply(reply));
        self
    }

    /// Makes `method` fail in transport with `message`.
    pub fn with_error(mut self, method: Method, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.replies).insert(method, Scripted::Error(message.into()));
        self
    }

    /// Starts with `envelope` buffered, as if a result arrived while nobody
    /// was listening.
    pub fn with_pending(mut self, envelope: Value) -> Self {
        self.pending = Arc::new(RwLock::new(Some(envelope)));
        self
    }

    /// Buffers a result for the next `resync`, replacing any earlier one.
    pub async fn buffer_result(&self, envelope: Value) {
        *self.pending.write().await = Some(envelope);
    }

    /// Arguments of every call made to `method`, in call order.
    pub async fn calls_to(&self, method: Method) -> Vec<Value> {
        let calls = self.calls.read().await;
        calls
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.arguments.clone())
            .collect()
    }

    pub async fn call_count(&self, method: Method) -> usize {
        let calls = self.calls.read().await;
        calls.iter().filter(|c| c.method == method).count()
    }

    pub async fn session_key(&self) -> Option<String> {
        self.session_key.read().await.clone()
    }

    pub async fn has_pending(&self) -> bool {
        self.pending.read().await.is_some()
    }
}

#[async_trait]
impl CheckoutChannel for InMemoryChannel {
    async fn invoke(&self, call: MethodCall) -> Result<Option<Value>> {
        debug!(method = %call.method, "in-memory call");
        let method = call.method;
        let arguments = call.arguments.clone();
        self.calls.write().await.push(call);

        if let Some(Scripted::Error(message)) = self.replies.get(&method) {
            return Err(BridgeError::PlatformError {
                method: method.to_string(),
                code: "ERROR".to_string(),
                message: message.clone(),
            });
        }

        match method {
            Method::InitializeSdk => {
                *self.session_key.write().await = arguments.as_str().map(str::to_string);
                Ok(None)
            }
            Method::Resync => Ok(self.pending.write().await.take()),
            _ => Ok(match self.replies.get(&method) {
                Some(Scripted::Reply(reply)) => Some(reply.clone()),
                _ => None,
            }),
        }
    }
}
