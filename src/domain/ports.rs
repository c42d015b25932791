use super::method::MethodCall;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// The boundary to the native checkout handler.
///
/// A call resolves to the host's reply, `None` when the host answered with
/// nothing. Transport failures are reported as errors.
#[async_trait]
pub trait CheckoutChannel: Send + Sync {
    async fn invoke(&self, call: MethodCall) -> Result<Option<Value>>;
}

pub type CheckoutChannelBox = Box<dyn CheckoutChannel>;

#[async_trait]
impl<C: CheckoutChannel + ?Sized> CheckoutChannel for Box<C> {
    async fn invoke(&self, call: MethodCall) -> Result<Option<Value>> {
        (**self).invoke(call).await
    }
}

#[async_trait]
impl<C: CheckoutChannel + ?Sized> CheckoutChannel for std::sync::Arc<C> {
    async fn invoke(&self, call: MethodCall) -> Result<Option<Value>> {
        (**self).invoke(call).await
    }
}
