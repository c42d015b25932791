use super::registry::{Handler, ListenerRegistry};
use crate::domain::envelope::{CheckoutEvent, Envelope, ErrorCode};
use crate::domain::method::{Method, MethodCall};
use crate::domain::options::{CheckoutOptions, MISSING_KEY_MESSAGE};
use crate::domain::ports::CheckoutChannelBox;
use crate::error::{BridgeError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Facade over the native checkout handler.
///
/// Checkout attempts never return errors to the caller: every outcome is
/// classified as [`CheckoutEvent::Success`] or [`CheckoutEvent::Failure`] and
/// delivered to the listeners registered with [`Razorpay::on`]. Lookups in the
/// query family are plain passthroughs and do return transport errors.
pub struct Razorpay {
    channel: CheckoutChannelBox,
    listeners: ListenerRegistry,
}

impl Razorpay {
    /// Creates a facade with an empty listener registry.
    pub fn new(channel: CheckoutChannelBox) -> Self {
        Self {
            channel,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Hands the merchant API key to the host. Failures are only logged; the
    /// host reports them later through a checkout result if at all.
    pub async fn initialize(&self, api_key: &str) {
        let call = MethodCall::new(Method::InitializeSdk, json!(api_key));
        if let Err(e) = self.channel.invoke(call).await {
            warn!(error = %e, "initializing the native SDK failed");
        }
    }

    /// Opens the standard checkout.
    pub async fn submit(&self, options: CheckoutOptions) {
        self.checkout(Method::Submit, options).await;
    }

    /// Opens checkout on the CRED payment rail.
    pub async fn pay_with_cred(&self, options: CheckoutOptions) {
        self.checkout(Method::PayWithCred, options).await;
    }

    /// Registers `handler` for `event`, then asks the host for any result it
    /// buffered while nobody was listening.
    pub async fn on<F>(&self, event: CheckoutEvent, handler: F)
    where
        F: Fn(&Envelope) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        self.listeners.register(event, handler).await;
        self.resync().await;
    }

    /// Registers `handler` for both events and resyncs once, so a buffered
    /// result reaches it whichever way it classifies.
    pub async fn on_all<F>(&self, handler: F)
    where
        F: Fn(CheckoutEvent, &Envelope) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        for event in [CheckoutEvent::Success, CheckoutEvent::Failure] {
            let handler = Arc::clone(&handler);
            let per_event: Handler =
                Arc::new(move |envelope: &Envelope| handler(event, envelope));
            self.listeners.register(event, per_event).await;
        }
        self.resync().await;
    }

    /// Drops every listener for both events.
    pub async fn clear(&self) {
        self.listeners.clear().await;
    }

    pub async fn payment_methods(&self) -> Result<Map<String, Value>> {
        self.query(Method::GetPaymentMethods, Value::Null).await
    }

    pub async fn apps_which_support_upi(&self) -> Result<Vec<String>> {
        self.query(Method::GetAppsWhichSupportUpi, Value::Null).await
    }

    pub async fn card_network(&self, card_number: &str) -> Result<String> {
        self.query(Method::GetCardNetwork, json!(card_number)).await
    }

    pub async fn is_cred_app_available(&self) -> Result<bool> {
        self.query(Method::IsCredAppAvailable, Value::Null).await
    }

    pub async fn wallet_logo_url(&self, wallet_name: &str) -> Result<String> {
        self.query(Method::GetWalletLogoUrl, json!(wallet_name)).await
    }

    pub async fn bank_logo_url(&self, bank_name: &str) -> Result<String> {
        self.query(Method::GetBankLogoUrl, json!(bank_name)).await
    }

    pub async fn subscription_amount(&self, subscription_id: &str) -> Result<Value> {
        self.query(Method::GetSubscriptionAmount, json!(subscription_id))
            .await
    }

    pub async fn card_network_length(&self, network: &str) -> Result<i64> {
        self.query(Method::GetCardNetworkLength, json!(network)).await
    }

    pub async fn is_valid_card_number(&self, network: &str) -> Result<bool> {
        self.query(Method::IsValidCardNumber, json!(network)).await
    }

    pub async fn is_valid_vpa(&self, address: &str) -> Result<Map<String, Value>> {
        self.query(Method::IsValidVpa, json!(address)).await
    }

    async fn checkout(&self, method: Method, options: CheckoutOptions) {
        if options.validate().is_err() {
            debug!(%method, "rejecting options without a key");
            let envelope = Envelope::failure(ErrorCode::InvalidOptions, MISSING_KEY_MESSAGE);
            self.dispatch(&envelope).await;
            return;
        }

        let call = MethodCall::new(method, options.to_value());
        let envelope = match self.channel.invoke(call).await {
            Ok(reply) => Envelope::from_reply(reply),
            Err(e) => {
                warn!(%method, error = %e, "checkout call failed in transport");
                Envelope::failure(ErrorCode::UnknownError, e.to_string())
            }
        };
        self.dispatch(&envelope).await;
    }

    async fn resync(&self) {
        match self.channel.invoke(MethodCall::bare(Method::Resync)).await {
            Ok(Some(Value::Null)) | Ok(None) => {}
            Ok(Some(reply)) => {
                debug!("delivering result buffered by the host");
                let envelope = Envelope::from_reply(Some(reply));
                self.dispatch(&envelope).await;
            }
            Err(e) => warn!(error = %e, "resync failed"),
        }
    }

    async fn dispatch(&self, envelope: &Envelope) -> CheckoutEvent {
        let event = envelope.classify();
        let delivered = self.listeners.emit(event, envelope).await;
        debug!(event = event.name(), delivered, "dispatched checkout result");
        event
    }

    async fn query<T: DeserializeOwned>(&self, method: Method, arguments: Value) -> Result<T> {
        let reply = self
            .channel
            .invoke(MethodCall::new(method, arguments))
            .await?
            .unwrap_or(Value::Null);
        serde_json::from_value(reply).map_err(|e| BridgeError::UnexpectedResponse {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryChannel;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<(CheckoutEvent, Envelope)>>>;

    async fn listen_both(razorpay: &Razorpay) -> Log {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        for event in [CheckoutEvent::Success, CheckoutEvent::Failure] {
            let log = Arc::clone(&log);
            razorpay
                .on(event, move |envelope| {
                    log.lock().unwrap().push((event, envelope.clone()))
                })
                .await;
        }
        log
    }

    #[tokio::test]
    async fn test_submit_without_key_never_reaches_host() {
        let channel = InMemoryChannel::new();
        let razorpay = Razorpay::new(Box::new(channel.clone()));
        let log = listen_both(&razorpay).await;

        razorpay.submit(CheckoutOptions::default()).await;

        let events = log.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        let (event, payload) = &events[0];
        assert_eq!(*event, CheckoutEvent::Failure);
        assert_eq!(payload.failure_view().error_code(), Some(ErrorCode::InvalidOptions));
        assert_eq!(payload.failure_view().message.as_deref(), Some(MISSING_KEY_MESSAGE));
        assert_eq!(channel.call_count(Method::Submit).await, 0);
    }

    #[tokio::test]
    async fn test_submit_forwards_options_unmodified() {
        let channel = InMemoryChannel::new()
            .with_reply(Method::Submit, json!({"razorpay_payment_id": "pay_1"}));
        let razorpay = Razorpay::new(Box::new(channel.clone()));
        let log = listen_both(&razorpay).await;
        let options = CheckoutOptions::default()
            .with("key", "rzp_test_1")
            .with("amount", 5000);

        razorpay.submit(options.clone()).await;

        assert_eq!(
            channel.calls_to(Method::Submit).await,
            vec![options.to_value()]
        );
        let events = log.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, CheckoutEvent::Success);
    }

    #[tokio::test]
    async fn test_pay_with_cred_uses_its_own_entry_point() {
        let channel =
            InMemoryChannel::new().with_reply(Method::PayWithCred, json!({"type": 0}));
        let razorpay = Razorpay::new(Box::new(channel.clone()));
        let log = listen_both(&razorpay).await;

        razorpay
            .pay_with_cred(CheckoutOptions::default().with("key", "rzp_test_1"))
            .await;

        assert_eq!(channel.call_count(Method::PayWithCred).await, 1);
        assert_eq!(channel.call_count(Method::Submit).await, 0);
        assert_eq!(log.lock().unwrap()[0].0, CheckoutEvent::Success);
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_failure_event() {
        let channel = InMemoryChannel::new().with_error(Method::Submit, "host unreachable");
        let razorpay = Razorpay::new(Box::new(channel));
        let log = listen_both(&razorpay).await;

        razorpay
            .submit(CheckoutOptions::default().with("key", "rzp_test_1"))
            .await;

        let events = log.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, CheckoutEvent::Failure);
        assert_eq!(
            events[0].1.failure_view().error_code(),
            Some(ErrorCode::UnknownError)
        );
    }

    #[tokio::test]
    async fn test_null_submit_reply_is_failure() {
        let channel = InMemoryChannel::new().with_reply(Method::Submit, Value::Null);
        let razorpay = Razorpay::new(Box::new(channel));
        let log = listen_both(&razorpay).await;

        razorpay
            .submit(CheckoutOptions::default().with("key", "rzp_test_1"))
            .await;

        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec![(CheckoutEvent::Failure, Envelope::default())]);
    }

    #[tokio::test]
    async fn test_bare_string_submit_reply_is_kept_in_payload() {
        let channel = InMemoryChannel::new().with_reply(Method::Submit, json!("pay_1"));
        let razorpay = Razorpay::new(Box::new(channel));
        let log = listen_both(&razorpay).await;

        razorpay
            .submit(CheckoutOptions::default().with("key", "rzp_test_1"))
            .await;

        let events = log.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, CheckoutEvent::Failure);
        assert_eq!(events[0].1.get("response"), Some(&json!("pay_1")));
    }

    #[tokio::test]
    async fn test_initialize_forwards_key() {
        let channel = InMemoryChannel::new();
        let razorpay = Razorpay::new(Box::new(channel.clone()));

        razorpay.initialize("rzp_test_1").await;

        assert_eq!(
            channel.calls_to(Method::InitializeSdk).await,
            vec![json!("rzp_test_1")]
        );
        assert_eq!(channel.session_key().await.as_deref(), Some("rzp_test_1"));
    }

    #[tokio::test]
    async fn test_initialize_swallows_transport_errors() {
        let channel = InMemoryChannel::new().with_error(Method::InitializeSdk, "boom");
        let razorpay = Razorpay::new(Box::new(channel.clone()));

        razorpay.initialize("rzp_test_1").await;

        assert_eq!(channel.call_count(Method::InitializeSdk).await, 1);
    }

    #[tokio::test]
    async fn test_queries_decode_host_replies() {
        let channel = InMemoryChannel::new()
            .with_reply(Method::GetCardNetwork, json!("VISA"))
            .with_reply(Method::GetCardNetworkLength, json!(16))
            .with_reply(Method::IsCredAppAvailable, json!(false))
            .with_reply(Method::GetAppsWhichSupportUpi, json!(["gpay", "phonepe"]))
            .with_reply(Method::IsValidVpa, json!({"success": true}));
        let razorpay = Razorpay::new(Box::new(channel.clone()));

        assert_eq!(razorpay.card_network("4111111111111111").await.unwrap(), "VISA");
        assert_eq!(razorpay.card_network_length("VISA").await.unwrap(), 16);
        assert!(!razorpay.is_cred_app_available().await.unwrap());
        assert_eq!(
            razorpay.apps_which_support_upi().await.unwrap(),
            vec!["gpay".to_string(), "phonepe".to_string()]
        );
        assert_eq!(razorpay.is_valid_vpa("user@upi").await.unwrap()["success"], json!(true));
        assert_eq!(
            channel.calls_to(Method::GetCardNetwork).await,
            vec![json!("4111111111111111")]
        );
    }

    #[tokio::test]
    async fn test_query_errors_propagate() {
        let channel = InMemoryChannel::new()
            .with_error(Method::GetBankLogoUrl, "timeout")
            .with_reply(Method::IsValidCardNumber, json!("yes"));
        let razorpay = Razorpay::new(Box::new(channel));

        assert!(razorpay.bank_logo_url("HDFC").await.is_err());
        assert!(matches!(
            razorpay.is_valid_card_number("VISA").await,
            Err(BridgeError::UnexpectedResponse { method, .. }) if method == "isValidCardNumber"
        ));
    }

    #[tokio::test]
    async fn test_queries_do_not_emit() {
        let channel = InMemoryChannel::new()
            .with_reply(Method::GetWalletLogoUrl, json!("https://cdn.example/paytm.png"));
        let razorpay = Razorpay::new(Box::new(channel));
        let log = listen_both(&razorpay).await;

        razorpay.wallet_logo_url("paytm").await.unwrap();

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_on_all_receives_buffered_failure() {
        let channel = InMemoryChannel::new().with_pending(json!({"type": 1, "code": 2}));
        let razorpay = Razorpay::new(Box::new(channel.clone()));
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        {
            let log = Arc::clone(&log);
            razorpay
                .on_all(move |event, envelope| {
                    log.lock().unwrap().push((event, envelope.clone()))
                })
                .await;
        }

        let events = log.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, CheckoutEvent::Failure);
        assert_eq!(channel.call_count(Method::Resync).await, 1);
    }

    #[tokio::test]
    async fn test_on_all_receives_both_outcomes() {
        let channel = InMemoryChannel::new()
            .with_reply(Method::Submit, json!({"razorpay_payment_id": "pay_1"}));
        let razorpay = Razorpay::new(Box::new(channel));
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        {
            let log = Arc::clone(&log);
            razorpay
                .on_all(move |event, envelope| {
                    log.lock().unwrap().push((event, envelope.clone()))
                })
                .await;
        }

        razorpay
            .submit(CheckoutOptions::default().with("key", "rzp_test_1"))
            .await;
        razorpay.submit(CheckoutOptions::default()).await;

        let events: Vec<CheckoutEvent> = log.lock().unwrap().iter().map(|(e, _)| *e).collect();
        assert_eq!(events, vec![CheckoutEvent::Success, CheckoutEvent::Failure]);
    }
}
