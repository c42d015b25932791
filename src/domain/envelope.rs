use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub const PAYMENT_ID_FIELD: &str = "razorpay_payment_id";
pub const ORDER_ID_FIELD: &str = "razorpay_order_id";
pub const SIGNATURE_FIELD: &str = "razorpay_signature";
pub const DISCRIMINANT_FIELD: &str = "type";
/// Holds a host reply that was not an object.
pub const RAW_RESPONSE_FIELD: &str = "response";

/// Discriminant the host sets on a successful result.
pub const CODE_PAYMENT_SUCCESS: i64 = 0;
/// Discriminant the host sets on a failed result.
pub const CODE_PAYMENT_ERROR: i64 = 1;

/// Error codes carried in failure envelopes. The numeric values are shared
/// with existing consumers and must stay as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NetworkError,
    InvalidOptions,
    PaymentCancelled,
    TlsError,
    IncompatiblePlugin,
    UnknownError,
}

impl ErrorCode {
    pub const fn code(self) -> i64 {
        match self {
            ErrorCode::NetworkError => 0,
            ErrorCode::InvalidOptions => 1,
            ErrorCode::PaymentCancelled => 2,
            ErrorCode::TlsError => 3,
            ErrorCode::IncompatiblePlugin => 4,
            ErrorCode::UnknownError => 100,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::NetworkError),
            1 => Some(ErrorCode::InvalidOptions),
            2 => Some(ErrorCode::PaymentCancelled),
            3 => Some(ErrorCode::TlsError),
            4 => Some(ErrorCode::IncompatiblePlugin),
            100 => Some(ErrorCode::UnknownError),
            _ => None,
        }
    }
}

/// The two outcomes a checkout result can be dispatched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutEvent {
    #[serde(rename = "payment.success")]
    Success,
    #[serde(rename = "payment.error")]
    Failure,
}

impl CheckoutEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutEvent::Success => "payment.success",
            CheckoutEvent::Failure => "payment.error",
        }
    }
}

/// Response mapping returned by the host for a checkout attempt.
///
/// The shape is owned by the host, so it stays an untyped map. Use
/// [`Envelope::success_view`] and [`Envelope::failure_view`] to read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    /// Builds a failure envelope on the bridge side.
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("code".to_string(), json!(code.code()));
        fields.insert("message".to_string(), Value::String(message.into()));
        Self(fields)
    }

    /// Interprets a raw host reply. A missing or `null` reply becomes an empty
    /// envelope; any other non-object reply is kept under `"response"`. Both
    /// classify as a failure.
    pub fn from_reply(reply: Option<Value>) -> Self {
        match reply {
            Some(Value::Object(fields)) => Self(fields),
            None | Some(Value::Null) => Self::default(),
            Some(other) => {
                let mut fields = Map::new();
                fields.insert(RAW_RESPONSE_FIELD.to_string(), other);
                Self(fields)
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Total classification: every envelope maps to exactly one event.
    pub fn classify(&self) -> CheckoutEvent {
        let has_payment_id = self.get(PAYMENT_ID_FIELD).is_some();
        let success_type = self.get(DISCRIMINANT_FIELD).is_some_and(|t| {
            t.as_i64() == Some(CODE_PAYMENT_SUCCESS)
                || t.as_f64() == Some(CODE_PAYMENT_SUCCESS as f64)
        });

        if has_payment_id || success_type {
            CheckoutEvent::Success
        } else {
            CheckoutEvent::Failure
        }
    }

    pub fn success_view(&self) -> Option<SuccessView> {
        let payment_id = self.get(PAYMENT_ID_FIELD)?.as_str()?.to_string();
        Some(SuccessView {
            payment_id,
            order_id: self.string_field(ORDER_ID_FIELD),
            signature: self.string_field(SIGNATURE_FIELD),
        })
    }

    pub fn failure_view(&self) -> FailureView {
        let code = self
            .get("code")
            .or_else(|| self.get("http_status_code"))
            .and_then(as_code)
            .unwrap_or(ErrorCode::UnknownError.code());
        let message = self
            .string_field("message")
            .or_else(|| self.string_field("metadata.reason"))
            .or_else(|| self.string_field("description"));
        FailureView { code, message }
    }

    fn string_field(&self, field: &str) -> Option<String> {
        self.get(field).and_then(Value::as_str).map(str::to_string)
    }
}

fn as_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<Map<String, Value>> for Envelope {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Fields a merchant needs to verify a successful payment server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessView {
    pub payment_id: String,
    pub order_id: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureView {
    pub code: i64,
    pub message: Option<String>,
}

impl FailureView {
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }
}
