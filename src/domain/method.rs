use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Entry points exposed by the native checkout handler.
///
/// The serialized names are the ones the host registers on its side of the
/// channel and must not change. `initilizeSDK` is misspelled on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "getPaymentMethods")]
    GetPaymentMethods,
    #[serde(rename = "getAppsWhichSupportUpi")]
    GetAppsWhichSupportUpi,
    #[serde(rename = "getCardNetwork")]
    GetCardNetwork,
    #[serde(rename = "isCredAppAvailable")]
    IsCredAppAvailable,
    #[serde(rename = "getWalletLogoUrl")]
    GetWalletLogoUrl,
    #[serde(rename = "getBankLogoUrl")]
    GetBankLogoUrl,
    #[serde(rename = "getSubscriptionAmount")]
    GetSubscriptionAmount,
    #[serde(rename = "getCardNetworkLength")]
    GetCardNetworkLength,
    #[serde(rename = "isValidCardNumber")]
    IsValidCardNumber,
    #[serde(rename = "isValidVpa")]
    IsValidVpa,
    #[serde(rename = "initilizeSDK")]
    InitializeSdk,
    #[serde(rename = "submit")]
    Submit,
    #[serde(rename = "payWithCred")]
    PayWithCred,
    #[serde(rename = "resync")]
    Resync,
}

impl Method {
    pub const ALL: [Method; 14] = [
        Method::GetPaymentMethods,
        Method::GetAppsWhichSupportUpi,
        Method::GetCardNetwork,
        Method::IsCredAppAvailable,
        Method::GetWalletLogoUrl,
        Method::GetBankLogoUrl,
        Method::GetSubscriptionAmount,
        Method::GetCardNetworkLength,
        Method::IsValidCardNumber,
        Method::IsValidVpa,
        Method::InitializeSdk,
        Method::Submit,
        Method::PayWithCred,
        Method::Resync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GetPaymentMethods => "getPaymentMethods",
            Method::GetAppsWhichSupportUpi => "getAppsWhichSupportUpi",
            Method::GetCardNetwork => "getCardNetwork",
            Method::IsCredAppAvailable => "isCredAppAvailable",
            Method::GetWalletLogoUrl => "getWalletLogoUrl",
            Method::GetBankLogoUrl => "getBankLogoUrl",
            Method::GetSubscriptionAmount => "getSubscriptionAmount",
            Method::GetCardNetworkLength => "getCardNetworkLength",
            Method::IsValidCardNumber => "isValidCardNumber",
            Method::IsValidVpa => "isValidVpa",
            Method::InitializeSdk => "initilizeSDK",
            Method::Submit => "submit",
            Method::PayWithCred => "payWithCred",
            Method::Resync => "resync",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| BridgeError::UnknownMethod(s.to_string()))
    }
}

/// A single invocation crossing the platform boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCall {
    pub method: Method,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: Method, arguments: Value) -> Self {
        Self { method, arguments }
    }

    /// A call that carries no arguments (`null` on the wire).
    pub fn bare(method: Method) -> Self {
        Self::new(method, Value::Null)
    }
}
