#![allow(dead_code)]

use razorpay_bridge::application::checkout::Razorpay;
use razorpay_bridge::domain::envelope::{CheckoutEvent, Envelope};
use serde_json::Value;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub type EventLog = Arc<Mutex<Vec<(CheckoutEvent, Envelope)>>>;

/// Registers one recording listener per event and returns the shared log.
pub async fn record_events(razorpay: &Razorpay) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    for event in [CheckoutEvent::Success, CheckoutEvent::Failure] {
        let log = Arc::clone(&log);
        razorpay
            .on(event, move |envelope| {
                log.lock().unwrap().push((event, envelope.clone()));
            })
            .await;
    }
    log
}

pub fn events(log: &EventLog) -> Vec<(CheckoutEvent, Envelope)> {
    log.lock().unwrap().clone()
}

pub fn envelope(value: Value) -> Envelope {
    Envelope::from_reply(Some(value))
}

pub fn json_file(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file
}
