use crate::domain::envelope::{CheckoutEvent, Envelope};
use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

#[derive(Serialize)]
struct EventLine<'a> {
    event: CheckoutEvent,
    payload: &'a Envelope,
}

/// Writes dispatched checkout events as one JSON object per line:
/// `{"event":"payment.success","payload":{...}}`.
pub struct EventWriter<W: Write> {
    writer: W,
}

impl<W: Write> EventWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_event(&mut self, event: CheckoutEvent, payload: &Envelope) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &EventLine { event, payload })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Writes a query result on its own line.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_line_format() {
        let payload = Envelope::from_reply(Some(json!({"razorpay_payment_id": "pay_1"})));
        let mut writer = EventWriter::new(Vec::new());

        writer.write_event(CheckoutEvent::Success, &payload).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"event\":\"payment.success\",\"payload\":{\"razorpay_payment_id\":\"pay_1\"}}\n"
        );
    }

    #[test]
    fn test_value_line() {
        let mut writer = EventWriter::new(Vec::new());
        writer.write_value(&json!(["gpay"])).unwrap();
        assert_eq!(String::from_utf8(writer.into_inner()).unwrap(), "[\"gpay\"]\n");
    }
}
