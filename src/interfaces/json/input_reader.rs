use crate::domain::options::CheckoutOptions;
use crate::error::Result;
use serde_json::{Map, Value};
use std::io::Read;

/// Reads a checkout options bag from a JSON object.
pub fn read_options<R: Read>(source: R) -> Result<CheckoutOptions> {
    Ok(serde_json::from_reader(source)?)
}

/// Reads a canned-reply fixture: a JSON object keyed by wire method name.
pub fn read_fixture<R: Read>(source: R) -> Result<Map<String, Value>> {
    Ok(serde_json::from_reader(source)?)
}
