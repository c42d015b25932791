use crate::domain::method::{Method, MethodCall};
use crate::domain::ports::CheckoutChannel;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, trace};

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    method: Method,
    arguments: &'a Value,
}

#[derive(Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Fault>,
}

/// Error raised by the host for a call, mirroring a platform exception.
#[derive(Deserialize)]
struct Fault {
    code: String,
    #[serde(default)]
    message: Option<String>,
}

struct Inner<R, W> {
    reader: BufReader<R>,
    writer: W,
    next_id: u64,
}

/// Talks to a native host over newline-delimited JSON.
///
/// Each call writes `{"id", "method", "arguments"}` and waits for the line
/// carrying the same `id` with either a `result` or an `error`. Only one call
/// is in flight at a time. Replies to calls whose future was dropped before
/// the answer arrived are skipped.
pub struct JsonLinesChannel<R, W> {
    inner: Mutex<Inner<R, W>>,
}

impl<R, W> JsonLinesChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                reader: BufReader::new(reader),
                writer,
                next_id: 0,
            }),
        }
    }
}

#[async_trait]
impl<R, W> CheckoutChannel for JsonLinesChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn invoke(&self, call: MethodCall) -> Result<Option<Value>> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = inner.next_id;

        let mut frame = serde_json::to_vec(&Request {
            id,
            method: call.method,
            arguments: &call.arguments,
        })?;
        frame.push(b'\n');
        debug!(id, method = %call.method, "sending call to host");
        inner.writer.write_all(&frame).await?;
        inner.writer.flush().await?;

        let response = loop {
            let response = read_response(&mut inner.reader).await?;
            if response.id == id {
                break response;
            }
            if response.id > id {
                return Err(BridgeError::ProtocolError(format!(
                    "expected reply to call {id}, got {}",
                    response.id
                )));
            }
            // Reply to a call whose caller gave up waiting.
            debug!(stale = response.id, id, "discarding stale reply");
        };
        if let Some(fault) = response.error {
            return Err(BridgeError::PlatformError {
                method: call.method.to_string(),
                code: fault.code,
                message: fault.message.unwrap_or_default(),
            });
        }
        Ok(response.result)
    }
}

async fn read_response<R>(reader: &mut BufReader<R>) -> Result<Response>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(BridgeError::HostClosed);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    trace!(line = line.trim_end(), "host replied");
    Ok(serde_json::from_str(line.trim_end())?)
}
