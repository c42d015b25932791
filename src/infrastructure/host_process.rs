use super::json_lines::JsonLinesChannel;
use crate::domain::method::MethodCall;
use crate::domain::ports::CheckoutChannel;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::info;

/// A native host running as a child process, spoken to over its stdin and
/// stdout with the JSON-lines protocol. The child is killed if this value is
/// dropped without [`HostProcess::shutdown`].
pub struct HostProcess {
    child: Mutex<Child>,
    channel: JsonLinesChannel<ChildStdout, ChildStdin>,
}

impl HostProcess {
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::ProtocolError("host stdin is not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::ProtocolError("host stdout is not piped".to_string()))?;

        info!(program, pid = ?child.id(), "spawned native host");
        Ok(Self {
            child: Mutex::new(child),
            channel: JsonLinesChannel::new(stdout, stdin),
        })
    }

    /// Closes the host's stdin and waits for it to exit.
    pub async fn shutdown(self) -> Result<ExitStatus> {
        let Self { child, channel } = self;
        drop(channel);
        Ok(child.into_inner().wait().await?)
    }
}

#[async_trait]
impl CheckoutChannel for HostProcess {
    async fn invoke(&self, call: MethodCall) -> Result<Option<Value>> {
        self.channel.invoke(call).await
    }
}
