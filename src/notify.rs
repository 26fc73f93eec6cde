use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("sendmail binary `{binary}` not found")]
    MissingBinary { binary: String },
    #[error("failed to spawn `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write message to `{binary}`: {source}")]
    WriteMessage {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{binary}` exited with status {status}")]
    Delivery { binary: String, status: i32 },
}

pub trait Notifier {
    fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    sendmail_path: String,
    sender: String,
}

impl SendmailNotifier {
    pub fn new(sendmail_path: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            sendmail_path: sendmail_path.into(),
            sender: sender.into(),
        }
    }

    pub fn render_message(&self, recipient: &str, subject: &str, body: &str) -> String {
        format!(
            "From: {}\r\nTo: {recipient}\r\nSubject: {subject}\r\n\r\n{body}\r\n",
            self.sender
        )
    }
}

impl Notifier for SendmailNotifier {
    fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let mut child = match Command::new(&self.sendmail_path)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(NotifyError::MissingBinary {
                    binary: self.sendmail_path.clone(),
                })
            }
            Err(err) => {
                return Err(NotifyError::Spawn {
                    binary: self.sendmail_path.clone(),
                    source: err,
                })
            }
        };

        let message = self.render_message(recipient, subject, body);
        {
            let stdin = child.stdin.as_mut().ok_or_else(|| NotifyError::Spawn {
                binary: self.sendmail_path.clone(),
                source: std::io::Error::other("missing stdin pipe"),
            })?;
            stdin
                .write_all(message.as_bytes())
                .map_err(|source| NotifyError::WriteMessage {
                    binary: self.sendmail_path.clone(),
                    source,
                })?;
        }

        let status = child.wait().map_err(|source| NotifyError::Spawn {
            binary: self.sendmail_path.clone(),
            source,
        })?;
        if !status.success() {
            return Err(NotifyError::Delivery {
                binary: self.sendmail_path.clone(),
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}
