//! Implements InputPort. JSON-lines transport over stdin/stdout.
//!
//! One request object per line, tagged by `method`:
//! `{"method":"submit_rating","item_id":1,"author_id":2,"rate":5}` or
//! `{"method":"get_summary","item_id":1}`. Each request gets one reply line,
//! `{"ok":{...}}` or `{"error":{"code":"...","message":"..."}}`.

use crate::adapters::protocol::{
    Code, GetSummaryRequest, GetSummaryResponse, RatingHandler, Status, SubmitRatingRequest,
    SubmitRatingResponse,
};
use crate::domain::{DomainError, InternalKind};
use crate::ports::InputPort;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    SubmitRating(SubmitRatingRequest),
    GetSummary(GetSummaryRequest),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    Ok(ReplyBody),
    Error(ErrorBody),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    SubmitRating(SubmitRatingResponse),
    GetSummary(GetSummaryResponse),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: Code,
    pub message: String,
}

impl Reply {
    fn from_outcome<T>(outcome: Result<T, Status>, body: impl FnOnce(T) -> ReplyBody) -> Self {
        match outcome {
            Ok(response) => Reply::Ok(body(response)),
            Err(status) => Reply::from_status(status),
        }
    }

    fn from_status(status: Status) -> Self {
        Reply::Error(ErrorBody {
            code: status.code(),
            message: status.message().to_owned(),
        })
    }
}

/// JSON-lines adapter. Requests are answered in input order.
pub struct JsonLinesInput {
    handler: Arc<RatingHandler>,
}

impl JsonLinesInput {
    pub fn new(handler: Arc<RatingHandler>) -> Self {
        Self { handler }
    }

    /// Serve requests from `reader` until EOF. Returns the number of replies written.
    ///
    /// A line that is not UTF-8 or not a known request gets an error reply;
    /// only transport I/O failures end the session.
    pub async fn serve<R, W>(&self, mut reader: R, writer: &mut W) -> Result<usize, DomainError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut replies = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await.map_err(io_error)? == 0 {
                break;
            }
            let reply = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.handle_line(line).await
                }
                Err(e) => {
                    warn!(error = %e, "request line is not valid UTF-8");
                    Reply::from_status(Status::invalid_argument(format!(
                        "malformed request: {e}"
                    )))
                }
            };
            let mut out = serde_json::to_string(&reply).map_err(|e| {
                DomainError::internal_with_source(InternalKind::Io, "encode reply", e)
            })?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await.map_err(io_error)?;
            writer.flush().await.map_err(io_error)?;
            replies += 1;
        }
        Ok(replies)
    }

    async fn handle_line(&self, line: &str) -> Reply {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "malformed request line");
                return Reply::from_status(Status::invalid_argument(format!(
                    "malformed request: {e}"
                )));
            }
        };
        match request {
            Request::SubmitRating(request) => {
                let (tx, rx) = oneshot::channel();
                self.handler.submit_rating(request, tx);
                Reply::from_outcome(await_outcome(rx).await, ReplyBody::SubmitRating)
            }
            Request::GetSummary(request) => {
                let (tx, rx) = oneshot::channel();
                self.handler.get_summary(request, tx);
                Reply::from_outcome(await_outcome(rx).await, ReplyBody::GetSummary)
            }
        }
    }
}

async fn await_outcome<T>(rx: oneshot::Receiver<Result<T, Status>>) -> Result<T, Status> {
    rx.await
        .unwrap_or_else(|_| Err(Status::internal("request finished without a response")))
}

fn io_error(e: std::io::Error) -> DomainError {
    DomainError::internal_with_source(InternalKind::Io, format!("transport I/O failed: {e}"), e)
}

#[async_trait]
impl InputPort for JsonLinesInput {
    async fn run(&self) -> Result<(), DomainError> {
        let mut stdout = tokio::io::stdout();
        let replies = self
            .serve(BufReader::new(tokio::io::stdin()), &mut stdout)
            .await?;
        info!(replies, "input closed");
        Ok(())
    }
}
