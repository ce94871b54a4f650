// src/streaming/channel.rs
use crate::errors::StylizeError;
use crate::models::ProgressEvent;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::Map;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;

/// Read half of the event stream, suitable for `HttpResponse::streaming`.
pub type EventFeed = Map<ReceiverStream<Bytes>, fn(Bytes) -> Result<Bytes, Infallible>>;

/// Opens a paired sink/feed. Frames written to the sink are read from the
/// feed in the same order.
pub fn open(capacity: usize) -> (EventSink, EventFeed) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let sink = EventSink {
        inner: Arc::new(Mutex::new(SinkState {
            tx: Some(tx),
            written: 0,
        })),
    };
    let feed = ReceiverStream::new(rx).map(Ok as fn(Bytes) -> Result<Bytes, Infallible>);
    (sink, feed)
}

/// `event: <kind>\ndata: <json>\n\n`
pub fn encode_frame(event: &ProgressEvent) -> Result<Bytes, StylizeError> {
    let json = serde_json::to_string(event)?;
    Ok(Bytes::from(format!(
        "event: {}\ndata: {}\n\n",
        event.kind(),
        json
    )))
}

struct SinkState {
    tx: Option<mpsc::Sender<Bytes>>,
    written: u64,
}

/// Write half of the event stream. Clones share the same write position and
/// every write goes through one lock, so frames never interleave.
#[derive(Clone)]
pub struct EventSink {
    inner: Arc<Mutex<SinkState>>,
}

impl EventSink {
    pub async fn write(&self, event: &ProgressEvent) -> Result<(), StylizeError> {
        let frame = encode_frame(event)?;
        let mut state = self.inner.lock().await;

        let Some(tx) = state.tx.as_ref() else {
            log::error!("dropped '{}' event written after stream close", event.kind());
            return Err(StylizeError::StreamClosed);
        };
        tx.send(frame)
            .await
            .map_err(|_| StylizeError::Disconnected)?;

        state.written += 1;
        Ok(())
    }

    /// Ends the feed. Later writes fail with `StreamClosed`.
    pub async fn close(&self) {
        let mut state = self.inner.lock().await;
        if state.tx.take().is_some() {
            log::debug!("event stream closed after {} events", state.written);
        }
    }

    #[cfg(test)]
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.tx.is_none()
    }

    /// Resolves once the reading side has gone away. Pends forever if the
    /// sink is already closed, since there is nobody left to cancel.
    pub async fn disconnected(&self) {
        let tx = self.inner.lock().await.tx.clone();
        match tx {
            Some(tx) => tx.closed().await,
            None => std::future::pending().await,
        }
    }
}
