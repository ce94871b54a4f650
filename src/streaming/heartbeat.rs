// src/streaming/heartbeat.rs
use super::channel::EventSink;
use crate::models::ProgressEvent;
use actix_web::rt;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const HEARTBEAT_MESSAGE: &str = "Still generating image. Please be patient.";

/// Periodic "still working" writer. The interval is measured from the end of
/// the previous emission.
pub struct Heartbeat {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<u64>,
}

impl Heartbeat {
    pub fn start(sink: EventSink, interval: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = rt::spawn(async move {
            let event = ProgressEvent::message(HEARTBEAT_MESSAGE);
            let mut beats = 0u64;
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = rt::time::sleep(interval) => {
                        // stop is only observed between beats, never mid-write
                        if let Err(e) = sink.write(&event).await {
                            log::debug!("heartbeat stopping: {}", e);
                            break;
                        }
                        beats += 1;
                    }
                }
            }
            beats
        });

        Self { stop_tx, handle }
    }

    /// Stops the timer and waits for the task to exit. Once this returns no
    /// heartbeat write is pending or will be issued. Returns the beat count.
    pub async fn stop(self) -> u64 {
        let _ = self.stop_tx.send(());
        match self.handle.await {
            Ok(beats) => beats,
            Err(e) => {
                log::error!("heartbeat task failed: {}", e);
                0
            }
        }
    }
}
