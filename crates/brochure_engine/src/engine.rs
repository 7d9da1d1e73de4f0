use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::client::{BackendSettings, HttpBackendClient, Transport};
use crate::stream::ChannelStreamSink;
use crate::{EngineEvent, SessionId, SessionResult, SubmitError, SubmitOutcome, SubmitRequest};

enum EngineCommand {
    Submit {
        session_id: SessionId,
        request: SubmitRequest,
    },
    Cancel {
        session_id: SessionId,
    },
}

/// Handle to the engine thread. Commands go in over a channel; events come
/// back out and are drained with `try_recv` from the UI tick.
///
/// The engine keeps at most one session in flight: a new submit cancels the
/// previous session's token before spawning the new request.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: BackendSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let client = Arc::new(HttpBackendClient::new(settings));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut active: Option<(SessionId, CancellationToken)> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit {
                        session_id,
                        request,
                    } => {
                        if let Some((old_id, token)) = active.take() {
                            engine_info!(
                                "superseding session {} with session {}",
                                old_id,
                                session_id
                            );
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        active = Some((session_id, token.clone()));
                        let client = client.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run_session(client.as_ref(), session_id, request, event_tx, token)
                                .await;
                        });
                    }
                    EngineCommand::Cancel { session_id } => {
                        if let Some((id, token)) = active.as_ref() {
                            if *id == session_id {
                                engine_debug!("cancelling session {}", session_id);
                                token.cancel();
                                active = None;
                            }
                        }
                    }
                }
            }

            // Handle dropped: release whatever is still in flight.
            if let Some((_, token)) = active {
                token.cancel();
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, session_id: SessionId, request: SubmitRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            session_id,
            request,
        });
    }

    pub fn cancel(&self, session_id: SessionId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { session_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn run_session(
    client: &dyn Transport,
    session_id: SessionId,
    request: SubmitRequest,
    event_tx: mpsc::Sender<EngineEvent>,
    token: CancellationToken,
) {
    let sink = ChannelStreamSink::new(session_id, event_tx.clone());
    // Racing the token here covers the window before the first chunk arrives;
    // dropping the submit future aborts the connection and releases the body.
    let result: Result<SubmitOutcome, SubmitError> = tokio::select! {
        _ = token.cancelled() => Ok(SubmitOutcome::Cancelled),
        result = client.submit(&request, &sink, &token) => result,
    };

    let result = match result {
        Ok(SubmitOutcome::Completed(outcome)) => SessionResult::Succeeded(outcome),
        Ok(SubmitOutcome::Cancelled) => SessionResult::Cancelled,
        // A cancel racing the initial send surfaces as a request error;
        // report it as the cancellation it is.
        Err(_) if token.is_cancelled() => SessionResult::Cancelled,
        Err(err) => SessionResult::Failed(err),
    };
    let _ = event_tx.send(EngineEvent::Completed { session_id, result });
}
