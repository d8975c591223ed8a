// ============================================================================
// Engine Actor
// Pins one engine to a single tokio task; callers talk to it over channels
// ============================================================================

use crate::domain::{Bbo, DepthView, OrderError, OrderRequest};
use crate::engine::{MatchingEngine, SubmitOutcome};
use crate::interfaces::{EventHandler, OrderEvent};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineHandleError {
    #[error(transparent)]
    Rejected(#[from] OrderError),

    #[error("matching engine task has stopped")]
    Closed,
}

/// Commands processed one at a time by the engine task
#[derive(Debug)]
enum EngineCommand {
    Submit {
        request: OrderRequest,
        response_tx: oneshot::Sender<Result<SubmitOutcome, OrderError>>,
    },
    Bbo {
        response_tx: oneshot::Sender<Bbo>,
    },
    Snapshot {
        response_tx: oneshot::Sender<DepthView>,
    },
}

/// Cloneable handle to an engine owned by its own task
#[derive(Debug, Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub async fn submit(&self, request: OrderRequest) -> Result<SubmitOutcome, EngineHandleError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(EngineCommand::Submit {
                request,
                response_tx,
            })
            .await
            .map_err(|_| EngineHandleError::Closed)?;

        Ok(response_rx.await.map_err(|_| EngineHandleError::Closed)??)
    }

    pub async fn bbo(&self) -> Result<Bbo, EngineHandleError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(EngineCommand::Bbo { response_tx })
            .await
            .map_err(|_| EngineHandleError::Closed)?;
        response_rx.await.map_err(|_| EngineHandleError::Closed)
    }

    pub async fn snapshot(&self) -> Result<DepthView, EngineHandleError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(EngineCommand::Snapshot { response_tx })
            .await
            .map_err(|_| EngineHandleError::Closed)?;
        response_rx.await.map_err(|_| EngineHandleError::Closed)
    }
}

/// Move `engine` onto a dedicated task.
///
/// The task exits once every handle is dropped and hands the engine back
/// through the join handle. Event batches are queued to a separate
/// dispatcher that runs the handlers on the blocking pool, one batch at a
/// time in submission order, so journal I/O never delays the next command.
pub fn spawn_engine(
    engine: MatchingEngine,
    handlers: Vec<Arc<dyn EventHandler>>,
    queue_capacity: usize,
) -> (EngineHandle, JoinHandle<MatchingEngine>) {
    let (command_tx, command_rx) = mpsc::channel(queue_capacity.max(1));
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    tokio::spawn(dispatch(event_rx, handlers));
    let task = tokio::spawn(run(engine, command_rx, event_tx));
    (EngineHandle { command_tx }, task)
}

async fn dispatch(
    mut event_rx: mpsc::UnboundedReceiver<Vec<OrderEvent>>,
    handlers: Vec<Arc<dyn EventHandler>>,
) {
    let handlers = Arc::new(handlers);

    while let Some(events) = event_rx.recv().await {
        let handlers = Arc::clone(&handlers);
        let batch = tokio::task::spawn_blocking(move || {
            for handler in handlers.iter() {
                handler.on_events(&events);
            }
        });

        if let Err(err) = batch.await {
            tracing::warn!(error = %err, "event handler panicked");
        }
    }
}

async fn run(
    mut engine: MatchingEngine,
    mut command_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::UnboundedSender<Vec<OrderEvent>>,
) -> MatchingEngine {
    tracing::info!(symbol = %engine.symbol(), "engine task started");

    while let Some(command) = command_rx.recv().await {
        match command {
            EngineCommand::Submit {
                request,
                response_tx,
            } => {
                let requested_id = request.order_id;
                let events = match engine.submit(request) {
                    Ok(outcome) => {
                        let mut events = outcome.events();
                        events.push(OrderEvent::BookUpdated {
                            snapshot: engine.snapshot(),
                        });
                        let _ = response_tx.send(Ok(outcome));
                        events
                    },
                    Err(err) => {
                        let event = OrderEvent::OrderRejected {
                            order_id: requested_id,
                            reason: err.to_string(),
                            timestamp: Utc::now(),
                        };
                        let _ = response_tx.send(Err(err));
                        vec![event]
                    },
                };

                if event_tx.send(events).is_err() {
                    tracing::warn!("event dispatcher stopped, events dropped");
                }
            },
            EngineCommand::Bbo { response_tx } => {
                let _ = response_tx.send(engine.bbo());
            },
            EngineCommand::Snapshot { response_tx } => {
                let _ = response_tx.send(engine.snapshot());
            },
        }
    }

    tracing::info!(symbol = %engine.symbol(), "engine task stopped");
    engine
}
