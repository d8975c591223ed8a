// ============================================================================
// Matching Service
// Serialized shared access to one engine plus post-submit event fan-out
// ============================================================================

use crate::domain::{Bbo, DepthView, OrderError, OrderRequest, Trade};
use crate::engine::{MatchingEngine, SubmitOutcome};
use crate::interfaces::{EventHandler, OrderEvent};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Thread-safe front for a [`MatchingEngine`].
///
/// Submissions take the write lock for the whole matching pass and the
/// snapshot that follows it; queries share the read lock. Event handlers
/// (journal, market data, logging) run after the write lock is released, so
/// queries are never held up by a slow collaborator.
///
/// Handlers see submissions in the order they completed: the dispatch lock
/// is claimed before the write lock is given up. Handlers must not call
/// back into the service.
pub struct MatchingService {
    engine: RwLock<MatchingEngine>,
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
    dispatch_order: Mutex<()>,
}

impl MatchingService {
    pub fn new(engine: MatchingEngine) -> Self {
        Self {
            engine: RwLock::new(engine),
            handlers: RwLock::new(Vec::new()),
            dispatch_order: Mutex::new(()),
        }
    }

    /// Builder method: register a handler; handlers run in registration order
    pub fn with_handler(self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.write().push(handler);
        self
    }

    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().push(handler);
    }

    /// Submit an order, then publish its events and the resulting depth
    pub fn submit(&self, request: OrderRequest) -> Result<SubmitOutcome, OrderError> {
        let requested_id = request.order_id;

        let mut engine = self.engine.write();
        let result = match engine.submit(request) {
            Ok(outcome) => {
                let snapshot = engine.snapshot();
                Ok((outcome, snapshot))
            },
            Err(err) => Err(err),
        };

        // Hand-over: the next submit cannot dispatch before this one
        let _turn = self.dispatch_order.lock();
        drop(engine);

        match result {
            Ok((outcome, snapshot)) => {
                let mut events = outcome.events();
                events.push(OrderEvent::BookUpdated { snapshot });
                self.dispatch(&events);
                Ok(outcome)
            },
            Err(err) => {
                self.dispatch(&[OrderEvent::OrderRejected {
                    order_id: requested_id,
                    reason: err.to_string(),
                    timestamp: Utc::now(),
                }]);
                Err(err)
            },
        }
    }

    pub fn bbo(&self) -> Bbo {
        self.engine.read().bbo()
    }

    pub fn snapshot(&self) -> DepthView {
        self.engine.read().snapshot()
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.engine.read().trades().to_vec()
    }

    pub fn symbol(&self) -> String {
        self.engine.read().symbol().to_string()
    }

    /// Run a read-only query against the engine under the shared lock
    pub fn with_engine<R>(&self, f: impl FnOnce(&MatchingEngine) -> R) -> R {
        f(&self.engine.read())
    }

    fn dispatch(&self, events: &[OrderEvent]) {
        // Clone the handler list so no lock is held while collaborators run
        let handlers = self.handlers.read().clone();
        for handler in handlers {
            handler.on_events(events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    const SYMBOL: &str = "BTC-USDT";

    #[derive(Default)]
    struct Recorder(Mutex<Vec<OrderEvent>>);

    impl EventHandler for Recorder {
        fn on_event(&self, event: &OrderEvent) {
            self.0.lock().push(event.clone());
        }
    }

    #[test]
    fn test_events_dispatched_after_submit() {
        let recorder = Arc::new(Recorder::default());
        let service = MatchingService::new(MatchingEngine::price_time(SYMBOL))
            .with_handler(recorder.clone());

        service
            .submit(OrderRequest::limit(SYMBOL, Side::Sell, Decimal::from(30000), Decimal::ONE))
            .unwrap();
        service
            .submit(OrderRequest::market(SYMBOL, Side::Buy, Decimal::ONE))
            .unwrap();

        let events = recorder.0.lock();
        let trades = events
            .iter()
            .filter(|e| matches!(e, OrderEvent::TradeExecuted { .. }))
            .count();
        assert_eq!(trades, 1);

        // Every submission ends with a fresh depth view
        match events.last() {
            Some(OrderEvent::BookUpdated { snapshot }) => {
                assert!(snapshot.bids.is_empty());
                assert!(snapshot.asks.is_empty());
            },
            other => panic!("expected BookUpdated, got {:?}", other),
        }
    }

    #[test]
    fn test_rejection_is_reported() {
        let recorder = Arc::new(Recorder::default());
        let service = MatchingService::new(MatchingEngine::price_time(SYMBOL));
        service.add_handler(recorder.clone());

        let result = service.submit(OrderRequest::market(SYMBOL, Side::Buy, Decimal::ZERO));
        assert!(matches!(result, Err(OrderError::NonPositiveQuantity(_))));

        let events = recorder.0.lock();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OrderEvent::OrderRejected { .. }));
    }

    /// Stalls on the first depth update it sees and records ask level counts
    struct StallingDepthRecorder {
        stalled: AtomicBool,
        started: crossbeam::channel::Sender<()>,
        ask_levels: Mutex<Vec<usize>>,
        last: Mutex<Option<DepthView>>,
    }

    impl EventHandler for StallingDepthRecorder {
        fn on_event(&self, event: &OrderEvent) {
            if let OrderEvent::BookUpdated { snapshot } = event {
                if !self.stalled.swap(true, Ordering::SeqCst) {
                    let _ = self.started.send(());
                    std::thread::sleep(Duration::from_millis(300));
                }
                self.ask_levels.lock().push(snapshot.asks.len());
                *self.last.lock() = Some(snapshot.clone());
            }
        }
    }

    #[test]
    fn test_depth_updates_delivered_in_completion_order() {
        let (started_tx, started_rx) = crossbeam::channel::bounded(1);
        let recorder = Arc::new(StallingDepthRecorder {
            stalled: AtomicBool::new(false),
            started: started_tx,
            ask_levels: Mutex::new(Vec::new()),
            last: Mutex::new(None),
        });
        let service = Arc::new(
            MatchingService::new(MatchingEngine::price_time(SYMBOL)).with_handler(recorder.clone()),
        );

        let first = {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                service
                    .submit(OrderRequest::limit(SYMBOL, Side::Sell, Decimal::from(30000), Decimal::ONE))
                    .unwrap();
            })
        };

        // The first submission is now stuck inside its handler
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        service
            .submit(OrderRequest::limit(SYMBOL, Side::Sell, Decimal::from(30100), Decimal::ONE))
            .unwrap();
        first.join().unwrap();

        assert_eq!(*recorder.ask_levels.lock(), vec![1, 2]);

        let live = service.snapshot();
        let last = recorder.last.lock().clone().unwrap();
        assert_eq!(last.asks, live.asks);
        assert_eq!(last.bids, live.bids);
    }

    #[test]
    fn test_concurrent_submissions_are_serialized() {
        let service = Arc::new(MatchingService::new(MatchingEngine::price_time(SYMBOL)));

        std::thread::scope(|scope| {
            for worker in 0..4i64 {
                let service = Arc::clone(&service);
                scope.spawn(move || {
                    for i in 0..100i64 {
                        let side = if (worker + i) % 2 == 0 { Side::Buy } else { Side::Sell };
                        let price = Decimal::from(30000 + (i % 7) - 3);
                        service
                            .submit(OrderRequest::limit(SYMBOL, side, price, Decimal::ONE))
                            .unwrap();
                        let bbo = service.bbo();
                        if let (Some(bid), Some(ask)) = (bbo.best_bid, bbo.best_ask) {
                            assert!(bid < ask);
                        }
                    }
                });
            }
        });

        service.with_engine(|engine| {
            engine.assert_invariants();
            // Each trade consumes one unit from each side
            let resting = engine.bids().total_quantity() + engine.asks().total_quantity();
            let traded: Decimal = engine.trades().iter().map(|t| t.quantity).sum();
            assert_eq!(resting + traded * Decimal::from(2), Decimal::from(400));
        });
    }
}
