//! Quote Poller Service
//!
//! Refreshes the quote shown next to an open trade ticket on a fixed
//! interval. Polling stops when the ticket's handle is dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::application::ports::{GatewayError, Quote, QuoteProviderPort};
use crate::domain::shared::Symbol;
use crate::observability::record_poll;

/// What a ticket's quote panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteView {
    /// Symbol being polled.
    pub symbol: Symbol,
    /// Latest quote, if any read has succeeded.
    pub quote: Option<Quote>,
    /// True if the latest read failed.
    pub stale: bool,
    /// Message of the latest failed read.
    pub last_error: Option<String>,
}

impl QuoteView {
    const fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            quote: None,
            stale: false,
            last_error: None,
        }
    }

    /// Apply a quote unless the one shown is newer.
    pub fn apply(&mut self, incoming: Quote) {
        if self
            .quote
            .as_ref()
            .is_some_and(|shown| shown.as_of > incoming.as_of)
        {
            return;
        }
        self.quote = Some(incoming);
        self.stale = false;
        self.last_error = None;
    }

    /// Record a failed read, keeping the last quote.
    pub fn apply_failure(&mut self, error: &GatewayError) {
        self.stale = true;
        self.last_error = Some(error.to_string());
    }
}

/// Handle to a polled quote. Polling stops when it is dropped.
pub struct QuoteWatch {
    rx: watch::Receiver<QuoteView>,
    _guard: DropGuard,
}

impl QuoteWatch {
    /// Current view.
    pub fn view(&self) -> QuoteView {
        self.rx.borrow().clone()
    }

    /// Receive the view whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<QuoteView> {
        self.rx.clone()
    }

    /// Symbol being polled.
    pub fn symbol(&self) -> Symbol {
        self.rx.borrow().symbol.clone()
    }
}

/// Quote poller service.
pub struct QuotePoller<Q: QuoteProviderPort + 'static> {
    provider: Arc<Q>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl<Q: QuoteProviderPort + 'static> QuotePoller<Q> {
    /// Create a poller refreshing every `interval_ms`.
    #[must_use]
    pub const fn new(provider: Arc<Q>, interval_ms: u64, shutdown: CancellationToken) -> Self {
        Self {
            provider,
            interval: Duration::from_millis(interval_ms),
            shutdown,
        }
    }

    /// Read one quote without polling.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    pub async fn fetch(&self, symbol: &Symbol) -> Result<Quote, GatewayError> {
        self.provider.get_quote(symbol).await
    }

    /// Start polling a symbol.
    ///
    /// Every call starts its own loop, even for a symbol already watched.
    /// The loop stops when the returned [`QuoteWatch`] is dropped.
    pub fn watch(&self, symbol: Symbol) -> QuoteWatch {
        let (tx, rx) = watch::channel(QuoteView::empty(symbol.clone()));
        let token = self.shutdown.child_token();
        let loop_token = token.clone();
        let provider = Arc::clone(&self.provider);
        let interval = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match provider.get_quote(&symbol).await {
                            Ok(quote) => {
                                record_poll("quote", "ok");
                                tx.send_modify(|view| view.apply(quote));
                            }
                            Err(e) => {
                                record_poll("quote", "error");
                                tracing::debug!(symbol = %symbol, error = %e, "Quote poll failed");
                                tx.send_modify(|view| view.apply_failure(&e));
                            }
                        }
                    }
                    () = loop_token.cancelled() => {
                        tracing::debug!(symbol = %symbol, "Quote polling stopped");
                        break;
                    }
                }
            }
        });

        QuoteWatch {
            rx,
            _guard: token.drop_guard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal_macros::dec;

    use crate::application::ports::MockQuoteProviderPort;
    use crate::domain::shared::Timestamp;

    #[test]
    fn older_quote_does_not_replace_newer() {
        let now = Timestamp::now();
        let mut view = QuoteView::empty(Symbol::new("AAPL"));
        view.apply(Quote::new(Symbol::new("AAPL"), dec!(151), now));
        view.apply(Quote::new(Symbol::new("AAPL"), dec!(149), now.plus_seconds(-5)));
        assert_eq!(view.quote.unwrap().price, dec!(151));
    }

    #[test]
    fn failure_keeps_last_quote() {
        let mut view = QuoteView::empty(Symbol::new("AAPL"));
        view.apply(Quote::new(Symbol::new("AAPL"), dec!(150), Timestamp::now()));
        view.apply_failure(&GatewayError::Timeout);
        assert!(view.stale);
        assert_eq!(view.quote.unwrap().price, dec!(150));
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_interval_until_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut provider = MockQuoteProviderPort::new();
        provider.expect_get_quote().returning(move |symbol| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Quote::new(symbol.clone(), dec!(150), Timestamp::now()))
        });
        let poller = QuotePoller::new(Arc::new(provider), 5_000, CancellationToken::new());

        let watch = poller.watch(Symbol::new("AAPL"));
        tokio::time::sleep(Duration::from_millis(12_000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(watch.view().quote.unwrap().price, dec!(150));

        drop(watch);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn each_watch_runs_its_own_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut provider = MockQuoteProviderPort::new();
        provider.expect_get_quote().returning(move |symbol| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Quote::new(symbol.clone(), dec!(150), Timestamp::now()))
        });
        let poller = QuotePoller::new(Arc::new(provider), 5_000, CancellationToken::new());

        let first = poller.watch(Symbol::new("AAPL"));
        let second = poller.watch(Symbol::new("AAPL"));
        tokio::time::sleep(Duration::from_millis(12_000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 6);

        drop(first);
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 8);
        assert!(second.view().quote.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut provider = MockQuoteProviderPort::new();
        provider.expect_get_quote().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Timeout)
        });
        let shutdown = CancellationToken::new();
        let poller = QuotePoller::new(Arc::new(provider), 1_000, shutdown.clone());

        let watch = poller.watch(Symbol::new("MSFT"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        shutdown.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(watch.view().stale);
    }
}
