// src/engine/stop.rs

use std::sync::{Arc, Weak};

use tokio::sync::watch;

/// Latching stop request for one invocation.
///
/// Backed by a `watch` channel so a listener that subscribes after the
/// request still observes it.
#[derive(Debug)]
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = watch::channel(false);
        Arc::new(Self { tx })
    }

    /// Never blocks; repeated calls are no-ops.
    pub fn request_stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> StopListener {
        StopListener {
            rx: self.tx.subscribe(),
        }
    }
}

/// Awaitable side of a [`StopSignal`].
#[derive(Debug, Clone)]
pub struct StopListener {
    rx: watch::Receiver<bool>,
}

impl StopListener {
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once a stop has been requested. If the signal itself is
    /// dropped without a request this never resolves.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Non-owning reference to a running invocation, good only for issuing a
/// stop request. Holding one never keeps the invocation alive.
#[derive(Debug, Clone)]
pub struct InvocationHandle {
    signal: Weak<StopSignal>,
}

impl InvocationHandle {
    pub fn new(signal: &Arc<StopSignal>) -> Self {
        Self {
            signal: Arc::downgrade(signal),
        }
    }

    /// Returns `false` if the invocation is already gone.
    pub fn request_stop(&self) -> bool {
        match self.signal.upgrade() {
            Some(signal) => {
                signal.request_stop();
                true
            }
            None => false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.signal.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_subscriber_sees_request() {
        let signal = StopSignal::new();
        signal.request_stop();
        signal.request_stop();
        let mut listener = signal.subscribe();
        assert!(listener.is_requested());
        listener.requested().await;
    }

    #[tokio::test]
    async fn listener_wakes_on_request() {
        let signal = StopSignal::new();
        let mut listener = signal.subscribe();
        let waiter = tokio::spawn(async move { listener.requested().await });
        signal.request_stop();
        waiter.await.unwrap();
        assert!(signal.is_requested());
    }

    #[test]
    fn handle_does_not_extend_lifetime() {
        let signal = StopSignal::new();
        let handle = InvocationHandle::new(&signal);
        assert!(handle.is_alive());
        drop(signal);
        assert!(!handle.is_alive());
        assert!(!handle.request_stop());
    }
}
