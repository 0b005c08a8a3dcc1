//! Cancellation signal for the listener.

use tokio::sync::watch;

/// Owner side of a cancellation signal.
///
/// Any number of [`Signal`]s can observe it; triggering is one-shot and
/// idempotent.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Observer handle for this shutdown.
    pub fn signal(&self) -> Signal {
        Signal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a [`Shutdown`].
#[derive(Debug, Clone)]
pub struct Signal {
    rx: watch::Receiver<bool>,
}

impl Signal {
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal has fired (immediately if it already has).
    ///
    /// If the owning [`Shutdown`] is dropped without firing, this never
    /// resolves.
    pub async fn fired(&mut self) {
        let closed = self.rx.wait_for(|fired| *fired).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}
