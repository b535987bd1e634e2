//! Interrupt signal for abandoning a batch

use tokio::sync::watch;

/// Firing side of an interrupt
#[derive(Debug)]
pub struct InterruptTrigger {
    tx: watch::Sender<bool>,
}

impl InterruptTrigger {
    /// Fire the interrupt; every receiver observes it, including future waits
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Listening side of an interrupt
///
/// Cloning yields another listener on the same signal.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Interrupt {
    /// Create a connected trigger/listener pair
    pub fn channel() -> (InterruptTrigger, Interrupt) {
        let (tx, rx) = watch::channel(false);
        (InterruptTrigger { tx }, Interrupt { rx })
    }

    /// A listener that never fires
    pub fn never() -> Self {
        let (_trigger, interrupt) = Self::channel();
        interrupt
    }

    /// Whether the interrupt has already fired
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the interrupt fires
    ///
    /// Pends forever if the trigger is dropped without firing.
    pub async fn triggered(&mut self) {
        let fired = self.rx.wait_for(|fired| *fired).await.is_ok();
        if !fired {
            std::future::pending::<()>().await;
        }
    }
}
