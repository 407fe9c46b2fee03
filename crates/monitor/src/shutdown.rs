//! Cooperative cancellation of the polling loop
//!
//! A [`ShutdownTrigger`] fires once; the matching [`Shutdown`] observes it
//! between iterations or while the loop sleeps. Dropping every trigger
//! counts as a shutdown request too.

use flume::{Receiver, Sender, TryRecvError};
use tracing::{info, warn};

/// Create a connected trigger / listener pair
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = flume::bounded(1);
    (ShutdownTrigger { tx }, Shutdown { rx, fired: false })
}

/// Requests a shutdown; cheap to clone
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Sender<()>,
}

impl ShutdownTrigger {
    /// Request shutdown; repeated calls are no-ops
    pub fn trigger(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Observes a shutdown request
#[derive(Debug)]
pub struct Shutdown {
    rx: Receiver<()>,
    fired: bool,
}

impl Shutdown {
    /// Non-blocking check
    pub fn is_triggered(&mut self) -> bool {
        if !self.fired {
            match self.rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => self.fired = true,
                Err(TryRecvError::Empty) => {}
            }
        }
        self.fired
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&mut self) {
        if !self.fired {
            let _ = self.rx.recv_async().await;
            self.fired = true;
        }
    }
}

/// Fire `trigger` on the first Ctrl-C
pub async fn listen_for_ctrl_c(trigger: ShutdownTrigger) {
    match monoio::utils::CtrlC::new() {
        Ok(ctrl_c) => {
            ctrl_c.await;
            info!("🛑 Ctrl-C received, stopping");
            trigger.trigger();
        }
        Err(e) => {
            warn!("⚠️ Could not install Ctrl-C handler: {}", e);
            // Held forever: dropping the last trigger stops the poller.
            let _keep = trigger;
            std::future::pending::<()>().await
        }
    }
}
