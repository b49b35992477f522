// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-level cancellation of an analysis run.

use tokio::sync::watch;

/// Owner side: fire once to stop every in-flight module of a run.
#[derive(Debug)]
pub struct Cancellation {
    sender: watch::Sender<bool>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// A token observing this cancellation.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side, cloned into every module task.
#[derive(Debug, Clone)]
pub struct CancelToken {
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never fires.
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancellation fires. Pends forever if the owning
    /// `Cancellation` is dropped without firing.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            let fired = *receiver.borrow_and_update();
            if fired {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
