use tokio::sync::broadcast;

/// In-process "questions changed, reload" broadcast.
///
/// Carries no payload; listeners refetch from the store on their own. Lagging
/// or absent subscribers are fine, notification is fire-and-forget.
#[derive(Clone)]
pub struct UpdateSignal {
    tx: broadcast::Sender<()>,
}

impl UpdateSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn notify(&self) {
        // Err only means nobody is listening right now.
        let _ = self.tx.send(());
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for UpdateSignal {
    fn default() -> Self {
        Self::new()
    }
}
