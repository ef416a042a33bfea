//! One-shot delivery of an authenticated client.
//!
//! Whatever completes the login (typically an HTTP callback handler) holds the
//! [`ClientSender`]; startup code awaits the [`ClientReceiver`] and hands the
//! client to a [`Pipeline`](crate::Pipeline).

use std::sync::Arc;
use tokio::sync::oneshot;

use crate::{
    error::{PlaygenError, Result},
    CatalogGateway,
};

pub struct ClientSender(oneshot::Sender<Arc<dyn CatalogGateway>>);

pub struct ClientReceiver(oneshot::Receiver<Arc<dyn CatalogGateway>>);

pub fn channel() -> (ClientSender, ClientReceiver) {
    let (tx, rx) = oneshot::channel();
    (ClientSender(tx), ClientReceiver(rx))
}

impl ClientSender {
    /// Fails if the receiving side has already given up.
    pub fn deliver(self, client: Arc<dyn CatalogGateway>) -> Result<()> {
        self.0.send(client).map_err(|_| PlaygenError::HandoffClosed)
    }
}

impl ClientReceiver {
    pub async fn wait(self) -> Result<Arc<dyn CatalogGateway>> {
        self.0.await.map_err(|_| PlaygenError::HandoffClosed)
    }
}
