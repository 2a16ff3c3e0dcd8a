use std::sync::Arc;

use hvac_mqtt::{MqttConnection, PublishEvent, PublishOpts};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Outbound side of the message bus.
///
/// Both calls only queue the request; delivery happens elsewhere.
pub trait Bus {
    fn subscribe(&self, topic: &str);

    fn publish(&self, topic: &str, payload: &str);
}

#[derive(Debug)]
enum Outgoing {
    Subscribe(String),
    Publish { topic: String, payload: String },
}

/// [`Bus`] backed by an MQTT connection.
///
/// Requests go through an unbounded channel to a writer task, so callers
/// never wait on the network.
#[derive(Debug, Clone)]
pub struct MqttBus {
    tx: UnboundedSender<Outgoing>,
}

impl MqttBus {
    /// Spawns the writer and reader tasks for `conn`.
    ///
    /// The receiver yields every inbound publish; it produces one final error
    /// and closes when the connection fails.
    pub fn start(
        conn: Arc<MqttConnection>,
    ) -> (Self, UnboundedReceiver<hvac_mqtt::Result<PublishEvent>>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn({
            let conn = conn.clone();
            let event_tx = event_tx.clone();

            async move { write_loop(rx, event_tx, &*conn).await }
        });

        tokio::spawn(async move {
            loop {
                let event = conn.recv().await;
                let failed = event.is_err();

                if event_tx.send(event).is_err() || failed {
                    break;
                }
            }
        });

        (Self { tx }, event_rx)
    }

    fn send(&self, msg: Outgoing) {
        if let Err(e) = self.tx.send(msg) {
            tracing::error!("MQTT writer has stopped, dropping {:?}", e.0);
        }
    }
}

trait Transmit {
    fn transmit(&self, msg: &Outgoing) -> impl Future<Output = hvac_mqtt::Result<()>> + Send;
}

impl Transmit for MqttConnection {
    async fn transmit(&self, msg: &Outgoing) -> hvac_mqtt::Result<()> {
        match msg {
            Outgoing::Subscribe(topic) => self.subscribe(topic).await,
            Outgoing::Publish { topic, payload } => {
                self.publish(topic, payload, PublishOpts::state()).await
            }
        }
    }
}

/// Hands queued requests to `conn` until the connection is lost.
///
/// A failed packet is logged and skipped. A fatal error is forwarded to
/// `events`, where it ends the bridge.
async fn write_loop<T: Transmit>(
    mut rx: UnboundedReceiver<Outgoing>,
    events: UnboundedSender<hvac_mqtt::Result<PublishEvent>>,
    conn: &T,
) {
    while let Some(msg) = rx.recv().await {
        match conn.transmit(&msg).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                tracing::error!("Lost broker connection while sending {msg:?}: {e}");
                let _ = events.send(Err(e));
                break;
            }
            Err(e) => tracing::warn!("Failed to send {msg:?} to broker: {e}"),
        }
    }
}

impl Bus for MqttBus {
    fn subscribe(&self, topic: &str) {
        self.send(Outgoing::Subscribe(topic.to_owned()));
    }

    fn publish(&self, topic: &str, payload: &str) {
        self.send(Outgoing::Publish { topic: topic.to_owned(), payload: payload.to_owned() });
    }
}
