//! MQTT link — connection driver and publish handle.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use homelink_app::ports::{CommandPublisher, LinkEvent};
use homelink_domain::error::HomeLinkError;

use crate::config::MqttConfig;
use crate::error::LinkError;

/// Cloneable publish handle for the MQTT connection.
///
/// The actual connection is driven by a background task (see
/// [`MqttLink::connect`]); this handle only enqueues publishes and tracks
/// whether the link is currently up.
#[derive(Clone)]
pub struct MqttLink {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
}

impl MqttLink {
    /// Open the connection and start its driver task.
    ///
    /// Returns the publish handle, the receiver for inbound
    /// [`LinkEvent`]s, and the driver task handle. The driver subscribes to
    /// `subscriptions` on every (re)connect, surfaces connectivity
    /// transitions as discrete events, and retries dropped connections with
    /// exponential backoff. It stops when the event receiver is dropped.
    #[must_use]
    pub fn connect(
        config: &MqttConfig,
        subscriptions: Vec<String>,
    ) -> (Self, mpsc::Receiver<LinkEvent>, JoinHandle<()>) {
        let mut options = MqttOptions::new(config.client_id.as_str(), config.host.as_str(), config.port);
        options.set_keep_alive(config.keep_alive());
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.as_str(), password.as_str());
        }

        let (client, event_loop) = AsyncClient::new(options, config.channel_capacity);
        let (events_tx, events_rx) = mpsc::channel(config.channel_capacity);
        let connected = Arc::new(AtomicBool::new(false));

        let driver = tokio::spawn(drive(
            event_loop,
            client.clone(),
            subscriptions,
            events_tx,
            Arc::clone(&connected),
            config.reconnect_min(),
            config.reconnect_max(),
        ));

        (Self { client, connected }, events_rx, driver)
    }

    /// Whether the link is currently up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        let (client, _event_loop) = AsyncClient::new(MqttOptions::new("test", "localhost", 1883), 8);
        Self {
            client,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CommandPublisher for MqttLink {
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), HomeLinkError>> + Send {
        let client = self.client.clone();
        let connected = Arc::clone(&self.connected);
        let topic = topic.to_string();
        let payload = payload.as_bytes().to_vec();
        async move {
            if !connected.load(Ordering::SeqCst) {
                return Err(LinkError::Unavailable.into());
            }
            client
                .publish(topic, QoS::AtLeastOnce, false, payload)
                .await
                .map_err(LinkError::from)?;
            Ok(())
        }
    }
}

async fn drive(
    mut event_loop: EventLoop,
    client: AsyncClient,
    subscriptions: Vec<String>,
    events: mpsc::Sender<LinkEvent>,
    connected: Arc<AtomicBool>,
    backoff_min: Duration,
    backoff_max: Duration,
) {
    let mut backoff = backoff_min;
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected.store(true, Ordering::SeqCst);
                backoff = backoff_min;
                tracing::info!("connected to mqtt broker");
                // Subscriptions do not survive a clean-session reconnect.
                for topic in &subscriptions {
                    if let Err(err) = client.subscribe(topic.as_str(), QoS::AtLeastOnce).await {
                        tracing::warn!(%err, topic, "subscribe failed");
                    } else {
                        tracing::debug!(topic, "subscribed");
                    }
                }
                if events.send(LinkEvent::Connected).await.is_err() {
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                let message = LinkEvent::Message {
                    topic: publish.topic,
                    payload,
                };
                if events.send(message).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => {
                let was_up = connected.swap(false, Ordering::SeqCst);
                if was_up && events.send(LinkEvent::Disconnected).await.is_err() {
                    break;
                }
                tracing::warn!(%err, retry_in = ?backoff, "mqtt connection error");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(backoff_max);
            }
        }
    }
    tracing::debug!("mqtt event receiver dropped, driver stopped");
}
