//! Bridge runtime
//!
//! [`Bridge`] owns one [`EspuinoDevice`] and feeds it from the MQTT session.
//! Inbound device messages are dispatched to the device, JSON commands on
//! the control topic become device commands, and every entity whose state
//! changed is republished as a retained JSON snapshot.

use std::time::Duration;

use espuino_state::media_player::ENTITY_KEY;
use espuino_state::notify::{self, UpdateReceiver};
use espuino_state::{EspuinoDevice, PlayerCommand, Publish};
use rumqttc::{Event, EventLoop, Outgoing, Packet};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::sink::CommandSink;

/// How long to keep polling for the outgoing disconnect on shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Bridge<S> {
    device: EspuinoDevice,
    updates: UpdateReceiver,
    sink: S,
    control_topic: String,
    snapshot_root: String,
}

impl<S: CommandSink> Bridge<S> {
    pub fn new(config: &BridgeConfig, sink: S) -> Self {
        let (notifier, updates) = notify::channel();
        let device = EspuinoDevice::new(
            config.identity(),
            config.topic_resolver(),
            &config.sensors,
            notifier,
        );

        Self {
            device,
            updates,
            sink,
            control_topic: config.control_topic(),
            snapshot_root: config.snapshot_root(),
        }
    }

    pub fn device(&self) -> &EspuinoDevice {
        &self.device
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn control_topic(&self) -> &str {
        &self.control_topic
    }

    /// Topic an entity's snapshot is published to
    pub fn snapshot_topic(&self, entity_key: &str) -> String {
        format!("{}/{}/state", self.snapshot_root, entity_key)
    }

    /// Device topics plus the control topic
    pub fn subscriptions(&self) -> Vec<String> {
        let mut topics = self.device.subscriptions();
        topics.push(self.control_topic.clone());
        topics
    }

    pub async fn subscribe_all(&mut self) -> Result<()> {
        let topics = self.subscriptions();
        for topic in &topics {
            self.sink.subscribe(topic).await?;
        }
        info!("Subscribed to {} topics", topics.len());
        Ok(())
    }

    pub async fn unsubscribe_all(&mut self) -> Result<()> {
        for topic in self.subscriptions() {
            self.sink.unsubscribe(&topic).await?;
        }
        Ok(())
    }

    /// Handle one inbound message and publish the resulting snapshots
    pub async fn handle_message(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        let payload = String::from_utf8_lossy(payload);
        debug!("Received {} on {}", payload, topic);

        if topic == self.control_topic {
            self.handle_command(&payload).await?;
        } else if !self.device.dispatch(topic, &payload) {
            debug!("Ignoring message on unrouted topic {}", topic);
        }

        self.publish_pending().await?;
        Ok(())
    }

    async fn handle_command(&mut self, payload: &str) -> Result<()> {
        let command: PlayerCommand = match serde_json::from_str(payload) {
            Ok(command) => command,
            Err(e) => {
                let error = BridgeError::InvalidCommand(e);
                warn!("Dropping command {:?}: {}", payload, error);
                return Ok(());
            }
        };

        let message = self.device.player_mut().execute(command);
        debug!("Command {:?} -> {} = {}", command, message.topic, message.payload);
        self.sink.publish(message).await
    }

    /// Publish snapshots for every entity with a pending update
    ///
    /// Several updates for the same entity collapse into one snapshot.
    /// Returns the number of snapshots published.
    pub async fn publish_pending(&mut self) -> Result<usize> {
        let mut changed: Vec<String> = Vec::new();
        for update in self.updates.try_iter() {
            if !changed.contains(&update.unique_id) {
                changed.push(update.unique_id);
            }
        }

        let mut published = 0;
        for unique_id in &changed {
            match self.snapshot_message(unique_id)? {
                Some(message) => {
                    self.sink.publish_retained(message).await?;
                    published += 1;
                }
                None => warn!("Update for unknown entity {}", unique_id),
            }
        }
        Ok(published)
    }

    /// Publish every entity's snapshot, pending or not
    pub async fn publish_all_snapshots(&mut self) -> Result<()> {
        // Everything is about to be published anyway
        self.updates.try_iter().for_each(drop);

        let mut messages = Vec::with_capacity(1 + self.device.sensors().len());
        messages.push(self.encode(ENTITY_KEY, &self.device.player().snapshot())?);
        for sensor in self.device.sensors() {
            messages.push(self.encode(sensor.kind().key(), &sensor.snapshot())?);
        }

        for message in messages {
            self.sink.publish_retained(message).await?;
        }
        Ok(())
    }

    fn snapshot_message(&self, unique_id: &str) -> Result<Option<Publish>> {
        let player = self.device.player();
        if player.unique_id() == unique_id {
            return self.encode(ENTITY_KEY, &player.snapshot()).map(Some);
        }

        match self.device.sensors().iter().find(|s| s.unique_id() == unique_id) {
            Some(sensor) => self.encode(sensor.kind().key(), &sensor.snapshot()).map(Some),
            None => Ok(None),
        }
    }

    fn encode<T: Serialize>(&self, entity_key: &str, snapshot: &T) -> Result<Publish> {
        let payload = serde_json::to_string(snapshot).map_err(BridgeError::Serialize)?;
        Ok(Publish::new(self.snapshot_topic(entity_key), payload))
    }

    /// Drive the MQTT session until Ctrl-C
    ///
    /// Subscriptions are (re)made and all snapshots republished on every
    /// ConnAck. Connection errors are logged and the event loop is polled
    /// again after `reconnect_delay`; rumqttc reconnects on the next poll.
    pub async fn run(mut self, mut eventloop: EventLoop, reconnect_delay: Duration) -> Result<()> {
        info!(
            "Bridging device {} (control topic {})",
            self.device.identity(),
            self.control_topic
        );

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                    info!("Shutdown requested");
                    break;
                }
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        info!("Connected to broker (session present: {})", ack.session_present);
                        self.subscribe_all().await?;
                        self.publish_all_snapshots().await?;
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.handle_message(&publish.topic, &publish.payload).await?;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(
                            "MQTT connection error: {}, retrying in {}s",
                            e,
                            reconnect_delay.as_secs()
                        );
                        tokio::time::sleep(reconnect_delay).await;
                    }
                }
            }
        }

        self.shutdown(&mut eventloop).await
    }

    async fn shutdown(&mut self, eventloop: &mut EventLoop) -> Result<()> {
        self.unsubscribe_all().await?;
        self.sink.disconnect().await?;

        // Requests only leave the client while the event loop is polled
        let flushed = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Connection closed during shutdown: {}", e);
                        break;
                    }
                }
            }
        })
        .await;

        if flushed.is_err() {
            warn!("Timed out waiting for the broker during shutdown");
        }
        info!("Bridge stopped");
        Ok(())
    }
}
