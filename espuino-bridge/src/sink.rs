//! Outbound side of the MQTT session
//!
//! The bridge only needs a handful of client requests. [`CommandSink`] names
//! them so the runtime can be driven against a recording sink in tests.

use async_trait::async_trait;
use espuino_state::Publish;
use rumqttc::{AsyncClient, QoS};

use crate::error::Result;

/// Requests the bridge makes of its MQTT client
///
/// Every request is fire-and-forget at QoS 0: returning `Ok` means the
/// request was queued, not that the broker or device saw it.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Publish a device command, not retained
    async fn publish(&self, message: Publish) -> Result<()>;

    /// Publish an entity snapshot, retained so late observers see it
    async fn publish_retained(&self, message: Publish) -> Result<()>;

    async fn subscribe(&self, topic: &str) -> Result<()>;

    async fn unsubscribe(&self, topic: &str) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;
}

#[async_trait]
impl CommandSink for AsyncClient {
    async fn publish(&self, message: Publish) -> Result<()> {
        AsyncClient::publish(self, message.topic, QoS::AtMostOnce, false, message.payload).await?;
        Ok(())
    }

    async fn publish_retained(&self, message: Publish) -> Result<()> {
        AsyncClient::publish(self, message.topic, QoS::AtMostOnce, true, message.payload).await?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<()> {
        AsyncClient::subscribe(self, topic, QoS::AtMostOnce).await?;
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<()> {
        AsyncClient::unsubscribe(self, topic).await?;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        AsyncClient::disconnect(self).await?;
        Ok(())
    }
}
