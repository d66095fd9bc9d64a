//! Push bus: plugin messages from the socket, fanned out to subscribers.

use shared::PluginMessage;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Broadcast channel for plugin messages of every plugin.
#[derive(Clone)]
pub struct PushBus {
    tx: broadcast::Sender<PluginMessage>,
}

impl Default for PushBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PushBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn publish(&self, msg: PluginMessage) {
        let _ = self.tx.send(msg);
    }

    /// Subscription that only yields messages addressed to `identity`.
    pub fn subscribe_plugin(&self, identity: impl Into<String>) -> PluginSubscription {
        PluginSubscription {
            identity: identity.into(),
            rx: self.tx.subscribe(),
        }
    }
}

pub struct PluginSubscription {
    identity: String,
    rx: broadcast::Receiver<PluginMessage>,
}

impl PluginSubscription {
    /// Next message for this plugin, `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<PluginMessage> {
        loop {
            match self.rx.recv().await {
                Ok(msg) if msg.plugin == self.identity => return Some(msg),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "push subscriber lagged, batches dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(plugin: &str, n: u64) -> PluginMessage {
        PluginMessage {
            plugin: plugin.to_string(),
            data: json!({ "n": n }),
        }
    }

    #[tokio::test]
    async fn subscription_filters_by_identity() {
        let bus = PushBus::new();
        let mut sub = bus.subscribe_plugin("octorelay");
        bus.publish(msg("psucontrol", 1));
        bus.publish(msg("octorelay", 2));
        bus.publish(msg("octorelay", 3));
        drop(bus);

        assert_eq!(sub.recv().await, Some(msg("octorelay", 2)));
        assert_eq!(sub.recv().await, Some(msg("octorelay", 3)));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let bus = PushBus::new();
        bus.publish(msg("octorelay", 1));
        let mut sub = bus.subscribe_plugin("octorelay");
        bus.publish(msg("octorelay", 2));
        assert_eq!(sub.recv().await, Some(msg("octorelay", 2)));
    }
}
