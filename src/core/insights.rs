//! In-process insight bus.
//!
//! Reports publish typed [`Insight`]s that other agents may consume. The bus
//! is a `tokio` broadcast channel: publishing without subscribers is fine, and
//! a slow subscriber loses the oldest messages instead of blocking publishers.

use crate::core::agent::Agent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Buffered insights per subscriber before the oldest are dropped
pub const DEFAULT_CAPACITY: usize = 256;

/// A finding one agent shares with the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Insight {
    /// A style whose purchases grew against the previous window
    MarketTrend {
        /// Artwork style
        style: String,
        /// Purchases in the current window
        current_purchases: i64,
        /// Purchases in the previous window
        previous_purchases: i64,
        /// Purchase growth in percent
        growth_percentage: f64,
    },
    /// A style ranked highly by engagement
    ContentPerformance {
        /// Artwork style
        style: String,
        /// Weighted engagement score
        engagement_score: i64,
    },
}

/// An insight together with the agent that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMessage {
    /// Agent that published the insight
    pub source: Agent,
    /// The finding itself
    #[serde(flatten)]
    pub insight: Insight,
}

/// Publish/subscribe hub for insights.
#[derive(Debug, Clone)]
pub struct InsightBus {
    sender: broadcast::Sender<InsightMessage>,
}

impl Default for InsightBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InsightBus {
    /// Creates a bus buffering up to `capacity` messages per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an insight and returns how many subscribers received it.
    pub fn publish(&self, source: Agent, insight: Insight) -> usize {
        debug!("Publishing insight from {}: {:?}", source, insight);
        let delivered = self
            .sender
            .send(InsightMessage { source, insight })
            .unwrap_or(0);
        if delivered == 0 {
            debug!("No subscribers listening for insights");
        }
        delivered
    }

    /// Subscribes on behalf of `agent`; the agent's own insights are skipped.
    #[must_use]
    pub fn subscribe(&self, agent: Agent) -> InsightReceiver {
        InsightReceiver {
            agent,
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving end held by one agent.
#[derive(Debug)]
pub struct InsightReceiver {
    agent: Agent,
    receiver: broadcast::Receiver<InsightMessage>,
}

impl InsightReceiver {
    /// Waits for the next insight from another agent.
    ///
    /// Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<InsightMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if message.source == self.agent => {}
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("{} lagged behind by {} insights", self.agent, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Drains every insight already waiting, without blocking.
    pub fn drain(&mut self) -> Vec<InsightMessage> {
        let mut messages = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) if message.source == self.agent => {}
                Ok(message) => messages.push(message),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("{} lagged behind by {} insights", self.agent, skipped);
                }
                Err(_) => return messages,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(style: &str) -> Insight {
        Insight::MarketTrend {
            style: style.to_string(),
            current_purchases: 4,
            previous_purchases: 2,
            growth_percentage: 100.0,
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = InsightBus::default();
        assert_eq!(bus.publish(Agent::Cloe, trend("Abstract")), 0);
    }

    #[tokio::test]
    async fn test_subscribers_skip_their_own_insights() {
        let bus = InsightBus::new(8);
        let mut cloe = bus.subscribe(Agent::Cloe);
        let mut strategist = bus.subscribe(Agent::BusinessStrategist);
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(Agent::Cloe, trend("Abstract"));
        bus.publish(
            Agent::BusinessStrategist,
            Insight::ContentPerformance {
                style: "Pop".to_string(),
                engagement_score: 90,
            },
        );

        let received = strategist.recv().await;
        assert_eq!(
            received.map(|message| message.source),
            Some(Agent::Cloe)
        );
        assert!(strategist.drain().is_empty());

        let from_others = cloe.drain();
        assert_eq!(from_others.len(), 1);
        assert_eq!(from_others[0].source, Agent::BusinessStrategist);
    }

    #[tokio::test]
    async fn test_recv_ends_when_bus_dropped() {
        let bus = InsightBus::new(4);
        let mut receiver = bus.subscribe(Agent::Thorius);
        drop(bus);
        assert_eq!(receiver.recv().await, None);
    }

    #[test]
    fn test_message_serializes_flat() {
        let message = InsightMessage {
            source: Agent::Cloe,
            insight: trend("Abstract"),
        };
        let json = serde_json::to_value(&message).unwrap_or_default();
        assert_eq!(json["source"], "cloe");
        assert_eq!(json["type"], "market_trend");
        assert_eq!(json["style"], "Abstract");
    }
}
