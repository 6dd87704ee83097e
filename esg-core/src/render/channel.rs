use async_trait::async_trait;
use tokio::sync::mpsc;

use esg_common::analytics::Snapshot;

use crate::render::errors::RenderError;
use crate::render::traits::Renderer;

/// Hands each snapshot to an async consumer (web front end, tests, export).
pub struct ChannelRenderer {
    tx: mpsc::Sender<Snapshot>,
    name: String,
}

impl ChannelRenderer {
    pub fn new(tx: mpsc::Sender<Snapshot>) -> Self {
        Self {
            tx,
            name: "channel".to_string(),
        }
    }

    /// Renderer plus the receiving end, with room for `capacity` snapshots.
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<Snapshot>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Renderer for ChannelRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, snapshot: Snapshot) -> Result<(), RenderError> {
        self.tx
            .send(snapshot)
            .await
            .map_err(|_| RenderError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esg_common::analytics::{FixedVariation, SnapshotBuilder};
    use esg_common::data::Selection;

    fn empty_snapshot(tick: u64) -> Snapshot {
        SnapshotBuilder::default().build(tick, &Selection::legacy("x"), &[], &mut FixedVariation::constant(0, 1))
    }

    #[tokio::test]
    async fn test_delivers_snapshots_in_order() {
        let (mut renderer, mut rx) = ChannelRenderer::pair(4);
        renderer.publish(empty_snapshot(1)).await.unwrap();
        renderer.publish(empty_snapshot(2)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().tick, 1);
        assert_eq!(rx.recv().await.unwrap().tick, 2);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_terminal() {
        let (mut renderer, rx) = ChannelRenderer::pair(1);
        drop(rx);
        let err = renderer.publish(empty_snapshot(1)).await.unwrap_err();
        assert!(err.is_terminal());
    }
}
