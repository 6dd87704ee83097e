// esg-core/src/render/traits.rs

use async_trait::async_trait;
use esg_common::analytics::Snapshot;

use crate::render::errors::RenderError;

/// The presentation side of the loop. Receives exactly one whole snapshot
/// per tick and owns it from then on.
#[async_trait]
pub trait Renderer: Send {
    fn name(&self) -> &str;

    async fn publish(&mut self, snapshot: Snapshot) -> Result<(), RenderError>;
}
