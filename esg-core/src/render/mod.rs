// esg-core/src/render/mod.rs

pub mod channel;
pub mod console;
pub mod errors;
pub mod theme;
pub mod traits;

pub use channel::ChannelRenderer;
pub use console::ConsoleRenderer;
pub use errors::RenderError;
pub use theme::{Category, Theme};
pub use traits::Renderer;
