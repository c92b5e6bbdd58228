mod renderer;
mod text;
mod transform;

pub use renderer::Renderer;
pub use transform::{world_to_screen, world_to_screen_px, Viewport, PIXELS_PER_WORLD};

pub const PLACEHOLDER_HALF_SIZE_PX: i32 = 12;
