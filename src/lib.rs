pub mod bridge;
pub mod card;
pub mod color;
pub mod config;
pub mod editor;
pub mod raster;
pub mod renderer;
pub mod time_utils;

pub use card::{render_card, CardState, EntityState, HostStates};
pub use config::{resolve, ClockConfiguration, ConfigError, RawConfig};
pub use renderer::{render, RenderedClock};
pub use time_utils::{LocalClock, WallClock};
