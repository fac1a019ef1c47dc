pub mod config;
pub mod dispatch;
pub mod host;
pub mod icon;
pub mod input;
pub mod location_view;
pub mod pointer;
pub mod selection;
pub mod session;
pub mod shortcuts;
pub mod testing;
pub mod timer;

pub use config::GestureConfig;
pub use dispatch::{Gesture, GestureDispatcher, GestureHandler, HandlerContext};
pub use host::{GeometryPayload, Surface, Transport};
pub use session::{EventOutcome, GestureSession};
