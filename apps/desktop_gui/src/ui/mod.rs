//! UI layer for desktop GUI: app shell, the GIF grid widget and inline
//! previews.

pub mod app;
pub mod preview;
pub mod widgets;

pub use app::PortalApp;
