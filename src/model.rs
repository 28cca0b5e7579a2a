pub mod window;
pub mod window_store;

pub use window::{Window, WindowId, WindowState};
pub use window_store::WindowStore;
