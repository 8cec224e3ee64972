pub mod app;
pub mod keys;
mod signals;

pub use app::{run_winit_app, FixedStep};
pub use signals::ExitSignal;
