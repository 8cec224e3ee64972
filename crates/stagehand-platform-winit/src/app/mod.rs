mod clock;
mod handler;

pub use clock::FixedStep;
pub use handler::run_winit_app;
