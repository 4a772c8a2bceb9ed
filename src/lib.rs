pub mod app;
pub mod compositor;
mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod gallery;
pub mod geometry;
pub mod logging;
pub mod net;
pub mod notification;
pub mod state;
pub mod storage;
pub mod template;
pub use error::{AppError, AppResult};

/// Entrypoint used by the binary.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting memeforge");

    let app = app::App::new();
    app.start()?;

    tracing::info!("memeforge exited");
    Ok(())
}
