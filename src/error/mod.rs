use crate::compositor::RenderError;
use crate::editor::LayerError;
use crate::export::ExportError;
use crate::gallery::GalleryError;
use crate::net::FetchError;
use crate::state::StateError;
use crate::storage::StorageError;
use crate::template::TemplateError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
