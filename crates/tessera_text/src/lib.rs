pub mod bmfont;
pub mod font;
pub mod text;

use std::path::PathBuf;

use tessera_render::{AssetLoadError, CompileError};
use thiserror::Error;

pub use bmfont::{BmChar, BmFont};
pub use font::{Font, TextMesh, layout};
pub use text::Text;

#[derive(Debug, Error)]
pub enum FontError {
    #[error(transparent)]
    Asset(#[from] AssetLoadError),
    #[error("font line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("font `{0}` names no page 0 texture")]
    MissingPage(PathBuf),
    #[error(transparent)]
    Program(#[from] CompileError),
}
