pub mod compose;
pub mod convert;
pub mod edit;
pub mod inspect;
pub mod reduce;
pub mod rename;

use crate::error::{CliError, Result};
use biosimi::core::io::toml_model::TomlModelFile;
use biosimi::core::io::traits::ModelFile;
use biosimi::core::models::document::Document;
use biosimi::core::models::subsystem::Subsystem;
use biosimi::engine::diagnostics::StructuralWarning;
use std::path::Path;
use tracing::info;

pub(crate) fn load_subsystem(path: &Path) -> Result<Subsystem> {
    info!("Loading model document from {:?}", path);
    let document = TomlModelFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(Subsystem::new(document))
}

pub(crate) fn write_document(document: &Document, path: &Path) -> Result<()> {
    info!("Writing model '{}' to {:?}", document.model().id, path);
    TomlModelFile::write_to_path(document, path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub(crate) fn report_warnings(warnings: &[StructuralWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("{} warning(s):", warnings.len());
    for warning in warnings {
        println!("  ⚠ {}", warning);
    }
}
