use super::document::{Document, SchemaVersion};
use super::model::Model;

/// One self-contained reaction model taking part in a composition.
///
/// Composition operators only ever read subsystems; edits go through the
/// explicit editing methods and affect this handle alone.
#[derive(Debug, Clone, Default)]
pub struct Subsystem {
    document: Document,
}

impl Subsystem {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn from_model(model: Model) -> Self {
        Self::new(Document::new(SchemaVersion::LATEST, model))
    }

    pub fn id(&self) -> &str {
        &self.document.model().id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn model(&self) -> &Model {
        self.document.model()
    }

    pub fn model_mut(&mut self) -> &mut Model {
        self.document.model_mut()
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl From<Document> for Subsystem {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}
