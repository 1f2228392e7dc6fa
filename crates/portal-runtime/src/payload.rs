#![forbid(unsafe_code)]

//! Multipart payload assembly.
//!
//! One part per catalog field, in catalog order, named by the field's wire
//! name. Non-file fields become `"<Label>: <Value>"` text parts with the
//! label translated; select codes are replaced by their translated option
//! label. File fields carry the picked blob unchanged.

use portal_core::{FieldCatalog, FieldDescriptor, FieldValue, FileBlob};
use portal_i18n::Translate;

use crate::form::FormValues;

/// Body of one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Text(String),
    File(FileBlob),
}

/// One named multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub body: PartBody,
}

/// Ordered parts of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    parts: Vec<Part>,
}

impl MultipartPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.parts.push(Part {
            name: name.into(),
            body: PartBody::Text(text.into()),
        });
    }

    pub fn push_file(&mut self, name: impl Into<String>, blob: FileBlob) {
        self.parts.push(Part {
            name: name.into(),
            body: PartBody::File(blob),
        });
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// Text of a text part.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match &self.get(name)?.body {
            PartBody::Text(text) => Some(text),
            PartBody::File(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Sum of text and file bytes, excluding multipart framing.
    #[must_use]
    pub fn content_bytes(&self) -> u64 {
        self.parts
            .iter()
            .map(|part| match &part.body {
                PartBody::Text(text) => text.len() as u64,
                PartBody::File(blob) => blob.size(),
            })
            .sum()
    }
}

fn display_value(field: &FieldDescriptor, value: &FieldValue, translator: &dyn Translate) -> String {
    match value {
        FieldValue::Empty | FieldValue::File(_) => String::new(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::Code(code) => {
            let label_key = field.option(code).map_or(code.as_str(), |o| o.label_key.as_str());
            translator.translate(label_key)
        }
    }
}

/// Build the submission payload from form values.
///
/// An empty file field produces no part.
#[must_use]
pub fn build_payload(
    catalog: &FieldCatalog,
    values: &FormValues,
    translator: &dyn Translate,
) -> MultipartPayload {
    let mut payload = MultipartPayload::new();
    for field in catalog.iter() {
        let name = field.key().as_str();
        let value = values.get(&field.key()).cloned().unwrap_or_default();
        if field.is_file() {
            if let FieldValue::File(blob) = value {
                payload.push_file(name, blob);
            }
            continue;
        }
        let label = translator.translate(field.label_key());
        let shown = display_value(field, &value, translator);
        payload.push_text(name, format!("{label}: {shown}"));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::FieldKey;
    use portal_i18n::{CatalogTranslator, Locale};
    use pretty_assertions::assert_eq;

    fn values() -> FormValues {
        let catalog = FieldCatalog::standard();
        let mut values: FormValues = catalog
            .iter()
            .map(|field| (field.key(), field.default_value()))
            .collect();
        values.insert(FieldKey::Fio, FieldValue::text("A B"));
        values.insert(FieldKey::LayerTheme, FieldValue::code("LAYER_THEME.INDUSTRY"));
        values.insert(FieldKey::Chronology, FieldValue::code("1970"));
        values.insert(
            FieldKey::File,
            FieldValue::File(FileBlob::new("scan.pdf", vec![1, 2, 3]).with_content_type("application/pdf")),
        );
        values
    }

    #[test]
    fn parts_follow_catalog_order() {
        let payload = build_payload(
            &FieldCatalog::standard(),
            &values(),
            &CatalogTranslator::builtin(Locale::Ru),
        );
        let names: Vec<&str> = payload.parts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["fio", "work", "position", "layerTheme", "chronology", "fileType", "file", "phone", "email"]
        );
    }

    #[test]
    fn text_parts_are_labelled_and_translated() {
        let payload = build_payload(
            &FieldCatalog::standard(),
            &values(),
            &CatalogTranslator::builtin(Locale::Ru),
        );
        assert_eq!(payload.text("fio"), Some("Ф.И.О.: A B"));
        assert_eq!(payload.text("layerTheme"), Some("Тема слоя: Промышленность"));
        assert_eq!(payload.text("chronology"), Some("Хронология: 1970"));
        assert_eq!(payload.text("email"), Some("Электронная почта: "));
        assert_eq!(payload.text("fileType"), Some("Тип файла: "));
    }

    #[test]
    fn file_parts_carry_blob() {
        let payload = build_payload(
            &FieldCatalog::standard(),
            &values(),
            &CatalogTranslator::builtin(Locale::Uz),
        );
        let Some(Part { body: PartBody::File(blob), .. }) = payload.get("file") else {
            panic!("file part missing");
        };
        assert_eq!(blob.file_name(), "scan.pdf");
        assert_eq!(blob.content_type(), Some("application/pdf"));
        assert_eq!(payload.text("file"), None);
        assert!(payload.get("navigation").is_none());
        assert_eq!(payload.text("layerTheme"), Some("Qatlam mavzusi: Sanoat"));
    }
}
