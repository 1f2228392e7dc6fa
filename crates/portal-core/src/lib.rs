#![forbid(unsafe_code)]

//! Submission portal core data model.
//!
//! This crate holds the static pieces every other crate builds on: the
//! [`FieldCatalog`] describing which fields the portal collects and the
//! [`FieldValue`] model of what a field currently holds. It performs no IO.

pub mod catalog;
pub mod value;

pub use catalog::{
    AcceptedTypes, CHRONOLOGY_END, CHRONOLOGY_START, CHRONOLOGY_STEP, CatalogError, FILE_ACCEPT,
    FILE_MAX_BYTES, FILE_TYPES, FieldCatalog, FieldDescriptor, FieldKey, InputKind, LAYER_THEMES,
    NAVIGATION_ACCEPT, NAVIGATION_MAX_BYTES, SelectOption, chronology_years,
};
pub use value::{FieldValue, FileBlob};
