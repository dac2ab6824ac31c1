//! Model lifecycle and inference components

pub mod adapter;
pub mod loader;

pub use adapter::{Classifier, ModelAdapter};
pub use loader::OnnxClassifier;
