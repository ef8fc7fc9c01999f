//! Model access: artifact loading, classifier backends and inference

pub mod classifier;
pub mod handle;
pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use classifier::{Classifier, LogisticClassifier};
pub use handle::ModelHandle;
pub use inference::ModelArtifact;
pub use loader::ModelLoader;
