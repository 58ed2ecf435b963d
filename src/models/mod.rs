//! Trained model components: loading, inference and the decision threshold

pub mod inference;
pub mod loader;
pub mod logistic;
pub mod threshold;

pub use inference::{FraudModel, OnnxModel};
pub use loader::{load_fraud_model, load_threshold, ModelLoader};
pub use logistic::LogisticModel;
pub use threshold::Threshold;
