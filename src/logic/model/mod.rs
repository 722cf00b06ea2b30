//! Model Module - epicenter inference
//!
//! The trained regression is consumed as an opaque `EpicenterModel`.
//! Swapping the artifact format only touches `inference`.

pub mod inference;

pub use inference::{
    EngineStatus, EpicenterModel, InferenceEngine, InferenceError, LinearModel, Serialized,
    StatefulModel,
};
