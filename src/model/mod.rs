//! Schema model and model-file loading

mod builder;
mod elements;
mod schema_model;

pub use builder::{build_model, load_model_file, LoadedModel};
pub use elements::*;
pub use schema_model::SchemaModel;
