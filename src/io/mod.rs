//! Model persistence.

pub mod model_file;

pub use model_file::{
    load_booster, model_file_path, model_files_beyond, save_booster, ModelEnvelope,
};
