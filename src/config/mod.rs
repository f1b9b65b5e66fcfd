//! Configuration: path resolution and user settings

pub mod paths;
pub mod settings;

pub use paths::CamPaths;
pub use settings::Settings;
