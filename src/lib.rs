pub mod audio;
pub mod config;
pub mod garden;
pub mod letter;
pub mod logging;
pub mod menubar;
pub mod narrative;
pub mod player;
pub mod provider;
pub mod renderer;
pub mod transcript;
pub mod types;
