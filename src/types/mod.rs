//! Data types shared by the config, render and interaction layers.

mod config;
mod overlay;
mod selection;
mod table;

pub use config::*;
pub use overlay::*;
pub use selection::*;
pub use table::*;
