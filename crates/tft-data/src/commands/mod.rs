mod config;
mod fuse;

pub use config::*;
pub use fuse::*;
