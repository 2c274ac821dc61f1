//! Utility modules for page assembly.

pub mod minify;
pub mod slug;
