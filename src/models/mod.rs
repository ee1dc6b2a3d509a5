pub mod image;
pub mod prompt;
pub mod usage;

pub use image::*;
pub use prompt::*;
pub use usage::*;
