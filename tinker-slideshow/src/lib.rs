//! Slideshow process control: launch, terminate by recorded pid, restart.

mod error;
pub mod paths;
pub mod process;

pub use error::SlideshowError;
pub use process::{Launch, ProcessSlideshow, Slideshow, Termination};
