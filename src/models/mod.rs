//! Data models for the RTI Request Filing application.
//!
//! These models match the frontend interfaces exactly for seamless interoperability.

mod application;
mod department;
mod draft;
mod template;

pub use application::*;
pub use department::*;
pub use draft::*;
pub use template::*;
