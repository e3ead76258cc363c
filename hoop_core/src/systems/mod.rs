pub mod aim;
pub mod camera;
pub mod lifecycle;
pub mod scoring;

pub use aim::*;
pub use camera::*;
pub use lifecycle::*;
pub use scoring::*;
