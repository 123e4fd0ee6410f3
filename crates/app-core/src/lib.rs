pub mod cache;
pub mod catalog;
pub mod constants;
pub mod gaze;
pub mod nav;
pub mod scene;
pub mod session;
pub mod tutorial;

pub use cache::*;
pub use catalog::*;
pub use constants::*;
pub use gaze::*;
pub use nav::*;
pub use scene::*;
pub use session::*;
pub use tutorial::*;
