pub mod simulation;
pub mod user;

pub use simulation::*;
pub use user::*;
