pub mod detection;
pub mod geometry;
pub mod session;
pub mod shared;
