pub mod clubs;
pub mod communities;
pub mod map;
