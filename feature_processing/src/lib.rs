pub mod misc;
pub mod processor;
