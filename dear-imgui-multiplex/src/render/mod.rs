//! Draw output: library views and captured buffers

pub mod draw_data;
pub mod snapshot;

pub use draw_data::*;
pub use snapshot::*;
