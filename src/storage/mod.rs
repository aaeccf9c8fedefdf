mod checkpoint;
mod layout;

pub use checkpoint::CheckpointStore;
pub use layout::{OutputLayout, OUTPUT_KINDS};
