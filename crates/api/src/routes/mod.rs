pub mod analysis;
pub mod runs;
pub mod settlement;
