pub mod source;
pub mod tone;
pub mod wav;

pub use source::{BlockSource, split_blocks};
pub use tone::ToneGenerator;
pub use wav::WavBlockSource;
