//! Block-oriented audio sources.

use crate::error::Result;

/// Something that yields fixed-length mono blocks of f32 samples.
pub trait BlockSource: Send {
    /// Native sample rate of the produced blocks.
    fn sample_rate(&self) -> u32;

    /// Samples per block.
    fn block_length(&self) -> usize;

    /// Next block, or `None` once the source is exhausted.
    ///
    /// # Returns
    /// Exactly `block_length()` samples per block, or an error
    fn next_block(&mut self) -> Result<Option<Vec<f32>>>;
}

impl BlockSource for Box<dyn BlockSource> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn block_length(&self) -> usize {
        (**self).block_length()
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        (**self).next_block()
    }
}

/// Splits `samples` into blocks of `block_length`, zero-padding the last.
pub fn split_blocks(samples: &[f32], block_length: usize) -> Vec<Vec<f32>> {
    if block_length == 0 {
        return Vec::new();
    }
    samples
        .chunks(block_length)
        .map(|chunk| {
            let mut block = chunk.to_vec();
            block.resize(block_length, 0.0);
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_blocks_pads_tail() {
        let blocks = split_blocks(&[1.0, 2.0, 3.0, 4.0, 5.0], 2);
        assert_eq!(blocks, vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 0.0]]);
    }

    #[test]
    fn test_split_blocks_empty_input() {
        assert!(split_blocks(&[], 128).is_empty());
        assert!(split_blocks(&[1.0], 0).is_empty());
    }
}
