//! Fixed-capacity sample window fed by the host's audio blocks.
//!
//! Storage is allocated once; `append` only copies. The window always holds the
//! most recent `capacity` samples (zeros until enough audio has arrived).

/// Ring buffer holding the most recent samples of the live stream.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    buffer: Box<[f32]>,
    write_index: usize,
    total_written: u64,
}

impl SampleWindow {
    /// Creates a zero-filled window of `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            write_index: 0,
            total_written: 0,
        }
    }

    /// Writes a block at the current write index, wrapping around.
    ///
    /// An empty block leaves the window untouched. Blocks longer than the
    /// window only keep their trailing `capacity` samples.
    pub fn append(&mut self, block: &[f32]) {
        let capacity = self.buffer.len();
        if block.is_empty() || capacity == 0 {
            return;
        }
        self.total_written += block.len() as u64;

        let block = if block.len() > capacity {
            let skipped = block.len() - capacity;
            self.write_index = (self.write_index + skipped) % capacity;
            &block[skipped..]
        } else {
            block
        };

        let head = (capacity - self.write_index).min(block.len());
        self.buffer[self.write_index..self.write_index + head].copy_from_slice(&block[..head]);
        let tail = block.len() - head;
        if tail > 0 {
            self.buffer[..tail].copy_from_slice(&block[head..]);
        }
        self.write_index = (self.write_index + block.len()) % capacity;
    }

    /// Copies the window into `out` ordered oldest to newest.
    ///
    /// `out` must be exactly `capacity` long.
    pub fn copy_ordered(&self, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.buffer.len());
        let older = &self.buffer[self.write_index..];
        out[..older.len()].copy_from_slice(older);
        out[older.len()..].copy_from_slice(&self.buffer[..self.write_index]);
    }

    /// Raw storage in write order (not chronological once wrapped).
    pub fn as_raw(&self) -> &[f32] {
        &self.buffer
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Position the next sample will be written to.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Total samples appended since construction.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// True once at least `capacity` samples have been appended.
    pub fn is_primed(&self) -> bool {
        self.total_written >= self.buffer.len() as u64
    }
}
