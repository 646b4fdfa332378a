//! Rolling record of recent successful detections.

/// One successful detection: the period and the peak level around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    /// Detected period in samples.
    pub period: usize,
    /// Largest absolute sample over the first two periods of the window.
    pub amplitude: f32,
}

impl HistoryEntry {
    pub fn new(period: usize, amplitude: f32) -> Self {
        Self { period, amplitude }
    }

    /// Builds the entry for a detection of `period` on `window`.
    pub fn from_window(window: &[f32], period: usize) -> Self {
        Self::new(period, peak_amplitude(window, period))
    }
}

/// Fixed-capacity circular queue of history entries.
///
/// Storage is allocated at construction. Once full, each push overwrites the
/// oldest entry; iteration is always oldest → newest.
#[derive(Debug, Clone)]
pub struct ProsodyHistory {
    entries: Box<[HistoryEntry]>,
    next: usize,
    len: usize,
}

impl ProsodyHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new(0, 0.0); capacity].into_boxed_slice(),
            next: 0,
            len: 0,
        }
    }

    /// Appends an entry, evicting the oldest when full.
    pub fn push(&mut self, entry: HistoryEntry) {
        let capacity = self.entries.len();
        if capacity == 0 {
            return;
        }
        self.entries[self.next] = entry;
        self.next = (self.next + 1) % capacity;
        self.len = (self.len + 1).min(capacity);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Entries ordered oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        let capacity = self.entries.len();
        let start = (self.next + capacity - self.len) % capacity.max(1);
        (0..self.len).map(move |i| &self.entries[(start + i) % capacity])
    }

    /// Oldest entry still held.
    pub fn oldest(&self) -> Option<&HistoryEntry> {
        self.iter().next()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.entries.len();
        Some(&self.entries[(self.next + capacity - 1) % capacity])
    }
}

/// Largest absolute sample in the first `2 * period` samples of `window`.
///
/// The scan is bounded so its cost does not grow with the window size.
pub fn peak_amplitude(window: &[f32], period: usize) -> f32 {
    let end = period.saturating_mul(2).min(window.len());
    window[..end].iter().fold(0.0f32, |peak, &s| peak.max(s.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periods(history: &ProsodyHistory) -> Vec<usize> {
        history.iter().map(|e| e.period).collect()
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = ProsodyHistory::new(50);
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 50);
        assert!(history.oldest().is_none());
        assert!(history.latest().is_none());
        assert_eq!(history.iter().count(), 0);
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut history = ProsodyHistory::new(4);
        for period in [100, 101, 102] {
            history.push(HistoryEntry::new(period, 0.5));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(periods(&history), vec![100, 101, 102]);
        assert_eq!(history.latest().map(|e| e.period), Some(102));
    }

    #[test]
    fn test_full_history_evicts_oldest() {
        let mut history = ProsodyHistory::new(50);
        // Sentinel first, then 49 regular entries fill the queue.
        history.push(HistoryEntry::new(9999, 0.9));
        for i in 0..49 {
            history.push(HistoryEntry::new(200 + i, 0.5));
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.oldest().map(|e| e.period), Some(9999));

        // The 51st detection pushes the sentinel out.
        history.push(HistoryEntry::new(7777, 0.4));
        assert_eq!(history.len(), 50);
        assert!(history.iter().all(|e| e.period != 9999));
        assert_eq!(history.oldest().map(|e| e.period), Some(200));
        assert_eq!(history.latest().map(|e| e.period), Some(7777));
    }

    #[test]
    fn test_wraps_many_times() {
        let mut history = ProsodyHistory::new(3);
        for period in 0..10 {
            history.push(HistoryEntry::new(period, 0.0));
        }
        assert_eq!(periods(&history), vec![7, 8, 9]);
    }

    #[test]
    fn test_peak_amplitude_bounded_to_two_periods() {
        let mut window = vec![0.1f32; 100];
        window[5] = -0.6;
        window[50] = 0.9; // beyond 2 * 10 samples, ignored
        assert_eq!(peak_amplitude(&window, 10), 0.6);
    }

    #[test]
    fn test_peak_amplitude_clamps_to_window() {
        let window = [0.2f32, -0.3, 0.25];
        assert_eq!(peak_amplitude(&window, 500), 0.3);
        assert_eq!(peak_amplitude(&window, 0), 0.0);
    }

    #[test]
    fn test_entry_from_window() {
        let window = [0.0f32, 0.4, -0.8, 0.1, 1.0];
        let entry = HistoryEntry::from_window(&window, 2);
        assert_eq!(entry.period, 2);
        assert_eq!(entry.amplitude, 0.8);
    }
}
