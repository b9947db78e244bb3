//! Run-length encoded storage of one value per character.
//!
//! [`RunArray`] keeps maximal runs of equal values together with the start
//! offset of every run. Looking up the value at a position is a binary search
//! over the run starts (O(log R) for R runs). Mutations splice the run vector
//! and then re-derive the starts of the runs after the edit point, so they
//! cost O(R) in the worst case; that is the scaling limit of the store.

use std::ops::Range;

/// One run: `len` consecutive elements sharing `value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Run<T> {
    pub len: usize,
    pub value: T,
}

impl<T> Run<T> {
    #[must_use]
    pub const fn new(len: usize, value: T) -> Self {
        Self { len, value }
    }
}

/// Sequence of values stored as runs.
///
/// Runs are never empty and adjacent runs never hold equal values, so two
/// arrays holding the same element sequence compare equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunArray<T> {
    runs: Vec<Run<T>>,
    /// `starts[i]` is the element offset where `runs[i]` begins.
    starts: Vec<usize>,
    len: usize,
}

impl<T> Default for RunArray<T> {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            starts: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Clone + PartialEq> RunArray<T> {
    /// Create an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an array of `count` copies of `value`.
    #[must_use]
    pub fn filled(value: T, count: usize) -> Self {
        let mut array = Self::new();
        array.push(value, count);
        array
    }

    /// Number of elements (not runs).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// All runs in order.
    #[must_use]
    pub fn runs(&self) -> &[Run<T>] {
        &self.runs
    }

    /// Element range covered by run `run_index`.
    #[must_use]
    pub fn run_range(&self, run_index: usize) -> Range<usize> {
        let start = self.starts[run_index];
        start..start + self.runs[run_index].len
    }

    /// First element of the array.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.runs.first().map(|run| &run.value)
    }

    /// Locate the run holding element `index`: `(run index, first element of that run)`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn find_run(&self, index: usize) -> (usize, usize) {
        assert!(
            index < self.len,
            "run index {index} out of bounds (len {})",
            self.len
        );
        let run = self.starts.partition_point(|&start| start <= index) - 1;
        (run, self.starts[run])
    }

    /// Value of element `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        let (run, _) = self.find_run(index);
        &self.runs[run].value
    }

    /// Iterate over every element, one item per position.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.runs
            .iter()
            .flat_map(|run| std::iter::repeat_n(&run.value, run.len))
    }

    /// Append `count` copies of `value`.
    pub fn push(&mut self, value: T, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if last.value == value {
                last.len += count;
                self.len += count;
                return;
            }
        }
        self.starts.push(self.len);
        self.runs.push(Run::new(count, value));
        self.len += count;
    }

    /// Append all elements of another array.
    pub fn append(&mut self, other: &Self) {
        for run in &other.runs {
            self.push(run.value.clone(), run.len);
        }
    }

    /// Copy of the elements in `range`.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        self.check_range(&range);
        let mut out = Self::new();
        if range.is_empty() {
            return out;
        }
        let (mut run, mut start) = self.find_run(range.start);
        while start < range.end {
            let r = &self.runs[run];
            let lo = start.max(range.start);
            let hi = (start + r.len).min(range.end);
            out.push(r.value.clone(), hi - lo);
            start += r.len;
            run += 1;
        }
        out
    }

    /// Insert `count` copies of `value` before element `at`.
    pub fn insert(&mut self, at: usize, value: T, count: usize) {
        if count > 0 {
            self.splice(at..at, vec![Run::new(count, value)]);
        }
    }

    /// Insert a whole array before element `at`.
    pub fn insert_array(&mut self, at: usize, other: &Self) {
        if !other.is_empty() {
            self.splice(at..at, other.runs.clone());
        }
    }

    /// Remove the elements in `range`.
    pub fn remove_range(&mut self, range: Range<usize>) {
        if !range.is_empty() {
            self.splice(range, Vec::new());
        }
    }

    /// Replace the elements in `range` with the contents of `other`.
    pub fn replace_range(&mut self, range: Range<usize>, other: &Self) {
        self.splice(range, other.runs.clone());
    }

    /// Set every element in `range` to `value`.
    pub fn set_range(&mut self, range: Range<usize>, value: T) {
        let len = range.len();
        if len > 0 {
            self.splice(range, vec![Run::new(len, value)]);
        }
    }

    /// Rewrite every element in `range` through `f`; returns whether anything changed.
    pub fn map_range(&mut self, range: Range<usize>, mut f: impl FnMut(&T) -> T) -> bool {
        let current = self.slice(range.clone());
        let mut changed = false;
        let mapped: Vec<Run<T>> = current
            .runs
            .iter()
            .map(|run| {
                let value = f(&run.value);
                changed |= value != run.value;
                Run::new(run.len, value)
            })
            .collect();
        if changed {
            self.splice(range, mapped);
        }
        changed
    }

    /// Whether every run length is positive and the lengths add up.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut total = 0;
        for (i, run) in self.runs.iter().enumerate() {
            if run.len == 0 || self.starts[i] != total {
                return false;
            }
            if i > 0 && self.runs[i - 1].value == run.value {
                return false;
            }
            total += run.len;
        }
        total == self.len && self.starts.len() == self.runs.len()
    }

    fn check_range(&self, range: &Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "run range {range:?} out of bounds (len {})",
            self.len
        );
    }

    /// Make sure a run starts at `index` and return that run's index.
    fn split_at(&mut self, index: usize) -> usize {
        if index == self.len {
            return self.runs.len();
        }
        let (run, start) = self.find_run(index);
        if start == index {
            return run;
        }
        let head = index - start;
        let tail = Run::new(self.runs[run].len - head, self.runs[run].value.clone());
        self.runs[run].len = head;
        self.runs.insert(run + 1, tail);
        self.starts.insert(run + 1, index);
        run + 1
    }

    fn splice(&mut self, range: Range<usize>, replacement: Vec<Run<T>>) {
        self.check_range(&range);
        let lo = self.split_at(range.start);
        let hi = self.split_at(range.end);

        let added: usize = replacement.iter().map(|run| run.len).sum();
        let replacement: Vec<Run<T>> = replacement.into_iter().filter(|run| run.len > 0).collect();
        let inserted = replacement.len();

        self.runs.splice(lo..hi, replacement);
        self.len = self.len - range.len() + added;
        self.normalize(lo.saturating_sub(1), lo + inserted);
    }

    /// Merge equal neighbors among runs `from..=to`, then rebuild the starts.
    fn normalize(&mut self, from: usize, to: usize) {
        let mut i = from;
        let mut to = to;
        while i < to && i + 1 < self.runs.len() {
            if self.runs[i].value == self.runs[i + 1].value {
                let next = self.runs.remove(i + 1);
                self.runs[i].len += next.len;
                to -= 1;
            } else {
                i += 1;
            }
        }

        self.starts.truncate(from);
        let mut start = match from {
            0 => 0,
            _ => self.starts[from - 1] + self.runs[from - 1].len,
        };
        for run in &self.runs[from..] {
            self.starts.push(start);
            start += run.len;
        }
        debug_assert_eq!(start, self.len);
    }
}

impl<T: Clone + PartialEq> FromIterator<T> for RunArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        for value in iter {
            array.push(value, 1);
        }
        array
    }
}
