//! Pareto sets.
//!
//! A `ParetoSet` keeps only elements that no other element dominates. The
//! dominance function is given as "left is strictly better than right in at
//! least one criterion". An element `a` dominates `b` when `a` is better in
//! some criterion and `b` is better in none. Two elements that are equal in
//! every criterion dominate each other; the set keeps whichever arrived
//! first.
//!
//! The set also tracks a marker so callers can iterate over the elements
//! added since the last call to [`ParetoSet::mark_at_end`].

use std::fmt;

/// "Left is strictly better than right in at least one criterion."
pub trait ParetoComparator<T> {
    fn left_better(&self, left: &T, right: &T) -> bool;
}

impl<T, F> ParetoComparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn left_better(&self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

/// Receives Pareto-set events, for debugging.
pub trait ParetoSetEventListener<T> {
    /// `element` was added to the set.
    fn accepted(&self, _element: &T) {}

    /// `candidate` was rejected because `by` is at least as good.
    fn rejected(&self, _candidate: &T, _by: &T) {}

    /// `element` was removed because `by` dominates it.
    fn dropped(&self, _element: &T, _by: &T) {}
}

/// Listener that logs every event with `tracing` at debug level.
#[derive(Debug, Clone, Copy)]
pub struct TracingListener {
    name: &'static str,
}

impl TracingListener {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl<T: fmt::Debug> ParetoSetEventListener<T> for TracingListener {
    fn accepted(&self, element: &T) {
        tracing::debug!(set = self.name, ?element, "accepted");
    }

    fn rejected(&self, candidate: &T, by: &T) {
        tracing::debug!(set = self.name, ?candidate, ?by, "rejected");
    }

    fn dropped(&self, element: &T, by: &T) {
        tracing::debug!(set = self.name, ?element, ?by, "dropped");
    }
}

/// A set of mutually non-dominating elements.
///
/// # Examples
///
/// ```
/// use trip_planner::raptor::ParetoSet;
///
/// // (time, cost): lower is better in both
/// let mut set = ParetoSet::new(|l: &(i32, i32), r: &(i32, i32)| l.0 < r.0 || l.1 < r.1);
///
/// assert!(set.offer((10, 5)));
/// assert!(set.offer((8, 7)));     // faster but dearer: kept
/// assert!(!set.offer((10, 6)));   // dominated by (10, 5)
/// assert!(set.offer((7, 5)));     // dominates both
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![(7, 5)]);
/// ```
pub struct ParetoSet<T, C> {
    elements: Vec<T>,
    comparator: C,
    marker: usize,
    listener: Option<Box<dyn ParetoSetEventListener<T>>>,
}

impl<T, C: ParetoComparator<T>> ParetoSet<T, C> {
    pub fn new(comparator: C) -> Self {
        Self {
            elements: Vec::new(),
            comparator,
            marker: 0,
            listener: None,
        }
    }

    /// Attach a debug listener.
    pub fn with_listener(mut self, listener: impl ParetoSetEventListener<T> + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Offer a candidate. Returns `true` if it was added.
    ///
    /// Every element the candidate dominates is removed.
    pub fn offer(&mut self, candidate: T) -> bool {
        if let Some(by) = self.find_at_least_as_good(&candidate) {
            if let Some(listener) = &self.listener {
                listener.rejected(&candidate, &self.elements[by]);
            }
            return false;
        }
        self.remove_dominated_by(&candidate);
        if let Some(listener) = &self.listener {
            listener.accepted(&candidate);
        }
        self.elements.push(candidate);
        true
    }

    /// Apply `f` to every element, then drop the elements the change left
    /// dominated. Resets the marker.
    pub fn update(&mut self, mut f: impl FnMut(&mut T)) {
        let elements = std::mem::take(&mut self.elements);
        self.marker = 0;
        for mut element in elements {
            f(&mut element);
            if self.find_at_least_as_good(&element).is_none() {
                self.remove_dominated_by(&element);
                self.elements.push(element);
            }
        }
    }

    /// Would `candidate` be accepted? Does not modify the set.
    pub fn qualify(&self, candidate: &T) -> bool {
        self.find_at_least_as_good(candidate).is_none()
    }

    fn find_at_least_as_good(&self, candidate: &T) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| !self.comparator.left_better(candidate, e))
    }

    fn remove_dominated_by(&mut self, candidate: &T) {
        let mut kept = 0;
        let mut removed_before_marker = 0;
        for i in 0..self.elements.len() {
            if self.comparator.left_better(&self.elements[i], candidate) {
                self.elements.swap(kept, i);
                kept += 1;
            } else {
                if let Some(listener) = &self.listener {
                    listener.dropped(&self.elements[i], candidate);
                }
                if i < self.marker {
                    removed_before_marker += 1;
                }
            }
        }
        self.elements.truncate(kept);
        self.marker -= removed_before_marker;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Elements added since the last [`ParetoSet::mark_at_end`] that are
    /// still in the set.
    pub fn elements_after_marker(&self) -> &[T] {
        &self.elements[self.marker..]
    }

    /// Returns true if any element was added since the last mark.
    pub fn has_new_elements(&self) -> bool {
        self.marker < self.elements.len()
    }

    /// Move the marker past every current element.
    pub fn mark_at_end(&mut self) {
        self.marker = self.elements.len();
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.marker = 0;
    }
}

impl<T: fmt::Debug, C> fmt::Debug for ParetoSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParetoSet")
            .field("elements", &self.elements)
            .field("marker", &self.marker)
            .finish()
    }
}

impl<'a, T, C> IntoIterator for &'a ParetoSet<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
