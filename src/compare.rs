//! Comparison plumbing shared by every tree variant.
//!
//! All ordering decisions in this crate go through a [`Comparer`]: a wrapper
//! around a strict-weak-order predicate (`true` iff the first key orders
//! strictly before the second) that counts how many times it was consulted.
//! The trees never call `Ord` directly, so the counter is a faithful measure
//! of the work an operation did.
//!
//! # Examples
//!
//! ```
//! use ordtree::compare::Comparer;
//!
//! let cmp = Comparer::new();
//! assert!(cmp.compare(&1, &2));
//! assert!(!cmp.compare(&2, &1));
//! assert_eq!(cmp.comparisons(), 2);
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Wraps a strict-weak-order predicate over `K` and counts every invocation.
///
/// The counter uses interior mutability so read-only tree operations (which
/// still compare keys) can take `&self`. A comparer built with [`Comparer::new`]
/// uses the natural `<` ordering; [`Comparer::with`] injects any other strict
/// weak order.
pub struct Comparer<K> {
    cmp: Rc<dyn Fn(&K, &K) -> bool>,
    comparisons: Cell<u64>,
    tracer: Option<Rc<dyn Fn(&K, &K)>>,
}

impl<K: Ord + 'static> Default for Comparer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for Comparer<K> {
    fn clone(&self) -> Self {
        Self {
            cmp: Rc::clone(&self.cmp),
            comparisons: self.comparisons.clone(),
            tracer: self.tracer.as_ref().map(Rc::clone),
        }
    }
}

impl<K> Comparer<K> {
    /// Builds a comparer using the natural `<` ordering of `K`.
    pub fn new() -> Self
    where
        K: Ord + 'static,
    {
        Self::with(|a: &K, b: &K| a < b)
    }

    /// Builds a comparer from an injected predicate. The predicate must be a
    /// strict weak order: `f(a, b)` is `true` iff `a` orders strictly before
    /// `b`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::compare::Comparer;
    ///
    /// // Reverse the natural order.
    /// let cmp = Comparer::with(|a: &i32, b: &i32| b < a);
    /// assert!(cmp.compare(&2, &1));
    /// ```
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&K, &K) -> bool + 'static,
    {
        Self {
            cmp: Rc::new(f),
            comparisons: Cell::new(0),
            tracer: None,
        }
    }

    /// Returns `true` iff `a` orders strictly before `b`, bumping the
    /// comparison counter (and the trace, in verbose mode) on the way.
    pub fn compare(&self, a: &K, b: &K) -> bool {
        if let Some(tracer) = &self.tracer {
            tracer(a, b);
        }
        self.comparisons.set(self.comparisons.get() + 1);
        (self.cmp)(a, b)
    }

    /// How many comparisons this comparer has performed since construction
    /// (or the last [`reset`][Comparer::reset]).
    pub fn comparisons(&self) -> u64 {
        self.comparisons.get()
    }

    /// Zeroes the comparison counter.
    pub fn reset(&self) {
        self.comparisons.set(0);
    }

    /// Enables or disables a trace line per comparison, emitted at `trace`
    /// level through the `log` facade.
    pub fn set_verbose(&mut self, verbose: bool)
    where
        K: fmt::Debug + 'static,
    {
        self.tracer = if verbose {
            Some(Rc::new(|a: &K, b: &K| {
                log::trace!("Comparing {:?} and {:?}", a, b)
            }))
        } else {
            None
        };
    }

    /// A comparer sharing this one's predicate but counting into a fresh
    /// counter. Validators compare keys through a fork so that checking a
    /// tree never perturbs its statistics.
    pub fn fork(&self) -> Self {
        Self {
            cmp: Rc::clone(&self.cmp),
            comparisons: Cell::new(0),
            tracer: None,
        }
    }
}
