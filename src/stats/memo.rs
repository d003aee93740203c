//! # Content-keyed memo
//!
//! $$
//! f(x)=f(y)\quad\text{whenever}\quad x=y\ \text{elementwise}
//! $$
//!
//! Process-wide memoization of pure functions of a `&[f64]`. Entries are keyed by the
//! content of the slice, never by its address, so they never need invalidation.
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use ordered_float::OrderedFloat;

type ContentKey = Vec<OrderedFloat<f64>>;

/// Memo table for a pure function `&[f64] -> V`.
pub struct ContentMemo<V> {
  slots: OnceLock<Mutex<HashMap<ContentKey, Arc<V>>>>,
}

impl<V> ContentMemo<V> {
  pub const fn new() -> Self {
    Self {
      slots: OnceLock::new(),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<ContentKey, Arc<V>>> {
    self
      .slots
      .get_or_init(|| Mutex::new(HashMap::new()))
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Return the memoized value for `data`, computing it on first use.
  ///
  /// `compute` runs outside the lock; if two threads race on the same key the first
  /// insert wins and both observe the same `Arc`.
  pub fn get_or_compute<F>(&self, data: &[f64], compute: F) -> Arc<V>
  where
    F: FnOnce(&[f64]) -> V,
  {
    let key: ContentKey = data.iter().copied().map(OrderedFloat).collect();
    if let Some(hit) = self.lock().get(&key) {
      return Arc::clone(hit);
    }

    let value = Arc::new(compute(data));
    Arc::clone(self.lock().entry(key).or_insert(value))
  }

  /// Number of distinct inputs seen so far.
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<V> Default for ContentMemo<V> {
  fn default() -> Self {
    Self::new()
  }
}
