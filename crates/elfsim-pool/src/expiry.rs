//! Timed despawn queue.
//!
//! Entries count down by the tick delta and are released once their
//! lifetime has run out. Used for death despawn delays and for effect
//! instances that return to the pool on their own.

/// Queue of items waiting for their lifetime to elapse.
#[derive(Debug, Clone)]
pub struct ExpiryQueue<T> {
    entries: Vec<(f32, T)>,
}

impl<T> Default for ExpiryQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ExpiryQueue<T> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Schedule `item` to expire after `lifetime` seconds. Negative or
    /// non-finite lifetimes expire on the next tick.
    pub fn schedule(&mut self, item: T, lifetime: f32) {
        let lifetime = if lifetime.is_finite() { lifetime.max(0.0) } else { 0.0 };
        self.entries.push((lifetime, item));
    }

    /// Count down by `delta` and return every item whose lifetime ran out,
    /// in scheduling order.
    pub fn tick(&mut self, delta: f32) -> Vec<T> {
        let delta = delta.max(0.0);
        let mut expired = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for (remaining, item) in self.entries.drain(..) {
            let left = remaining - delta;
            if left <= 0.0 {
                expired.push(item);
            } else {
                pending.push((left, item));
            }
        }
        self.entries = pending;
        expired
    }

    /// Drop every entry matching `predicate`. Returns how many were removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, item)| !predicate(item));
        before.saturating_sub(self.entries.len())
    }

    /// Remove and return every entry regardless of lifetime.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.entries.drain(..).map(|(_, item)| item).collect()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
