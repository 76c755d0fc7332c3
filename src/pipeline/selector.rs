//! Choice among equivalent options (reply headers, outbound numbers).

use rand::Rng;

/// Picks an index in `0..len`. `len` is always at least 1.
pub trait Selector: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl Selector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same index, clamped to the last option. For tests and
/// deterministic deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedSelector(pub usize);

impl Selector for FixedSelector {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

/// Pick one item from a non-empty slice.
pub fn choose<'a, T>(selector: &dyn Selector, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(selector.pick(items.len()))
}
