/// A derived value that is only recomputed after its inputs changed
///
/// Owners call [`Cached::invalidate`] from every setter that touches an input,
/// then read through [`Cached::get_or_update`] with the rebuild closure.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: T,
    dirty: bool,
}

impl<T> Cached<T> {
    /// Starts dirty so the first read always rebuilds
    pub fn new(value: T) -> Self {
        Self { value, dirty: true }
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuilds the value with `update` if dirty, then returns it
    pub fn get_or_update(&mut self, update: impl FnOnce() -> T) -> &T {
        if self.dirty {
            self.value = update();
            self.dirty = false;
        }
        &self.value
    }
}

impl<T: Default> Default for Cached<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
