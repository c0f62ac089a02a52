//! Write-once storage for derived values
//!
//! A derived value is either not yet computed, computed with a value, or
//! computed and legitimately absent. `Derived` keeps those three states apart
//! so an absent result is never recomputed.

use std::cell::OnceCell;
use std::fmt;

/// Write-once cell holding `Option<T>`: unset, computed(value) or computed(absent)
#[derive(Clone)]
pub struct Derived<T> {
    cell: OnceCell<Option<T>>,
}

/// Observable state of a `Derived` cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedState<'a, T> {
    Unset,
    Computed(&'a T),
    Absent,
}

impl<T> Derived<T> {
    /// A cell that has not been computed yet
    pub fn unset() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// A cell already computed with `value`
    pub fn computed(value: T) -> Self {
        Self::from_option(Some(value))
    }

    /// A cell already computed as absent
    pub fn absent() -> Self {
        Self::from_option(None)
    }

    /// A cell already computed from an optional value
    pub fn from_option(value: Option<T>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(value);
        Self { cell }
    }

    /// Returns true once a value or an absence has been recorded
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn state(&self) -> DerivedState<'_, T> {
        match self.cell.get() {
            None => DerivedState::Unset,
            Some(Some(value)) => DerivedState::Computed(value),
            Some(None) => DerivedState::Absent,
        }
    }

    /// Returns the cached result, computing it with `init` on first access
    pub fn get_or_init(&self, init: impl FnOnce() -> Option<T>) -> Option<&T> {
        self.cell.get_or_init(init).as_ref()
    }

    /// Fallible variant of [`Derived::get_or_init`]
    ///
    /// An error leaves the cell unset; only successful results are frozen.
    pub fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<Option<T>, E>,
    ) -> Result<Option<&T>, E> {
        if let Some(cached) = self.cell.get() {
            return Ok(cached.as_ref());
        }
        let value = init()?;
        Ok(self.cell.get_or_init(|| value).as_ref())
    }
}

impl<T> Default for Derived<T> {
    fn default() -> Self {
        Self::unset()
    }
}

impl<T: fmt::Debug> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state() {
            DerivedState::Unset => write!(f, "Derived(unset)"),
            DerivedState::Computed(value) => write!(f, "Derived({:?})", value),
            DerivedState::Absent => write!(f, "Derived(absent)"),
        }
    }
}
