//! Scoped suppression of the local change path.
//!
//! While a [`SuppressionGuard`] is alive, content notifications are known to be caused by the
//! adapter itself and must not be turned into outgoing operations. Dropping the guard releases
//! the suppression on every exit path, including early returns and unwinding.

use std::cell::Cell;
use std::rc::Rc;

/// Shared suppression state. Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct Suppression {
    depth: Rc<Cell<usize>>,
}

impl Suppression {
    /// Create an inactive suppression state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress until the returned guard is dropped. Guards may nest.
    #[must_use = "suppression ends as soon as the guard is dropped"]
    pub fn acquire(&self) -> SuppressionGuard {
        self.depth.set(self.depth.get() + 1);
        SuppressionGuard {
            depth: Rc::clone(&self.depth),
        }
    }

    /// Returns `true` while at least one guard is alive.
    pub fn is_active(&self) -> bool {
        self.depth.get() > 0
    }
}

/// RAII token returned by [`Suppression::acquire`].
#[derive(Debug)]
pub struct SuppressionGuard {
    depth: Rc<Cell<usize>>,
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_scopes_suppression() {
        let suppression = Suppression::new();
        assert!(!suppression.is_active());
        {
            let _outer = suppression.acquire();
            assert!(suppression.is_active());
            {
                let _inner = suppression.clone().acquire();
                assert!(suppression.is_active());
            }
            assert!(suppression.is_active());
        }
        assert!(!suppression.is_active());
    }

    #[test]
    fn test_released_on_early_return() {
        fn fails(suppression: &Suppression) -> Result<(), ()> {
            let _guard = suppression.acquire();
            Err(())
        }

        let suppression = Suppression::new();
        assert!(fails(&suppression).is_err());
        assert!(!suppression.is_active());
    }

    #[test]
    fn test_released_on_panic() {
        let suppression = Suppression::new();
        let cloned = suppression.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = cloned.acquire();
            panic!("edit failed");
        }));
        assert!(result.is_err());
        assert!(!suppression.is_active());
    }
}
