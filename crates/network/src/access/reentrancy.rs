use amm_network_domain::error::{NetworkError, NetworkResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Blocks nested entry into the router's entry points.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    entered: Arc<AtomicBool>,
}

/// Held for the duration of an entry point; releases the guard on drop.
#[derive(Debug)]
pub struct ReentrancyLock {
    entered: Arc<AtomicBool>,
}

impl ReentrancyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> NetworkResult<ReentrancyLock> {
        if self
            .entered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(NetworkError::Reentrancy);
        }
        Ok(ReentrancyLock {
            entered: Arc::clone(&self.entered),
        })
    }

    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }
}

impl Drop for ReentrancyLock {
    fn drop(&mut self) {
        self.entered.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_entry_is_rejected() {
        let guard = ReentrancyGuard::new();
        let lock = guard.enter().unwrap();
        assert!(guard.is_entered());
        assert_eq!(guard.enter().unwrap_err(), NetworkError::Reentrancy);
        drop(lock);
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }
}
