use std::sync::{Arc, Mutex};

use anyhow::anyhow;

/// Collects errors raised by commands running inside a thread pool.
///
/// The pool does not hand command results back to the submitter, so each command records its
/// failure here and the submitter inspects the collector after joining the pool.
#[derive(Clone, Debug, Default)]
pub(crate) struct TaskErrors {
    errors: Arc<Mutex<Vec<anyhow::Error>>>,
}

impl TaskErrors {
    pub(crate) fn new() -> TaskErrors {
        TaskErrors {
            errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn record(&self, error: anyhow::Error) {
        match self.errors.lock() {
            Ok(mut errors) => errors.push(error),
            Err(poisoned) => poisoned.into_inner().push(error),
        }
    }

    /// Return the first recorded error, if any.
    pub(crate) fn into_result(self) -> Result<(), anyhow::Error> {
        let mut errors = self.errors.lock()
            .map_err(|_| anyhow!("Task error collector is poisoned"))?;
        if errors.len() > 1 {
            log::debug!("{} tasks failed, reporting the first failure", errors.len());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.remove(0))
        }
    }
}
