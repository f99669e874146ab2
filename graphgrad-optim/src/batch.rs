// graphgrad-optim/src/batch.rs

use crate::Optimizer;
use graphgrad_core::{GraphGradError, Parameter, ParameterId, TensorOps, Value};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
struct PendingGradient {
    parameter: Parameter,
    sum: Value,
    count: usize,
}

/// Collects gradients from many workers and applies them in one pass.
///
/// `update` only sums the gradient into a per-parameter buffer, so it is
/// cheap and safe to call from any number of threads. `apply_batch` then
/// hands the mean gradient of each parameter to the wrapped optimizer on the
/// calling thread, in parameter creation order, which makes a training step
/// independent of thread scheduling.
#[derive(Debug)]
pub struct BatchOptimizer<O> {
    base: O,
    pending: Mutex<HashMap<ParameterId, PendingGradient>>,
}

impl<O: Optimizer> BatchOptimizer<O> {
    pub fn new(base: O) -> Self {
        BatchOptimizer {
            base,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn base(&self) -> &O {
        &self.base
    }

    /// Number of parameters with a pending gradient.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Applies the mean of every pending gradient and clears the batch.
    pub fn apply_batch(&self) -> Result<(), GraphGradError> {
        let batch = {
            let mut pending = self.pending.lock().map_err(|err| GraphGradError::LockError {
                reason: err.to_string(),
            })?;
            std::mem::take(&mut *pending)
        };
        let mut entries: Vec<_> = batch.into_values().collect();
        entries.sort_by_key(|entry| entry.parameter.id());
        debug!("Applying batched gradients for {} parameters", entries.len());

        for entry in entries {
            let mean = entry.sum.scale(1.0 / entry.count as f64)?;
            self.base.update(&entry.parameter, &mean)?;
        }
        Ok(())
    }
}

impl<O: Optimizer> Optimizer for BatchOptimizer<O> {
    fn update(&self, parameter: &Parameter, gradient: &Value) -> Result<(), GraphGradError> {
        parameter.assert_matching(gradient, "batch update")?;
        let mut pending = self.pending.lock().map_err(|err| GraphGradError::LockError {
            reason: err.to_string(),
        })?;
        match pending.get_mut(&parameter.id()) {
            Some(entry) => {
                entry.sum.add_(gradient)?;
                entry.count += 1;
            }
            None => {
                pending.insert(
                    parameter.id(),
                    PendingGradient {
                        parameter: parameter.clone(),
                        sum: gradient.copy()?,
                        count: 1,
                    },
                );
            }
        }
        Ok(())
    }

    fn reset(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.base.reset();
    }
}
