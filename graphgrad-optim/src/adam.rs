// graphgrad-optim/src/adam.rs

use crate::Optimizer;
use graphgrad_core::{GraphGradError, Parameter, ParameterId, TensorOps, Value};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Which accumulator the bias-corrected denominator estimate is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondMomentEstimate {
    /// `vHat = v / (1 - b2^t)`, the standard Adam rule.
    #[default]
    SecondMoment,
    /// `vHat = m / (1 - b2^t)`. Reproduces the behaviour of models trained
    /// with that variant; only useful for parity with them.
    FirstMoment,
}

/// Hyperparameters of [`Adam`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    /// NDAdam: project gradients orthogonally to the parameter and keep the
    /// parameter at unit norm.
    pub nd_mode: bool,
    pub second_moment: SecondMomentEstimate,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            nd_mode: true,
            second_moment: SecondMomentEstimate::SecondMoment,
        }
    }
}

impl AdamConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_nd_mode(mut self, nd_mode: bool) -> Self {
        self.nd_mode = nd_mode;
        self
    }

    pub fn with_second_moment(mut self, second_moment: SecondMomentEstimate) -> Self {
        self.second_moment = second_moment;
        self
    }

    /// Checks every hyperparameter against its valid range.
    pub fn validate(&self) -> Result<(), GraphGradError> {
        check_learning_rate(self.learning_rate)?;
        if !(0.0..1.0).contains(&self.beta1) {
            return Err(GraphGradError::ConfigurationError(format!(
                "Beta1 must be in [0, 1), got {}",
                self.beta1
            )));
        }
        if !(0.0..1.0).contains(&self.beta2) {
            return Err(GraphGradError::ConfigurationError(format!(
                "Beta2 must be in [0, 1), got {}",
                self.beta2
            )));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(GraphGradError::ConfigurationError(format!(
                "Epsilon must be in (0, 1), got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_learning_rate(learning_rate: f64) -> Result<(), GraphGradError> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(GraphGradError::ConfigurationError(format!(
            "Learning rate must be finite and positive, got {}",
            learning_rate
        )));
    }
    Ok(())
}

/// Moment estimates of one parameter.
#[derive(Debug, Clone)]
struct MomentState {
    m: Value,
    v: Value,
    /// `beta1^t`, the step count kept as an accumulated power.
    b1t: f64,
    b2t: f64,
}

impl MomentState {
    fn zeros_like(value: &Value) -> Self {
        MomentState {
            m: value.zero_copy(),
            v: value.zero_copy(),
            b1t: 1.0,
            b2t: 1.0,
        }
    }
}

/// Adam optimizer, with the NDAdam variant enabled by default.
///
/// State is keyed by [`ParameterId`]. The table lock is only held to find or
/// create a parameter's slot; the update itself runs under that slot's own
/// mutex, so one parameter is never updated by two threads at once while
/// different parameters update in parallel.
#[derive(Debug)]
pub struct Adam {
    config: AdamConfig,
    state: RwLock<HashMap<ParameterId, Arc<Mutex<MomentState>>>>,
}

impl Default for Adam {
    fn default() -> Self {
        Adam {
            config: AdamConfig::default(),
            state: RwLock::new(HashMap::new()),
        }
    }
}

fn lock_error<T>(err: PoisonError<T>) -> GraphGradError {
    GraphGradError::LockError {
        reason: err.to_string(),
    }
}

impl Adam {
    /// # Errors
    ///
    /// `ConfigurationError` if a hyperparameter is out of range.
    pub fn new(config: AdamConfig) -> Result<Self, GraphGradError> {
        config.validate()?;
        debug!("Creating Adam optimizer with {:?}", config);
        Ok(Adam {
            config,
            state: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// Number of parameters with moment state.
    pub fn state_len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copies of the `(m, v)` moments tracked for `id`.
    pub fn moments(&self, id: ParameterId) -> Result<Option<(Value, Value)>, GraphGradError> {
        match self.existing_slot(id)? {
            Some(slot) => {
                let state = slot.lock().map_err(lock_error)?;
                Ok(Some((state.m.copy()?, state.v.copy()?)))
            }
            None => Ok(None),
        }
    }

    /// Accumulated `(beta1^t, beta2^t)` for `id`.
    pub fn bias_powers(&self, id: ParameterId) -> Result<Option<(f64, f64)>, GraphGradError> {
        match self.existing_slot(id)? {
            Some(slot) => {
                let state = slot.lock().map_err(lock_error)?;
                Ok(Some((state.b1t, state.b2t)))
            }
            None => Ok(None),
        }
    }

    fn existing_slot(
        &self,
        id: ParameterId,
    ) -> Result<Option<Arc<Mutex<MomentState>>>, GraphGradError> {
        Ok(self.state.read().map_err(lock_error)?.get(&id).cloned())
    }

    fn slot(&self, parameter: &Parameter) -> Result<Arc<Mutex<MomentState>>, GraphGradError> {
        if let Some(slot) = self.existing_slot(parameter.id())? {
            return Ok(slot);
        }
        let mut table = self.state.write().map_err(lock_error)?;
        let slot = table.entry(parameter.id()).or_insert_with(|| {
            debug!("Creating Adam moment state for parameter {}", parameter.id());
            Arc::new(Mutex::new(MomentState::zeros_like(parameter.value())))
        });
        Ok(Arc::clone(slot))
    }
}

impl Optimizer for Adam {
    fn update(&self, parameter: &Parameter, gradient: &Value) -> Result<(), GraphGradError> {
        let value = parameter.value();
        value.assert_matching(gradient, "adam update")?;
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            nd_mode,
            second_moment,
        } = self.config;

        let slot = self.slot(parameter)?;
        let mut state = slot.lock().map_err(lock_error)?;

        let gradient = if nd_mode {
            gradient.sub(&value.scale(gradient.dot(value)?)?)?
        } else {
            gradient.copy()?
        };

        state.b1t *= beta1;
        state.b2t *= beta2;
        state.m.scale_(beta1)?.add_(&gradient.scale(1.0 - beta1)?)?;
        state.v.scale_(beta2)?.add_(&gradient.mul(&gradient)?.scale(1.0 - beta2)?)?;

        let m_hat = state.m.scale(1.0 / (1.0 - state.b1t))?;
        let v_source = match second_moment {
            SecondMomentEstimate::SecondMoment => &state.v,
            SecondMomentEstimate::FirstMoment => &state.m,
        };
        let v_hat = v_source.scale(1.0 / (1.0 - state.b2t))?;

        let denominator = v_hat.sqrt_abs()?.add_scalar(epsilon)?.inverse()?;
        value.add_(&m_hat.scale(-learning_rate)?.mul(&denominator)?)?;
        if nd_mode {
            value.normalize_()?;
        }
        Ok(())
    }

    fn reset(&self) {
        let mut table = self.state.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Resetting Adam state for {} parameters", table.len());
        table.clear();
    }
}

#[cfg(test)]
#[path = "adam_test.rs"]
mod tests;
