use crate::error::GraphGradError;
use crate::tensor::storage::Positions;
use rand::Rng;
use rand_distr::Distribution;

/// Numeric contract shared by tensors, matrices and graph values.
///
/// Implementors provide the primitive accessors (`get`, `put`), a traversal
/// primitive (`positions`) and a same-kind zero constructor (`zero_copy`).
/// Every other operation is a provided method written purely in terms of
/// those primitives, so dense, sparse and view-backed storages share one
/// arithmetic implementation.
///
/// Pure variants return a new value of the same storage kind. In-place
/// variants carry a trailing underscore, mutate the receiver through its
/// interior mutability and return it for chaining.
pub trait TensorOps: Sized {
    /// Number of addressable positions.
    fn size(&self) -> usize;

    /// Reads the value at `pos`.
    ///
    /// # Errors
    /// `IndexOutOfBounds` if `pos` is outside `[0, size)`.
    fn get(&self, pos: usize) -> Result<f64, GraphGradError>;

    /// Writes `value` at `pos`.
    ///
    /// # Errors
    /// `IndexOutOfBounds` if `pos` is outside `[0, size)`, `NanValue` if
    /// `value` is NaN, `UnsupportedOperation` for read-only views.
    fn put(&self, pos: usize, value: f64) -> Result<&Self, GraphGradError>;

    /// Positions that may hold non-zero values (see [`Positions`]).
    fn positions(&self) -> Result<Positions, GraphGradError>;

    /// A new zero-filled value with the same shape and storage kind.
    fn zero_copy(&self) -> Self;

    /// Human readable description of kind and shape, used in error messages.
    fn describe(&self) -> String;

    /// Whether binary operations between `self` and `other` are allowed.
    fn is_matching(&self, other: &Self) -> bool {
        self.size() == other.size()
    }

    fn assert_matching(&self, other: &Self, operation: &str) -> Result<(), GraphGradError> {
        if self.is_matching(other) {
            Ok(())
        } else {
            Err(GraphGradError::mismatch(
                self.describe(),
                other.describe(),
                operation,
            ))
        }
    }

    /// Fails on the first visited NaN or infinite element.
    ///
    /// This check is opt-in; mutations do not enforce it.
    fn assert_finite(&self) -> Result<(), GraphGradError> {
        for pos in self.positions()? {
            let value = self.get(pos)?;
            if !value.is_finite() {
                return Err(GraphGradError::NonFinite { pos, value });
            }
        }
        Ok(())
    }

    fn put_add(&self, pos: usize, value: f64) -> Result<&Self, GraphGradError> {
        self.put(pos, self.get(pos)? + value)
    }

    /// Deep copy: a zero copy refilled from the traversal.
    fn copy(&self) -> Result<Self, GraphGradError> {
        let res = self.zero_copy();
        for pos in self.positions()? {
            res.put(pos, self.get(pos)?)?;
        }
        Ok(res)
    }

    fn add(&self, other: &Self) -> Result<Self, GraphGradError> {
        self.assert_matching(other, "add")?;
        let res = self.copy()?;
        for pos in other.positions()? {
            res.put(pos, res.get(pos)? + other.get(pos)?)?;
        }
        Ok(res)
    }

    fn add_(&self, other: &Self) -> Result<&Self, GraphGradError> {
        self.assert_matching(other, "add_")?;
        for pos in other.positions()? {
            self.put(pos, self.get(pos)? + other.get(pos)?)?;
        }
        Ok(self)
    }

    /// Adds `value` to every position, zeros included.
    fn add_scalar(&self, value: f64) -> Result<Self, GraphGradError> {
        let res = self.copy()?;
        res.add_scalar_(value)?;
        Ok(res)
    }

    fn add_scalar_(&self, value: f64) -> Result<&Self, GraphGradError> {
        for pos in 0..self.size() {
            self.put(pos, self.get(pos)? + value)?;
        }
        Ok(self)
    }

    fn sub(&self, other: &Self) -> Result<Self, GraphGradError> {
        self.assert_matching(other, "sub")?;
        let res = self.copy()?;
        for pos in other.positions()? {
            res.put(pos, res.get(pos)? - other.get(pos)?)?;
        }
        Ok(res)
    }

    fn sub_(&self, other: &Self) -> Result<&Self, GraphGradError> {
        self.assert_matching(other, "sub_")?;
        for pos in other.positions()? {
            self.put(pos, self.get(pos)? - other.get(pos)?)?;
        }
        Ok(self)
    }

    /// Elementwise product.
    fn mul(&self, other: &Self) -> Result<Self, GraphGradError> {
        self.assert_matching(other, "mul")?;
        let res = self.zero_copy();
        for pos in self.positions()? {
            res.put(pos, self.get(pos)? * other.get(pos)?)?;
        }
        Ok(res)
    }

    fn mul_(&self, other: &Self) -> Result<&Self, GraphGradError> {
        self.assert_matching(other, "mul_")?;
        for pos in self.positions()? {
            self.put(pos, self.get(pos)? * other.get(pos)?)?;
        }
        Ok(self)
    }

    /// Multiplies every element with a scalar.
    fn scale(&self, value: f64) -> Result<Self, GraphGradError> {
        let res = self.zero_copy();
        for pos in self.positions()? {
            res.put(pos, self.get(pos)? * value)?;
        }
        Ok(res)
    }

    fn scale_(&self, value: f64) -> Result<&Self, GraphGradError> {
        for pos in self.positions()? {
            self.put(pos, self.get(pos)? * value)?;
        }
        Ok(self)
    }

    /// Square root of the absolute value of each element.
    fn sqrt_abs(&self) -> Result<Self, GraphGradError> {
        let res = self.zero_copy();
        for pos in self.positions()? {
            res.put(pos, self.get(pos)?.abs().sqrt())?;
        }
        Ok(res)
    }

    fn sqrt_abs_(&self) -> Result<&Self, GraphGradError> {
        for pos in self.positions()? {
            self.put(pos, self.get(pos)?.abs().sqrt())?;
        }
        Ok(self)
    }

    /// Inverts each non-zero element; zeros stay zero.
    fn inverse(&self) -> Result<Self, GraphGradError> {
        let res = self.zero_copy();
        for pos in self.positions()? {
            let value = self.get(pos)?;
            if value != 0.0 {
                res.put(pos, 1.0 / value)?;
            }
        }
        Ok(res)
    }

    fn inverse_(&self) -> Result<&Self, GraphGradError> {
        for pos in self.positions()? {
            let value = self.get(pos)?;
            if value != 0.0 {
                self.put(pos, 1.0 / value)?;
            }
        }
        Ok(self)
    }

    fn dot(&self, other: &Self) -> Result<f64, GraphGradError> {
        self.assert_matching(other, "dot")?;
        let mut res = 0.0;
        for pos in self.positions()? {
            res += self.get(pos)? * other.get(pos)?;
        }
        Ok(res)
    }

    /// Triple product `sum_i self[i] * first[i] * second[i]`.
    fn triple_dot(&self, first: &Self, second: &Self) -> Result<f64, GraphGradError> {
        self.assert_matching(first, "triple_dot")?;
        self.assert_matching(second, "triple_dot")?;
        let mut res = 0.0;
        for pos in self.positions()? {
            res += self.get(pos)? * first.get(pos)? * second.get(pos)?;
        }
        Ok(res)
    }

    /// L2 norm.
    fn norm(&self) -> Result<f64, GraphGradError> {
        let mut res = 0.0;
        for pos in self.positions()? {
            let value = self.get(pos)?;
            res += value * value;
        }
        Ok(res.sqrt())
    }

    fn sum(&self) -> Result<f64, GraphGradError> {
        let mut res = 0.0;
        for pos in self.positions()? {
            res += self.get(pos)?;
        }
        Ok(res)
    }

    /// Largest visited element, `-inf` when nothing is visited.
    fn max(&self) -> Result<f64, GraphGradError> {
        let mut res = f64::NEG_INFINITY;
        for pos in self.positions()? {
            res = res.max(self.get(pos)?);
        }
        Ok(res)
    }

    /// Smallest visited element, `+inf` when nothing is visited.
    fn min(&self) -> Result<f64, GraphGradError> {
        let mut res = f64::INFINITY;
        for pos in self.positions()? {
            res = res.min(self.get(pos)?);
        }
        Ok(res)
    }

    /// L2-normalized copy; an equivalent copy when the norm is zero.
    fn normalized(&self) -> Result<Self, GraphGradError> {
        let res = self.copy()?;
        res.normalize_()?;
        Ok(res)
    }

    fn normalize_(&self) -> Result<&Self, GraphGradError> {
        let norm = self.norm()?;
        if norm != 0.0 {
            for pos in self.positions()? {
                self.put(pos, self.get(pos)? / norm)?;
            }
        }
        Ok(self)
    }

    /// Copy divided by its sum; an equivalent copy when the sum is zero.
    fn to_probability(&self) -> Result<Self, GraphGradError> {
        let res = self.copy()?;
        res.to_probability_()?;
        Ok(res)
    }

    fn to_probability_(&self) -> Result<&Self, GraphGradError> {
        let sum = self.sum()?;
        if sum != 0.0 {
            for pos in self.positions()? {
                self.put(pos, self.get(pos)? / sum)?;
            }
        }
        Ok(self)
    }

    fn set_to_ones(&self) -> Result<&Self, GraphGradError> {
        self.fill_(1.0)
    }

    fn set_to_zero(&self) -> Result<&Self, GraphGradError> {
        self.fill_(0.0)
    }

    /// Sets every element to `1/size`.
    fn set_to_uniform(&self) -> Result<&Self, GraphGradError> {
        let size = self.size();
        if size == 0 {
            return Ok(self);
        }
        self.fill_(1.0 / size as f64)
    }

    fn fill_(&self, value: f64) -> Result<&Self, GraphGradError> {
        for pos in 0..self.size() {
            self.put(pos, value)?;
        }
        Ok(self)
    }

    /// Samples every element uniformly from `[0, 1)` with the thread rng.
    fn set_to_random(&self) -> Result<&Self, GraphGradError> {
        let mut rng = rand::thread_rng();
        for pos in 0..self.size() {
            self.put(pos, rng.gen::<f64>())?;
        }
        Ok(self)
    }

    /// Samples every element from `distribution`.
    fn set_to_random_with<R, D>(&self, rng: &mut R, distribution: &D) -> Result<&Self, GraphGradError>
    where
        R: Rng + ?Sized,
        D: Distribution<f64>,
    {
        for pos in 0..self.size() {
            self.put(pos, distribution.sample(rng))?;
        }
        Ok(self)
    }

    /// Applies `f` to every position, zeros included.
    fn map<F>(&self, f: F) -> Result<Self, GraphGradError>
    where
        F: Fn(f64) -> f64,
    {
        let res = self.zero_copy();
        for pos in 0..self.size() {
            res.put(pos, f(self.get(pos)?))?;
        }
        Ok(res)
    }

    /// Number of positions the traversal visits.
    fn num_non_zero_elements(&self) -> Result<usize, GraphGradError> {
        Ok(self.positions()?.count())
    }

    fn to_vec(&self) -> Result<Vec<f64>, GraphGradError> {
        (0..self.size()).map(|pos| self.get(pos)).collect()
    }

    /// Value of a single-element tensor.
    fn to_double(&self) -> Result<f64, GraphGradError> {
        if self.size() != 1 {
            return Err(GraphGradError::mismatch(
                self.describe(),
                "a single element".to_string(),
                "to_double",
            ));
        }
        self.get(0)
    }
}
