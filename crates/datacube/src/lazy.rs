//! Deferred arrays.
//!
//! A [`LazyArray`] knows its shape up front and produces its values only when
//! [`LazyArray::compute`] is called. Readers hand these out for every
//! variable so that opening a product never decodes pixel data.

use std::fmt;
use std::sync::Arc;

use ndarray::ArrayD;

use crate::error::{CubeError, CubeResult};

type Loader = dyn Fn() -> anyhow::Result<ArrayD<f32>> + Send + Sync;

/// An array whose values are produced on demand.
#[derive(Clone)]
pub struct LazyArray {
    shape: Vec<usize>,
    loader: Arc<Loader>,
}

impl LazyArray {
    /// Create a deferred array from a loader and its declared shape.
    pub fn new<F>(shape: Vec<usize>, loader: F) -> Self
    where
        F: Fn() -> anyhow::Result<ArrayD<f32>> + Send + Sync + 'static,
    {
        Self {
            shape,
            loader: Arc::new(loader),
        }
    }

    /// Wrap already decoded values.
    pub fn from_array(array: ArrayD<f32>) -> Self {
        let shape = array.shape().to_vec();
        let array = Arc::new(array);
        Self::new(shape, move || Ok(array.as_ref().clone()))
    }

    /// Declared shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the values, checking them against the declared shape.
    pub fn compute(&self) -> CubeResult<ArrayD<f32>> {
        let array = (self.loader)().map_err(CubeError::Load)?;
        if array.shape() != self.shape.as_slice() {
            return Err(CubeError::shape_mismatch(&self.shape, array.shape()));
        }
        Ok(array)
    }

    /// Derive a new deferred array by transforming this one's values on compute.
    pub fn map<F>(&self, shape: Vec<usize>, f: F) -> LazyArray
    where
        F: Fn(ArrayD<f32>) -> anyhow::Result<ArrayD<f32>> + Send + Sync + 'static,
    {
        let source = self.clone();
        LazyArray::new(shape, move || f(source.compute()?))
    }
}

impl fmt::Debug for LazyArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArray")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
