//! Shared parameter tensor
//!
//! A `Tensor` is a cheap shared handle over a flat `f32` buffer plus an
//! optional gradient. The model and the optimizer hold clones of the same
//! handle, so an optimizer step is visible to the model without any
//! parameter re-registration.

use ndarray::Array1;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

struct Inner {
    data: Array1<f32>,
    grad: Option<Array1<f32>>,
    requires_grad: bool,
}

/// Shared handle to a parameter buffer and its gradient.
#[derive(Clone)]
pub struct Tensor(Rc<RefCell<Inner>>);

impl Tensor {
    /// Create a tensor from a vector of values.
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            data: Array1::from(data),
            grad: None,
            requires_grad,
        })))
    }

    /// Create a zero-filled tensor.
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::from_vec(vec![0.0; len], requires_grad)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.borrow().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the underlying data.
    pub fn data(&self) -> Ref<'_, Array1<f32>> {
        Ref::map(self.0.borrow(), |inner| &inner.data)
    }

    /// Mutably borrow the underlying data.
    pub fn data_mut(&self) -> RefMut<'_, Array1<f32>> {
        RefMut::map(self.0.borrow_mut(), |inner| &mut inner.data)
    }

    /// Current gradient, if one has been set since the last `zero_grad`.
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.0.borrow().grad.clone()
    }

    /// Replace the gradient.
    pub fn set_grad(&self, grad: Array1<f32>) {
        debug_assert_eq!(grad.len(), self.len());
        self.0.borrow_mut().grad = Some(grad);
    }

    /// Add into the gradient, initializing it if unset.
    pub fn accumulate_grad(&self, delta: &Array1<f32>) {
        debug_assert_eq!(delta.len(), self.len());
        let mut inner = self.0.borrow_mut();
        match inner.grad.as_mut() {
            Some(grad) => *grad += delta,
            None => inner.grad = Some(delta.clone()),
        }
    }

    /// Clear the gradient.
    pub fn zero_grad(&self) {
        self.0.borrow_mut().grad = None;
    }

    pub fn requires_grad(&self) -> bool {
        self.0.borrow().requires_grad
    }

    /// Whether two handles refer to the same underlying buffer.
    pub fn ptr_eq(a: &Tensor, b: &Tensor) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Tensor")
            .field("len", &inner.data.len())
            .field("requires_grad", &inner.requires_grad)
            .field("has_grad", &inner.grad.is_some())
            .finish()
    }
}
