use ndarray::{ArrayView1, ArrayViewMut1};

pub trait Optimizer {
    /// Updates `params` in place given the gradient of the loss with respect to them.
    fn update_params(&mut self, params: ArrayViewMut1<f32>, grad: ArrayView1<f32>);
}
