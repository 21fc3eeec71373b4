//! Tensor shapes the host declares for the operator's inputs and outputs.

use crate::ModelError;

/// Dimensions of one dense tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorShape {
    dims: Vec<usize>,
}

impl TensorShape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self { dims: dims.into() }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
}

/// The tensors wired to one operator instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpSignature {
    pub inputs: Vec<TensorShape>,
    pub outputs: Vec<TensorShape>,
}

impl OpSignature {
    pub fn new(inputs: Vec<TensorShape>, outputs: Vec<TensorShape>) -> Self {
        Self { inputs, outputs }
    }

    /// One `[1, input_width]` input and one `[1, output_width]` output.
    pub fn dense(input_width: usize, output_width: usize) -> Self {
        Self::new(
            vec![TensorShape::new([1, input_width])],
            vec![TensorShape::new([1, output_width])],
        )
    }

    /// Feature and score widths, read from dimension 1 of the single input
    /// and the single output. The input must be rank 2.
    pub fn widths(&self) -> Result<(usize, usize), ModelError> {
        let [input] = self.inputs.as_slice() else {
            return Err(ModelError::shape(format!(
                "expected 1 input tensor, found {}",
                self.inputs.len()
            )));
        };
        let [output] = self.outputs.as_slice() else {
            return Err(ModelError::shape(format!(
                "expected 1 output tensor, found {}",
                self.outputs.len()
            )));
        };
        if input.rank() != 2 {
            return Err(ModelError::shape(format!(
                "input must be rank 2, found rank {}",
                input.rank()
            )));
        }
        let input_width = input.dim(1).unwrap_or_default();
        let output_width = output
            .dim(1)
            .ok_or_else(|| ModelError::shape(format!("output of rank {} has no width", output.rank())))?;
        Ok((input_width, output_width))
    }
}
