//! The init / prepare / eval lifecycle a host runtime drives.

use tracing::debug;

use crate::{ModelDescriptor, ModelError, OpSignature, ValidateOptions, ValidatedModel};

/// Name under which hosts register this operator.
pub const OPERATOR_NAME: &str = "TreeEnsembleClassifier";

/// One operator instance bound to one serialized model.
///
/// `init` decodes the model when the graph is loaded, `prepare` validates it
/// once tensor shapes are known, and `eval` runs inference. `eval` refuses to
/// run until a `prepare` has succeeded.
///
/// # Example
///
/// ```
/// use tree_ensemble::{EnsembleModel, OpSignature, TreeEnsembleClassifier};
///
/// let bytes = EnsembleModel {
///     nodes_weights: vec![0.5],
///     nodes_classids: vec![1],
///     tree_root_ids: vec![0],
///     ..EnsembleModel::default()
/// }
/// .with_counts()
/// .to_bytes();
///
/// let mut op = TreeEnsembleClassifier::init(&bytes).unwrap();
/// op.prepare(&OpSignature::dense(3, 2)).unwrap();
///
/// let mut scores = [0.0; 2];
/// op.eval(&[1.0, 2.0, 3.0], &mut scores).unwrap();
/// assert_eq!(scores, [0.0, 0.5]);
/// ```
#[derive(Debug, Clone)]
pub struct TreeEnsembleClassifier<'a> {
    descriptor: ModelDescriptor<'a>,
    options: ValidateOptions,
    prepared: Option<ValidatedModel<'a>>,
}

impl<'a> TreeEnsembleClassifier<'a> {
    pub fn init(buf: &'a [u8]) -> Result<Self, ModelError> {
        Ok(Self {
            descriptor: ModelDescriptor::from_bytes(buf)?,
            options: ValidateOptions::default(),
            prepared: None,
        })
    }

    pub fn with_options(mut self, options: ValidateOptions) -> Self {
        self.options = options;
        self.prepared = None;
        self
    }

    /// Validates the model against the operator's tensors. A failed
    /// `prepare` leaves the operator unprepared even if an earlier one
    /// succeeded.
    pub fn prepare(&mut self, signature: &OpSignature) -> Result<(), ModelError> {
        self.prepared = None;
        let model = self.descriptor.validate(signature, &self.options)?;
        debug!(
            operator = OPERATOR_NAME,
            trees = model.descriptor().num_trees(),
            "prepared operator"
        );
        self.prepared = Some(model);
        Ok(())
    }

    /// Scores every row in `input` into `output`.
    ///
    /// `input` holds whole rows of `input_width` features and `output` one
    /// `output_width` score vector per row.
    pub fn eval(&self, input: &[f32], output: &mut [f32]) -> Result<(), ModelError> {
        let model = self.prepared.as_ref().ok_or(ModelError::NotPrepared)?;
        let (input_width, output_width) = (model.input_width(), model.output_width());
        if input_width == 0 {
            // No features means no internal nodes; score a single row.
            if !input.is_empty() {
                return Err(ModelError::shape(format!(
                    "input holds {} values, expected none",
                    input.len()
                )));
            }
            if output.len() != output_width {
                return Err(ModelError::shape(format!(
                    "output holds {} values, expected {output_width}",
                    output.len()
                )));
            }
            model.evaluate(&[], output);
            return Ok(());
        }
        if input.len() % input_width != 0 {
            return Err(ModelError::shape(format!(
                "input holds {} values, not a multiple of {input_width}",
                input.len()
            )));
        }
        let rows = input.len() / input_width;
        if output.len() != rows * output_width {
            return Err(ModelError::shape(format!(
                "output holds {} values, expected {} for {rows} rows",
                output.len(),
                rows * output_width
            )));
        }
        model.evaluate_batch(input, output);
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    pub fn descriptor(&self) -> &ModelDescriptor<'a> {
        &self.descriptor
    }

    /// The validated model from the last successful `prepare`.
    pub fn model(&self) -> Option<&ValidatedModel<'a>> {
        self.prepared.as_ref()
    }
}
