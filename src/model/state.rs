/// Marker for a model that has **not** been trained yet.
///
/// `Model<Unfitted>` implements [`TrainableModel`](super::TrainableModel) only,
/// so an untrained model cannot be used for prediction.
#[derive(Debug, Clone, Copy)]
pub struct Unfitted;

/// Marker for a trained model.
///
/// `Model<Fitted>` implements [`InferenceModel`](super::InferenceModel) and holds
/// only inference parameters: no optimizer state, loss or hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct Fitted;
