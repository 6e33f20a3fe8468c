/// ML модели и обвязка обучения

pub mod cross_validation;
pub mod estimator;
pub mod feature_selection;
pub mod linear;
pub mod search;
pub mod training;
pub mod tree;

pub use estimator::{build_estimator, Estimator};
pub use feature_selection::select_features;
pub use linear::{LinearRegression, RidgeRegression};
pub use training::{predict_model, train_model, train_test_split, Evaluation, TrainedModel};
pub use tree::{RandomForest, RegressionTree};
