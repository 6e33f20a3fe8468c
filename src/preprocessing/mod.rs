/// Модуль подготовки данных: проекция, очистка, кодирование, признаки

pub mod cleaning;
pub mod encoding;
pub mod feature_engineering;
pub mod normalization;
pub mod projection;
pub mod schema;

pub use cleaning::{clean_data, FieldCleaner};
pub use encoding::one_hot_encode;
pub use feature_engineering::FeatureEngineer;
pub use normalization::DataNormalizer;
pub use projection::{prepare_data, ColumnProjector};
