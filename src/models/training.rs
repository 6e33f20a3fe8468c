//! Обучение и оценка модели цены

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ModelError;
use crate::models::cross_validation::{cross_val_score, mean_score, mean_squared_error};
use crate::models::estimator::Estimator;
use crate::models::search::search;
use crate::preprocessing::FeatureEngineer;
use crate::types::{ParamGrid, Params, SearchStrategy, Table};

/// Обученная модель вместе с описанием признаков
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub estimator: Box<dyn Estimator>,
    pub target_column: String,
    pub feature_columns: Vec<String>,
    pub best_params: Params,
    /// Средняя отрицательная MSE по фолдам
    pub avg_score: f64,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub mse: f64,
    pub predictions: Array1<f64>,
}

/// Подбор гиперпараметров, обучение на всех данных и кросс-валидация
pub fn train_model(
    table: &Table,
    target_column: &str,
    feature_columns: &[String],
    mut estimator: Box<dyn Estimator>,
    folds: usize,
    strategy: SearchStrategy,
    param_grid: &ParamGrid,
) -> Result<TrainedModel, ModelError> {
    let (x, y) = FeatureEngineer::extract(table, target_column, feature_columns)?;

    tracing::info!("Starting hyper-parameter search ({:?})", strategy);
    let result = search(estimator.as_ref(), &x, &y, folds, strategy, param_grid)?;
    estimator.set_params(&result.best_params)?;
    tracing::info!(
        "Finished hyper-parameter search: {} candidates, best {:?}",
        result.evaluated,
        result.best_params
    );

    tracing::info!("Starting model fitting: {} rows, {} features", x.nrows(), x.ncols());
    estimator.fit(&x, &y)?;
    tracing::info!("Finished model fitting");

    tracing::info!("Evaluating the model");
    let avg_score = mean_score(&cross_val_score(estimator.as_ref(), &x, &y, folds)?);
    tracing::info!("Finished model evaluation: mean score {:.4}", avg_score);

    Ok(TrainedModel {
        estimator,
        target_column: target_column.to_string(),
        feature_columns: feature_columns.to_vec(),
        best_params: result.best_params,
        avg_score,
    })
}

/// Прогноз на тестовой таблице и его MSE
pub fn predict_model(
    model: &TrainedModel,
    test: &Table,
    target_column: &str,
) -> Result<Evaluation, ModelError> {
    let (x, y) = FeatureEngineer::extract(test, target_column, &model.feature_columns)?;

    let predictions = model.estimator.predict(&x)?;
    let mse = mean_squared_error(&y, &predictions)?;
    tracing::info!("Mean squared error on {} rows: {:.2}", y.len(), mse);

    Ok(Evaluation { mse, predictions })
}

/// Случайное разбиение строк на обучающую и тестовую части
pub fn train_test_split(
    table: &Table,
    test_ratio: f64,
    seed: u64,
) -> Result<(Table, Table), ModelError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(ModelError::InvalidParameter {
            name: "test_ratio".to_string(),
            value: test_ratio,
        });
    }

    let mut indices: Vec<usize> = (0..table.len()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = (table.len() as f64 * test_ratio).ceil() as usize;
    let (test_idx, train_idx) = indices.split_at(n_test.min(indices.len()));

    let pick = |idx: &[usize]| {
        Table::from_rows(
            table.columns.clone(),
            idx.iter().map(|&i| table.rows[i].clone()).collect(),
        )
    };

    Ok((pick(train_idx), pick(test_idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::linear::RidgeRegression;
    use crate::types::Value;

    fn listings(n: usize) -> Table {
        // price = 1000 * power - 0.1 * mileage + 20000
        let rows = (0..n)
            .map(|i| {
                let power = 60 + (i * 7) % 150;
                let mileage = (i * 13_337) % 300_000;
                let price = 1000 * power as i64 - mileage as i64 / 10 + 20_000;
                vec![
                    Value::Int(power as i64),
                    Value::Int(mileage as i64),
                    Value::Int(price),
                ]
            })
            .collect();
        Table::from_rows(vec!["power".into(), "mileage".into(), "price".into()], rows)
    }

    fn features() -> Vec<String> {
        vec!["power".to_string(), "mileage".to_string()]
    }

    #[test]
    fn trains_and_evaluates_ridge() {
        let table = listings(60);
        let grid = ParamGrid::from([("alpha".to_string(), vec![0.0, 10.0, 1000.0])]);

        let model = train_model(
            &table,
            "price",
            &features(),
            Box::new(RidgeRegression::new(1.0)),
            3,
            SearchStrategy::Grid,
            &grid,
        )
        .unwrap();

        assert_eq!(model.best_params["alpha"], 0.0);
        assert!(model.avg_score <= 0.0);
        // цена почти линейна по признакам
        assert!(model.avg_score > -100.0);

        let evaluation = predict_model(&model, &listings(10), "price").unwrap();
        assert_eq!(evaluation.predictions.len(), 10);
        assert!(evaluation.mse < 100.0);
    }

    #[test]
    fn no_search_reports_default_params() {
        let model = train_model(
            &listings(30),
            "price",
            &features(),
            Box::new(RidgeRegression::new(2.5)),
            3,
            SearchStrategy::None,
            &ParamGrid::new(),
        )
        .unwrap();

        assert_eq!(model.best_params, Params::from([("alpha".to_string(), 2.5)]));
    }

    #[test]
    fn unknown_feature_column_fails() {
        let result = train_model(
            &listings(30),
            "price",
            &["colour".to_string()],
            Box::new(RidgeRegression::new(1.0)),
            3,
            SearchStrategy::None,
            &ParamGrid::new(),
        );
        assert!(matches!(result, Err(ModelError::UnknownColumn(_))));
    }

    #[test]
    fn split_is_disjoint_and_complete() {
        let table = listings(20);
        let (train, test) = train_test_split(&table, 0.25, 42).unwrap();

        assert_eq!(test.len(), 5);
        assert_eq!(train.len(), 15);

        let mut prices: Vec<_> = train
            .rows
            .iter()
            .chain(test.rows.iter())
            .map(|r| r[2].as_i64().unwrap())
            .collect();
        let mut expected: Vec<_> = table.rows.iter().map(|r| r[2].as_i64().unwrap()).collect();
        prices.sort_unstable();
        expected.sort_unstable();
        assert_eq!(prices, expected);

        assert!(train_test_split(&table, 1.0, 42).is_err());
    }
}
