//! Подбор гиперпараметров: перебор сетки или случайная выборка из нее

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ModelError;
use crate::models::cross_validation::{cross_val_score, mean_score};
use crate::models::estimator::Estimator;
use crate::types::{ParamGrid, Params, SearchStrategy};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub best_params: Params,
    /// Средняя отрицательная MSE лучшего кандидата; None без поиска
    pub best_score: Option<f64>,
    pub evaluated: usize,
}

/// Все комбинации сетки (декартово произведение).
/// Пустая сетка дает одну пустую комбинацию.
pub fn expand_grid(grid: &ParamGrid) -> Vec<Params> {
    grid.iter().fold(vec![Params::new()], |combinations, (name, values)| {
        combinations
            .iter()
            .flat_map(|base| {
                values.iter().map(move |&value| {
                    let mut params = base.clone();
                    params.insert(name.clone(), value);
                    params
                })
            })
            .collect()
    })
}

pub fn search(
    estimator: &dyn Estimator,
    x: &Array2<f64>,
    y: &Array1<f64>,
    folds: usize,
    strategy: SearchStrategy,
    grid: &ParamGrid,
) -> Result<SearchResult, ModelError> {
    let candidates = match strategy {
        SearchStrategy::None => {
            return Ok(SearchResult {
                best_params: estimator.params(),
                best_score: None,
                evaluated: 0,
            })
        }
        SearchStrategy::Grid => expand_grid(grid),
        SearchStrategy::Random { n_iter, seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            expand_grid(grid)
                .choose_multiple(&mut rng, n_iter)
                .cloned()
                .collect()
        }
    };

    let mut best: Option<(Params, f64)> = None;
    for params in &candidates {
        let mut candidate = estimator.clone_box();
        candidate.set_params(params)?;

        let score = mean_score(&cross_val_score(candidate.as_ref(), x, y, folds)?);
        tracing::debug!("{} {:?}: mean score {:.4}", estimator.name(), params, score);

        if best.as_ref().map_or(true, |(_, s)| score > *s) {
            best = Some((params.clone(), score));
        }
    }

    let (best_params, best_score) = best.ok_or_else(|| {
        ModelError::Fit("hyper-parameter search has no candidates".to_string())
    })?;

    Ok(SearchResult {
        best_params,
        best_score: Some(best_score),
        evaluated: candidates.len(),
    })
}
