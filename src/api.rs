//! HTTP API: подготовка, очистка, отбор признаков и обучение модели цены

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::error::{ModelError, PipelineError};
use crate::models::{build_estimator, predict_model, select_features, train_model, TrainedModel};
use crate::preprocessing::{prepare_data, FeatureEngineer, FieldCleaner};
use crate::types::{
    CleanRequest, CleanResponse, FeatureSelectionRequest, FeatureSelectionResponse,
    PredictRequest, PredictResponse, Table, TrainRequest, TrainResponse,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    model: Arc<Mutex<Option<TrainedModel>>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            model: Arc::new(Mutex::new(None)),
        }
    }
}

/// Ошибка обработчика с HTTP статусом
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("no trained model, call /api/train first")]
    NoModel,
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::RaggedRow { .. })
            | ApiError::Model(ModelError::Pipeline(PipelineError::RaggedRow { .. })) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Pipeline(_) | ApiError::Model(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NoModel => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Очистка, обучение и отбор признаков выполняются вне рантайма
async fn blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(Into::into)
}

pub fn router(state: AppState) -> Router {
    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/prepare", post(prepare))
        .route("/api/clean", post(clean))
        .route("/api/pipeline", post(pipeline))
        .route("/api/features", post(features))
        .route("/api/train", post(train))
        .route("/api/predict", post(predict))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Listings ML API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn prepare(Json(raw): Json<Table>) -> ApiResult<Table> {
    tracing::info!("Prepare request: {} rows", raw.len());
    Ok(Json(blocking(move || prepare_data(&raw)).await?))
}

async fn clean(State(state): State<AppState>, Json(req): Json<CleanRequest>) -> ApiResult<CleanResponse> {
    tracing::info!("Clean request: {} rows", req.table.len());

    let cleaner = FieldCleaner::new(req.options.unwrap_or(state.config.clean));
    let (table, report) = blocking(move || cleaner.run(&req.table)).await?;
    Ok(Json(CleanResponse { table, report }))
}

/// Проекция сырой выгрузки и очистка за один запрос
async fn pipeline(State(state): State<AppState>, Json(req): Json<CleanRequest>) -> ApiResult<CleanResponse> {
    tracing::info!("Pipeline request: {} rows", req.table.len());

    let cleaner = FieldCleaner::new(req.options.unwrap_or(state.config.clean));
    let (table, report) = blocking(move || cleaner.run(&prepare_data(&req.table)?)).await?;
    Ok(Json(CleanResponse { table, report }))
}

async fn features(Json(req): Json<FeatureSelectionRequest>) -> ApiResult<FeatureSelectionResponse> {
    tracing::info!("Feature selection request: {:?}, {} rows", req.method, req.table.len());

    let selected_features = blocking(move || {
        select_features(&req.table, &req.target_column, req.method, req.n_features)
    })
    .await?;
    Ok(Json(FeatureSelectionResponse { selected_features }))
}

async fn train(State(state): State<AppState>, Json(req): Json<TrainRequest>) -> ApiResult<TrainResponse> {
    tracing::info!("Train request: {:?}, {} rows", req.estimator, req.table.len());

    let folds = req.folds.unwrap_or(state.config.folds);
    let feature_columns = match req.feature_columns {
        Some(columns) if columns.is_empty() => {
            return Err(ApiError::BadRequest("feature_columns must not be empty".to_string()))
        }
        Some(columns) => columns,
        None => FeatureEngineer::feature_columns(&req.table, &req.target_column),
    };

    let model = blocking(move || {
        train_model(
            &req.table,
            &req.target_column,
            &feature_columns,
            build_estimator(&req.estimator),
            folds,
            req.search,
            &req.param_grid,
        )
    })
    .await?;

    let response = TrainResponse {
        estimator: model.estimator.name().to_string(),
        feature_columns: model.feature_columns.clone(),
        best_params: model.best_params.clone(),
        avg_score: model.avg_score,
    };
    *state.model.lock().await = Some(model);

    Ok(Json(response))
}

async fn predict(State(state): State<AppState>, Json(req): Json<PredictRequest>) -> ApiResult<PredictResponse> {
    tracing::info!("Predict request: {} rows", req.table.len());

    let model = state.model.lock().await.clone().ok_or(ApiError::NoModel)?;
    let evaluation = blocking(move || predict_model(&model, &req.table, &req.target_column)).await?;

    Ok(Json(PredictResponse {
        mse: evaluation.mse,
        predictions: evaluation.predictions.to_vec(),
    }))
}
