//! Prediction service: load, assemble, predict.

use crate::error::ServiceError;
use crate::feature_assembly::assemble;
use crate::metrics::ServiceMetrics;
use crate::models::ModelHandle;
use crate::types::{PredictionResult, RawInput};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

/// Run one prediction against the handle's artifact.
///
/// Errors keep their kind; nothing is retried and no partial result is
/// ever produced.
pub async fn serve_prediction(
    raw: &RawInput,
    handle: &ModelHandle,
) -> Result<PredictionResult, ServiceError> {
    let artifact = handle.get().await?;
    let row = assemble(raw, artifact.schema())?;
    let result = artifact.predict(&row)?;
    Ok(result)
}

/// Shared prediction entry point for the API and the dashboard.
#[derive(Clone)]
pub struct PredictionService {
    handle: Arc<ModelHandle>,
    metrics: Arc<ServiceMetrics>,
}

impl PredictionService {
    pub fn new(handle: Arc<ModelHandle>, metrics: Arc<ServiceMetrics>) -> Self {
        Self { handle, metrics }
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn metrics(&self) -> &Arc<ServiceMetrics> {
        &self.metrics
    }

    /// Predict for one record, recording latency and failures.
    pub async fn predict(&self, raw: &RawInput) -> Result<PredictionResult, ServiceError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("prediction", request_id = %request_id, fields = raw.len());
        self.predict_recorded(raw).instrument(span).await
    }

    async fn predict_recorded(&self, raw: &RawInput) -> Result<PredictionResult, ServiceError> {
        let start = Instant::now();
        match serve_prediction(raw, &self.handle).await {
            Ok(result) => {
                let elapsed = start.elapsed();
                self.metrics
                    .record_prediction(elapsed, result.probability, result.label);
                debug!(
                    label = result.label,
                    probability = result.probability,
                    processing_time_us = elapsed.as_micros() as u64,
                    "Prediction served"
                );
                Ok(result)
            }
            Err(err) => {
                self.metrics.record_failure(err.kind());
                warn!(kind = err.kind(), error = %err, "Prediction failed");
                Err(err)
            }
        }
    }
}
