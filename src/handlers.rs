use actix_web::{web, HttpResponse, Result};
use futures_util::StreamExt;
use serde_json::{Map, Value};
use tracing::error;

use crate::encoding::{encode_features, Attribute};
use crate::errors::PredictError;
use crate::models::{PredictRequest, PredictionResponse};
use crate::state::AppState;

/// Register the category listing routes and `POST /predict`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    for attribute in Attribute::ALL {
        cfg.service(web::resource(attribute.route()).route(web::get().to(
            move |state: web::Data<AppState>| category_list(state, attribute),
        )));
    }
    cfg.service(web::resource("/predict").route(web::post().to(predict)));
}

/// Largest `/predict` body accepted, matching actix's default payload limit.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

async fn category_list(state: web::Data<AppState>, attribute: Attribute) -> HttpResponse {
    let mut body = Map::new();
    body.insert(
        attribute.list_key().to_string(),
        Value::from(state.categories(attribute).to_vec()),
    );
    HttpResponse::Ok().json(body)
}

pub async fn predict(
    state: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse, PredictError> {
    match run_prediction(&state, payload).await {
        Ok(prediction) => Ok(HttpResponse::Ok().json(PredictionResponse { prediction })),
        Err(e) => {
            error!("Error during prediction: {}", e);
            Err(e)
        }
    }
}

async fn run_prediction(
    state: &AppState,
    payload: web::Payload,
) -> Result<String, PredictError> {
    let classifier = state.classifier().ok_or(PredictError::ModelNotLoaded)?;

    // read and parse the body here so that oversized or malformed input fails like any other request
    let body = read_body(payload).await?;
    let request: PredictRequest = serde_json::from_slice(&body)?;
    let features = request.features.ok_or(PredictError::MissingFeatures)?;
    let encoded = encode_features(&features)?;

    let prediction = web::block(move || classifier.predict(&encoded))
        .await
        .map_err(|e| PredictError::Internal {
            message: e.to_string(),
        })??;

    Ok(prediction)
}

async fn read_body(mut payload: web::Payload) -> Result<web::BytesMut, PredictError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| PredictError::Payload {
            message: e.to_string(),
        })?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(PredictError::PayloadTooLarge {
                limit: MAX_BODY_BYTES,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
