use super::types::{ErrorResponse, HealthResponse, ScoreResponse};
use crate::{
    Error,
    config::{ChartMode, DashboardConfig},
    dashboard::{DashboardView, FormInput, FormValues, render_page},
    model::ScoringContext,
    scoring::{self, ScoringRequest},
};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<ScoringContext>,
    pub dashboard: Arc<DashboardConfig>,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn status_for(err: &Error) -> StatusCode {
    if err.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_reply(err: &Error) -> ErrorReply {
    (
        status_for(err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ErrorReply> {
    render_page(&state.dashboard, &FormValues::default(), &DashboardView::Idle)
        .map(Html)
        .map_err(|e| {
            error!("Failed to render dashboard: {}", e);
            error_reply(&e)
        })
}

pub async fn predict(
    State(state): State<AppState>,
    Form(input): Form<FormInput>,
) -> Result<(StatusCode, Html<String>), ErrorReply> {
    let request_id = Uuid::new_v4();
    let explain = state.dashboard.chart_mode == ChartMode::Attribution;

    let (status, form, view) = match input
        .parse()
        .and_then(|request| scoring::score(&state.context, &request, explain))
    {
        Ok(outcome) => {
            info!(
                %request_id,
                loan_amnt = outcome.request.loan_amnt,
                annual_inc = outcome.request.annual_inc,
                dti = outcome.request.dti,
                probability_default = outcome.result.probability_default,
                "Dashboard prediction completed"
            );
            (
                StatusCode::OK,
                FormValues::from_request(&outcome.request),
                DashboardView::Scored(outcome),
            )
        }
        Err(e) => {
            if e.is_validation() {
                warn!(%request_id, "Rejected dashboard input: {}", e);
            } else {
                error!(%request_id, "Dashboard prediction failed: {}", e);
            }
            (
                status_for(&e),
                FormValues::from_input(&input),
                DashboardView::Failed(e.to_string()),
            )
        }
    };

    match render_page(&state.dashboard, &form, &view) {
        Ok(html) => Ok((status, Html(html))),
        Err(e) => {
            error!(%request_id, "Failed to render dashboard results: {}", e);
            let failed = DashboardView::Failed(e.to_string());
            render_page(&state.dashboard, &form, &failed)
                .map(|html| (status_for(&e), Html(html)))
                .map_err(|e| {
                    error!(%request_id, "Failed to render dashboard: {}", e);
                    error_reply(&e)
                })
        }
    }
}

pub async fn score(
    State(state): State<AppState>,
    Json(request): Json<ScoringRequest>,
) -> Result<Json<ScoreResponse>, ErrorReply> {
    let request_id = Uuid::new_v4();

    info!(
        %request_id,
        loan_amnt = request.loan_amnt,
        annual_inc = request.annual_inc,
        dti = request.dti,
        "Received scoring request"
    );

    match scoring::score(&state.context, &request, true) {
        Ok(outcome) => {
            info!(
                %request_id,
                probability_fully_paid = outcome.result.probability_fully_paid,
                probability_default = outcome.result.probability_default,
                "Successfully scored request"
            );
            let (attribution, base_value) = match outcome.attribution {
                Some(a) => (Some(a.features), Some(a.base_value)),
                None => (None, None),
            };
            Ok(Json(ScoreResponse {
                request_id,
                scored_at: Utc::now(),
                probability_fully_paid: outcome.result.probability_fully_paid,
                probability_default: outcome.result.probability_default,
                predicted_outcome: outcome.result.predicted_outcome,
                attribution,
                base_value,
            }))
        }
        Err(e) => {
            error!("Failed to score request {}: {}", request_id, e);
            Err(error_reply(&e))
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        explainable: state.context.classifier().can_explain(),
    })
}
