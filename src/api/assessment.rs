/// Assessment and history endpoints
use crate::{
    account::UsageReport,
    api::middleware,
    context::AppContext,
    error::{AppError, AppResult},
    history::{IllnessRecord, IllnessSummary},
    predictor::PatientIntake,
    reference::DiseaseInfo,
};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};

/// Build assessment routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/assess", post(assess))
        .route("/api/history", get(history))
        .route("/api/history/:index/treatment", get(download_treatment))
        .route("/api/history/:index/illness", get(download_illness))
}

/// Questionnaire submission
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    /// Names of the symptoms answered "Yes"
    pub symptoms: Vec<String>,
    pub age: u32,
    pub gender: String,
    pub blood_pressure: String,
    pub cholesterol: String,
}

/// Assessment outcome
#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub disease: String,
    pub symptoms: Vec<String>,
    pub usage: UsageReport,
    pub info: Option<DiseaseInfo>,
    pub email_notice: String,
}

/// Run an assessment: quota consult, prediction, report generation, history
/// append, then a best-effort notification email.
async fn assess(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Json(req): Json<AssessmentRequest>,
) -> AppResult<Json<AssessmentResponse>> {
    let account = middleware::require_user(&ctx, &credentials).await?;

    if req.symptoms.is_empty() {
        return Err(AppError::Validation(
            "Select at least one symptom".to_string(),
        ));
    }

    ctx.accounts
        .ensure_within_quota(&account.username, ctx.config.quota.prediction_limit)
        .await?;

    let intake = PatientIntake {
        symptoms: req.symptoms.clone(),
        age: req.age,
        gender: req.gender.clone(),
        blood_pressure: req.blood_pressure.clone(),
        cholesterol: req.cholesterol.clone(),
    };
    let disease = ctx.model.predict(&intake).await?;

    ctx.accounts.increment_usage(&account.username).await?;

    let info = ctx.catalog.get(&disease).cloned();
    let treatment = ctx
        .renderer
        .render_treatment(&disease, info.as_ref(), &account.username)?;
    let illness = ctx
        .renderer
        .render_illness(&disease, info.as_ref(), &account.username)?;

    ctx.history
        .append(&account.username, &disease, &req.symptoms, &treatment, &illness)
        .await?;

    // Best-effort dispatch: a mail failure is reported to the caller but the
    // history append above stays committed
    let email_notice = match ctx
        .mailer
        .send_diagnosis_email(
            &account.email,
            &account.username,
            &disease,
            &req.symptoms,
            &treatment,
            &illness,
        )
        .await
    {
        Ok(()) => "Diagnosis email sent".to_string(),
        Err(e) => {
            tracing::warn!("Diagnosis email to {} failed: {}", account.email, e);
            format!("Diagnosis email failed: {}", e)
        }
    };

    let usage = ctx.accounts.usage_count(&account.username).await?;

    Ok(Json(AssessmentResponse {
        disease,
        symptoms: req.symptoms,
        usage,
        info,
        email_notice,
    }))
}

/// Own history listing, without the embedded payloads
async fn history(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
) -> AppResult<Json<Vec<IllnessSummary>>> {
    let account = middleware::require_user(&ctx, &credentials).await?;
    let records = ctx.history.history_for(&account.username).await?;
    Ok(Json(records.iter().map(IllnessSummary::from).collect()))
}

/// Download the treatment report of one history entry
async fn download_treatment(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(index): Path<usize>,
) -> AppResult<Response> {
    let account = middleware::require_user(&ctx, &credentials).await?;
    let record = lookup_record(&ctx, &account.username, index).await?;
    pdf_response(
        format!("Clinia_Treatment_Plan_{}.pdf", record.disease),
        record.treatment_bytes()?,
    )
}

/// Download the illness report of one history entry
async fn download_illness(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(index): Path<usize>,
) -> AppResult<Response> {
    let account = middleware::require_user(&ctx, &credentials).await?;
    let record = lookup_record(&ctx, &account.username, index).await?;
    pdf_response(
        format!("Clinia_Illness_Info_{}.pdf", record.disease),
        record.illness_bytes()?,
    )
}

async fn lookup_record(
    ctx: &AppContext,
    username: &str,
    index: usize,
) -> AppResult<IllnessRecord> {
    let mut records = ctx.history.history_for(username).await?;
    if index >= records.len() {
        return Err(AppError::NotFound("History entry not found".to_string()));
    }
    Ok(records.swap_remove(index))
}

fn pdf_response(filename: String, bytes: Vec<u8>) -> AppResult<Response> {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
