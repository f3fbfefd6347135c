use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EnrollmentId, ProgramId, RoundId, SignatureRecordId, StaffSignatureId, UserId};
use super::engine::{NewSignatureRequest, ReceiptUpdate, SignatureWorkflowEngine};
use super::enrollment::EnrollmentTracker;
use super::files::FileUpload;
use super::registry::StaffSignatureDesk;
use super::repository::{
    ClearanceStore, IdentityStore, NotificationLog, ProgramCatalog, ReceiptVault, RepositoryError,
    SignatureRegistry,
};
use super::rounds::RoundRegistry;
use super::views::{self, NotificationView, StaffSignatureView};
use super::ClearanceError;

/// Bundle of services plus the collaborators the view layer resolves
/// against. The router holds this behind an `Arc` as axum state.
pub struct ClearanceApp {
    pub store: Arc<dyn ClearanceStore>,
    pub identity: Arc<dyn IdentityStore>,
    pub catalog: Arc<dyn ProgramCatalog>,
    pub registry: Arc<dyn SignatureRegistry>,
    pub notifications: Arc<dyn NotificationLog>,
    pub rounds: RoundRegistry,
    pub enrollments: EnrollmentTracker,
    pub engine: SignatureWorkflowEngine,
    pub signatures: StaffSignatureDesk,
}

impl ClearanceApp {
    pub fn new(
        store: Arc<dyn ClearanceStore>,
        identity: Arc<dyn IdentityStore>,
        catalog: Arc<dyn ProgramCatalog>,
        registry: Arc<dyn SignatureRegistry>,
        notifications: Arc<dyn NotificationLog>,
        receipts: Arc<dyn ReceiptVault>,
    ) -> Self {
        let rounds = RoundRegistry::new(store.clone(), catalog.clone());
        let enrollments = EnrollmentTracker::new(store.clone(), identity.clone());
        let engine = SignatureWorkflowEngine::new(
            store.clone(),
            identity.clone(),
            catalog.clone(),
            registry.clone(),
            notifications.clone(),
            receipts.clone(),
        );
        let signatures = StaffSignatureDesk::new(identity.clone(), registry.clone(), receipts);

        Self {
            store,
            identity,
            catalog,
            registry,
            notifications,
            rounds,
            enrollments,
            engine,
            signatures,
        }
    }
}

impl IntoResponse for ClearanceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ClearanceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ClearanceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ClearanceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            ClearanceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ClearanceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Router builder exposing the clearance workflow endpoints.
pub fn clearance_router(app: Arc<ClearanceApp>) -> Router {
    Router::new()
        .route(
            "/api/v1/clearance-rounds",
            post(create_round).get(list_rounds),
        )
        .route("/api/v1/clearance-rounds/latest", get(latest_round))
        .route("/api/v1/clearance-rounds/:id", get(get_round))
        .route(
            "/api/v1/student-clearances",
            post(request_enrollment).get(enrollments_for_student),
        )
        .route(
            "/api/v1/student-clearances/:id",
            patch(set_enrollment_status),
        )
        .route("/api/v1/clearance-signatures", get(query_signatures))
        .route(
            "/api/v1/clearance-signatures/create/:student_id/:program_id",
            post(create_signature),
        )
        .route(
            "/api/v1/clearance-signatures/lookup/:student_id/:program_id",
            get(lookup_signature),
        )
        .route(
            "/api/v1/clearance-signatures/status/:round_id/:student_id/:program_id",
            get(lookup_signature_by_round),
        )
        .route(
            "/api/v1/clearance-signatures/:id",
            patch(transition_signature),
        )
        .route(
            "/api/v1/clearance-signatures/:id/receipt",
            patch(submit_receipt),
        )
        .route(
            "/api/v1/feedback/:program_id/:student_id",
            get(latest_feedback),
        )
        .route("/api/v1/staff-signatures", post(upsert_staff_signature))
        .route("/api/v1/staff-signatures/:staff_id", get(staff_signature))
        .route("/api/v1/notifications/:user_id", get(notifications_for_user))
        .with_state(app)
}

#[derive(Debug, Deserialize)]
struct CreateRoundRequest {
    semester: String,
    academic_year: String,
}

#[derive(Debug, Deserialize)]
struct EnrollmentRequest {
    student_id: u64,
}

#[derive(Debug, Deserialize)]
struct EnrollmentQuery {
    student: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct StatusUpdateRequest {
    status: String,
}

#[derive(Debug, Deserialize)]
struct CreateSignatureRequest {
    signature_id: Option<u64>,
    status: Option<String>,
    feedback: Option<String>,
    receipt: Option<FileUpload>,
}

#[derive(Debug, Deserialize)]
struct TransitionRequest {
    status: String,
    staff_id: Option<u64>,
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReceiptRequest {
    receipt: Option<FileUpload>,
    status: Option<String>,
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignatureFilterQuery {
    program: Option<String>,
    last_name: Option<String>,
    year_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpsertSignatureRequest {
    staff_id: u64,
    description: Option<String>,
    image: FileUpload,
}

async fn create_round(
    State(app): State<Arc<ClearanceApp>>,
    Json(request): Json<CreateRoundRequest>,
) -> Result<impl IntoResponse, ClearanceError> {
    let round = app
        .rounds
        .create_round(&request.semester, &request.academic_year)?;
    let view = views::round_view(&round, app.catalog.as_ref())?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_rounds(
    State(app): State<Arc<ClearanceApp>>,
) -> Result<impl IntoResponse, ClearanceError> {
    let rounds = app.rounds.list_rounds()?;
    let mut payload = Vec::with_capacity(rounds.len());
    for round in &rounds {
        payload.push(views::round_view(round, app.catalog.as_ref())?);
    }
    Ok(Json(payload))
}

async fn latest_round(
    State(app): State<Arc<ClearanceApp>>,
) -> Result<impl IntoResponse, ClearanceError> {
    let round = app.rounds.latest_round()?;
    Ok(Json(views::round_view(&round, app.catalog.as_ref())?))
}

async fn get_round(
    State(app): State<Arc<ClearanceApp>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ClearanceError> {
    let round = app.rounds.get_round(RoundId(id))?;
    Ok(Json(views::round_view(&round, app.catalog.as_ref())?))
}

async fn request_enrollment(
    State(app): State<Arc<ClearanceApp>>,
    Json(request): Json<EnrollmentRequest>,
) -> Result<impl IntoResponse, ClearanceError> {
    let enrollment = app.enrollments.request_enrollment(UserId(request.student_id))?;
    let view = views::enrollment_view(
        &enrollment,
        app.store.as_ref(),
        app.identity.as_ref(),
        app.catalog.as_ref(),
    )?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn enrollments_for_student(
    State(app): State<Arc<ClearanceApp>>,
    Query(query): Query<EnrollmentQuery>,
) -> Result<impl IntoResponse, ClearanceError> {
    // With a student filter: enrollments matching the latest round's term.
    // Without one: the full listing, most recent round first.
    let enrollments = match query.student {
        Some(student) => app
            .enrollments
            .list_for_student_matching_latest(UserId(student))?,
        None => app.enrollments.list_all()?,
    };
    let mut payload = Vec::with_capacity(enrollments.len());
    for enrollment in &enrollments {
        payload.push(views::enrollment_view(
            enrollment,
            app.store.as_ref(),
            app.identity.as_ref(),
            app.catalog.as_ref(),
        )?);
    }
    Ok(Json(payload))
}

async fn set_enrollment_status(
    State(app): State<Arc<ClearanceApp>>,
    Path(id): Path<u64>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ClearanceError> {
    let enrollment = app
        .enrollments
        .set_status(EnrollmentId(id), &request.status)?;
    let view = views::enrollment_view(
        &enrollment,
        app.store.as_ref(),
        app.identity.as_ref(),
        app.catalog.as_ref(),
    )?;
    Ok(Json(view))
}

async fn create_signature(
    State(app): State<Arc<ClearanceApp>>,
    Path((student_id, program_id)): Path<(u64, u64)>,
    Json(request): Json<CreateSignatureRequest>,
) -> Result<impl IntoResponse, ClearanceError> {
    let record = app.engine.create_signature_record(
        UserId(student_id),
        ProgramId(program_id),
        NewSignatureRequest {
            signature_id: request.signature_id.map(StaffSignatureId),
            status: request.status,
            feedback: request.feedback,
            receipt: request.receipt,
        },
    )?;
    let view = views::signature_record_view(
        &record,
        app.identity.as_ref(),
        app.catalog.as_ref(),
        app.registry.as_ref(),
    )?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn lookup_signature(
    State(app): State<Arc<ClearanceApp>>,
    Path((student_id, program_id)): Path<(u64, u64)>,
) -> Result<Response, ClearanceError> {
    let record = app
        .engine
        .lookup(UserId(student_id), ProgramId(program_id))?;
    signature_or_empty(&app, record)
}

async fn lookup_signature_by_round(
    State(app): State<Arc<ClearanceApp>>,
    Path((round_id, student_id, program_id)): Path<(u64, u64, u64)>,
) -> Result<Response, ClearanceError> {
    let record = app.engine.lookup_by_round(
        RoundId(round_id),
        UserId(student_id),
        ProgramId(program_id),
    )?;
    signature_or_empty(&app, record)
}

/// `None` is the successful "no signature yet" outcome, not an error.
fn signature_or_empty(
    app: &ClearanceApp,
    record: Option<super::domain::ClearanceSignature>,
) -> Result<Response, ClearanceError> {
    match record {
        Some(record) => {
            let view = views::signature_record_view(
                &record,
                app.identity.as_ref(),
                app.catalog.as_ref(),
                app.registry.as_ref(),
            )?;
            Ok(Json(view).into_response())
        }
        None => Ok(Json(json!({ "message": "No signature yet" })).into_response()),
    }
}

async fn transition_signature(
    State(app): State<Arc<ClearanceApp>>,
    Path(id): Path<u64>,
    Json(request): Json<TransitionRequest>,
) -> Result<impl IntoResponse, ClearanceError> {
    let record = app.engine.transition_status(
        SignatureRecordId(id),
        &request.status,
        request.staff_id.map(UserId),
        request.feedback.as_deref(),
    )?;
    let view = views::signature_record_view(
        &record,
        app.identity.as_ref(),
        app.catalog.as_ref(),
        app.registry.as_ref(),
    )?;
    Ok(Json(view))
}

async fn submit_receipt(
    State(app): State<Arc<ClearanceApp>>,
    Path(id): Path<u64>,
    Json(request): Json<ReceiptRequest>,
) -> Result<impl IntoResponse, ClearanceError> {
    let record = app.engine.submit_receipt(
        SignatureRecordId(id),
        ReceiptUpdate {
            receipt: request.receipt,
            status: request.status,
            feedback: request.feedback,
        },
    )?;
    let view = views::signature_record_view(
        &record,
        app.identity.as_ref(),
        app.catalog.as_ref(),
        app.registry.as_ref(),
    )?;
    Ok(Json(view))
}

async fn query_signatures(
    State(app): State<Arc<ClearanceApp>>,
    Query(query): Query<SignatureFilterQuery>,
) -> Result<impl IntoResponse, ClearanceError> {
    let records = app.engine.query_by_filters(
        query.program.as_deref(),
        query.last_name.as_deref(),
        query.year_level.as_deref(),
    )?;
    let mut payload = Vec::with_capacity(records.len());
    for record in &records {
        payload.push(views::signature_record_view(
            record,
            app.identity.as_ref(),
            app.catalog.as_ref(),
            app.registry.as_ref(),
        )?);
    }
    Ok(Json(payload))
}

async fn latest_feedback(
    State(app): State<Arc<ClearanceApp>>,
    Path((program_id, student_id)): Path<(u64, u64)>,
) -> Result<impl IntoResponse, ClearanceError> {
    let record = app
        .engine
        .latest_feedback(ProgramId(program_id), UserId(student_id))?;
    let view = views::feedback_view(&record, app.identity.as_ref(), app.catalog.as_ref())?;
    Ok(Json(view))
}

async fn upsert_staff_signature(
    State(app): State<Arc<ClearanceApp>>,
    Json(request): Json<UpsertSignatureRequest>,
) -> Result<impl IntoResponse, ClearanceError> {
    let signature = app.signatures.upsert_signature(
        UserId(request.staff_id),
        request.image,
        request.description.as_deref().unwrap_or_default(),
    )?;
    Ok((
        StatusCode::CREATED,
        Json(StaffSignatureView::from(signature)),
    ))
}

async fn staff_signature(
    State(app): State<Arc<ClearanceApp>>,
    Path(staff_id): Path<u64>,
) -> Result<impl IntoResponse, ClearanceError> {
    let signature = app.signatures.signature_for_staff(UserId(staff_id))?;
    Ok(Json(StaffSignatureView::from(signature)))
}

async fn notifications_for_user(
    State(app): State<Arc<ClearanceApp>>,
    Path(user_id): Path<u64>,
) -> Result<impl IntoResponse, ClearanceError> {
    let entries = app.notifications.for_user(UserId(user_id))?;
    let payload: Vec<NotificationView> = entries.into_iter().map(NotificationView::from).collect();
    Ok(Json(payload))
}
