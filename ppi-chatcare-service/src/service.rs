use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use ppi_guidance::{
    InteractionTable, canonical_drug_name, generate_patient_handout,
    handout::{SUPPORTED_INDICATIONS, SUPPORTED_PPIS, is_supported_indication, is_supported_ppi},
    handout_file_name, is_clinically_relevant,
    reference::{
        ADVERSE_EFFECTS, AdverseEffectGroup, DEPRESCRIBING_RESOURCES, DEPRESCRIBING_STRATEGIES,
        Guideline, KEY_GUIDELINES, SAFETY_PEARLS,
    },
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    assistants::{Assistant, AssistantError, answer_question, build_assistant},
    clients::RxNormClient,
    config::ServiceConfig,
    feedback::{FeedbackStore, RatingOutcome, UsageStats},
    models::{
        ChatAnswer, ChatRequest, DrugConcept, HandoutQuery, InteractionCatalogueEntry,
        InteractionCheckRequest, InteractionCheckResponse, RatingRequest,
    },
};

/// Where interaction results come from.
pub const INTERACTION_SOURCE: &str = "Local Database";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "id": id
        })),
    )
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

fn upstream_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<dyn Assistant>,
    pub rxnorm: RxNormClient,
    pub table: Arc<InteractionTable>,
    pub feedback: FeedbackStore,
}

impl AppState {
    pub fn new(
        assistant: Arc<dyn Assistant>,
        rxnorm: RxNormClient,
        table: Arc<InteractionTable>,
    ) -> Self {
        Self {
            assistant,
            rxnorm,
            table,
            feedback: FeedbackStore::new(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let assistant = build_assistant(config)?;
        let table = Arc::new(InteractionTable::builtin()?.clone());
        Ok(Self::new(assistant, RxNormClient::new(), table))
    }
}

pub fn create_app(config: &ServiceConfig) -> anyhow::Result<Router> {
    let app_state = AppState::from_config(config)?;
    Ok(build_router(app_state))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/chat", post(chat))
        .route("/chat/{answer_id}/rating", post(rate_answer))
        .route("/stats", get(usage_stats))
        .route("/interactions", get(list_interactions))
        .route("/interactions/check", post(check_interaction))
        .route("/drugs/{name}", get(drug_concept))
        .route("/handouts", get(patient_handout))
        .route("/reference/guidelines", get(guidelines))
        .route("/reference/deprescribing", get(deprescribing))
        .route("/reference/adverse-effects", get(adverse_effects))
        .route("/reference/safety-pearls", get(safety_pearls))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags each request with an `x-correlation-id` header and a matching tracing span.
async fn correlation_id_middleware(mut request: Request<axum::body::Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "PPI ChatCare",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Evidence-based proton pump inhibitor guidance: interaction checks, referenced answers and patient handouts",
        "assistant_mode": state.assistant.mode(),
        "endpoints": {
            "POST /chat": "Ask a PPI question",
            "POST /chat/{answer_id}/rating": "Rate an answer from 1 to 5",
            "GET /stats": "Usage counters",
            "GET /interactions": "PPIs and drugs with documented interactions",
            "POST /interactions/check": "Check a PPI against another medication",
            "GET /drugs/{name}": "RxNorm concept for a drug name",
            "GET /handouts?ppi=&indication=": "Patient handout (markdown)",
            "GET /reference/guidelines": "Key guidelines",
            "GET /reference/deprescribing": "Deprescribing strategies",
            "GET /reference/adverse-effects": "Warning signs and adverse effects",
            "GET /reference/safety-pearls": "PPI safety pearls",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn validate_question(question: &str) -> Result<(), ApiError> {
    if question.trim().is_empty() {
        return Err(bad_request_error("Question cannot be empty"));
    }
    Ok(())
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatAnswer> {
    validate_question(&request.question)?;
    state.feedback.record_query();

    let mode = state.assistant.mode();
    info!(mode = %mode, "Chat question received");

    match answer_question(state.assistant.as_ref(), &request.question).await {
        Ok(reply) => {
            let answer_id = Uuid::new_v4().to_string();
            state.feedback.record_success(&answer_id);

            info!(
                answer_id = %answer_id,
                references = reply.references.len(),
                "Chat answer generated"
            );

            Ok(Json(ChatAnswer {
                answer_id,
                mode,
                clinically_relevant: is_clinically_relevant(&reply.content),
                content: reply.content,
                references: reply.references,
            }))
        }
        Err(AssistantError::EmptyQuestion) => Err(bad_request_error("Question cannot be empty")),
        Err(e) => {
            state.feedback.record_failure();
            error!(mode = %mode, "Failed to generate response: {}", e);
            Err(upstream_error("Error generating response", &e.to_string()))
        }
    }
}

async fn rate_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<String>,
    Json(request): Json<RatingRequest>,
) -> ApiResult<Value> {
    match state
        .feedback
        .rate(&answer_id, request.rating, request.comment)
    {
        RatingOutcome::Recorded => {
            info!(answer_id = %answer_id, rating = request.rating, "Answer rated");
            Ok(Json(json!({
                "answer_id": answer_id,
                "rating": request.rating,
                "status": "recorded"
            })))
        }
        RatingOutcome::UnknownAnswer => Err(not_found_error("Answer not found", &answer_id)),
        RatingOutcome::OutOfRange => Err(bad_request_error("Rating must be between 1 and 5")),
    }
}

async fn usage_stats(State(state): State<AppState>) -> Json<UsageStats> {
    Json(state.feedback.stats())
}

fn validate_drug_names(request: &InteractionCheckRequest) -> Result<(), ApiError> {
    if request.ppi.trim().is_empty() {
        return Err(bad_request_error("Please select a PPI."));
    }
    if request.other_drug.trim().is_empty() {
        return Err(bad_request_error(
            "Please enter a medication name to check for interactions.",
        ));
    }
    Ok(())
}

/// RxNorm names for `name`: the matched concept first, then its ingredients when the
/// match is not itself an ingredient (a brand name, say).
async fn rxnorm_names(rxnorm: &RxNormClient, name: &str) -> anyhow::Result<Vec<String>> {
    let Some(concept) = rxnorm.resolve(name).await? else {
        return Ok(Vec::new());
    };

    let mut names = vec![concept.name.clone()];
    if concept.tty.as_deref() != Some("IN") {
        let ingredients = rxnorm.ingredients(&concept.rxcui).await?;
        names.extend(ingredients.into_iter().map(|c| c.name));
    }
    Ok(names)
}

/// Name to look `other_drug` up under. The typed name wins whenever the table documents
/// it for `ppi`; RxNorm names are only used when one of them is documented instead.
async fn resolve_other_drug(state: &AppState, ppi: &str, request: &InteractionCheckRequest) -> String {
    let typed = canonical_drug_name(&request.other_drug);
    if !request.resolve_with_rxnorm || state.table.record(ppi, &typed).is_some() {
        return typed;
    }

    match rxnorm_names(&state.rxnorm, &request.other_drug).await {
        Ok(names) => {
            let documented = names
                .iter()
                .map(|name| canonical_drug_name(name))
                .find(|name| state.table.record(ppi, name).is_some());

            match documented {
                Some(resolved) => {
                    info!(
                        input = %request.other_drug,
                        resolved = %resolved,
                        "Drug name resolved through RxNorm"
                    );
                    resolved
                }
                None => typed,
            }
        }
        Err(e) => {
            warn!(
                input = %request.other_drug,
                "RxNorm lookup failed, using the name as entered: {}", e
            );
            typed
        }
    }
}

async fn check_interaction(
    State(state): State<AppState>,
    Json(request): Json<InteractionCheckRequest>,
) -> ApiResult<InteractionCheckResponse> {
    validate_drug_names(&request)?;

    let ppi = canonical_drug_name(&request.ppi);
    let other_drug = resolve_other_drug(&state, &ppi, &request).await;

    info!(ppi = %ppi, other_drug = %other_drug, "Checking interaction");

    match state.table.lookup(&ppi, &other_drug) {
        Ok(report) => {
            let risk_tier = report.risk_tier();
            Ok(Json(InteractionCheckResponse {
                ppi,
                other_drug,
                interaction: report,
                risk_tier,
                source: INTERACTION_SOURCE.to_string(),
            }))
        }
        Err(e) => {
            error!("Interaction check failed: {}", e);
            Err(internal_error(&e.to_string()))
        }
    }
}

async fn list_interactions(State(state): State<AppState>) -> Json<Vec<InteractionCatalogueEntry>> {
    let table = state.table.as_ref();

    let catalogue = table
        .ppis()
        .into_iter()
        .map(|ppi| InteractionCatalogueEntry {
            ppi: ppi.to_string(),
            drugs: table
                .drugs_for(ppi)
                .unwrap_or_default()
                .into_iter()
                .map(String::from)
                .collect(),
        })
        .collect();

    Json(catalogue)
}

async fn drug_concept(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<DrugConcept> {
    match state.rxnorm.resolve(&name).await {
        Ok(Some(concept)) => Ok(Json(concept)),
        Ok(None) => Err(not_found_error("No RxNorm concept found", &name)),
        Err(e) => {
            error!(name = %name, "RxNorm lookup failed: {}", e);
            Err(upstream_error("RxNorm lookup failed", &e.to_string()))
        }
    }
}

async fn patient_handout(Query(query): Query<HandoutQuery>) -> Result<impl IntoResponse, ApiError> {
    let ppi = canonical_drug_name(&query.ppi);
    let indication = query.indication.trim();

    if !is_supported_ppi(&ppi) {
        return Err(bad_request_error(&format!(
            "Unsupported medication '{}'. Choose one of: {}",
            query.ppi,
            SUPPORTED_PPIS.join(", ")
        )));
    }
    if !is_supported_indication(indication) {
        return Err(bad_request_error(&format!(
            "Unsupported condition '{}'. Choose one of: {}",
            query.indication,
            SUPPORTED_INDICATIONS.join(", ")
        )));
    }

    info!(ppi = %ppi, indication = %indication, "Generating patient handout");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        handout_file_name(&ppi, indication)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        generate_patient_handout(&ppi, indication),
    ))
}

async fn guidelines() -> Json<&'static [Guideline]> {
    Json(KEY_GUIDELINES)
}

async fn deprescribing() -> Json<Value> {
    Json(json!({
        "strategies": DEPRESCRIBING_STRATEGIES,
        "resources": DEPRESCRIBING_RESOURCES
    }))
}

async fn adverse_effects() -> Json<&'static [AdverseEffectGroup]> {
    Json(ADVERSE_EFFECTS)
}

async fn safety_pearls() -> Json<&'static [&'static str]> {
    Json(SAFETY_PEARLS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistants::AssistantReply;
    use crate::config::AssistantMode;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct StubAssistant {
        fail: bool,
    }

    #[async_trait]
    impl Assistant for StubAssistant {
        fn mode(&self) -> AssistantMode {
            AssistantMode::Reference
        }

        async fn answer(&self, question: &str) -> Result<AssistantReply, AssistantError> {
            if self.fail {
                return Err(AssistantError::Llm("quota exceeded".to_string()));
            }
            let content = format!(
                "On '{}': check the dose and interaction profile.\n\n[1] ACG GERD Guideline, 2022 https://journals.lww.com/ajg\n[2] FDA safety communication",
                question
            );
            Ok(AssistantReply {
                references: ppi_guidance::extract_citations(&content),
                content,
            })
        }
    }

    const CLOSED_PORT_URL: &str = "http://127.0.0.1:9";

    fn app_with(fail: bool, rxnav_url: &str, table: InteractionTable) -> (Router, AppState) {
        let state = AppState::new(
            Arc::new(StubAssistant { fail }),
            RxNormClient::new().with_base_url(rxnav_url),
            Arc::new(table),
        );
        (build_router(state.clone()), state)
    }

    fn test_app(fail: bool) -> (Router, AppState) {
        app_with(
            fail,
            CLOSED_PORT_URL,
            InteractionTable::builtin().unwrap().clone(),
        )
    }

    /// Local RxNav stand-in. Knows "plavix" (a brand whose ingredient is clopidogrel)
    /// and "cyanocobalamin (vitamin b12)" (resolving to the bare ingredient name).
    async fn spawn_rxnav() -> String {
        use std::collections::HashMap;

        async fn approximate_term(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
            let term = params.get("term").map(|t| t.to_lowercase()).unwrap_or_default();
            let rxcui = match term.as_str() {
                "plavix" => "174742",
                "cyanocobalamin (vitamin b12)" => "11248",
                _ => return Json(json!({ "approximateGroup": { "inputTerm": term } })),
            };
            Json(json!({
                "approximateGroup": {
                    "inputTerm": term,
                    "candidate": [{ "rxcui": rxcui, "score": "11", "rank": "1", "source": "RXNORM" }]
                }
            }))
        }

        async fn properties(Path(rxcui): Path<String>) -> Json<Value> {
            let (name, tty) = match rxcui.as_str() {
                "11248" => ("cyanocobalamin", "IN"),
                _ => ("Plavix", "BN"),
            };
            Json(json!({ "properties": { "rxcui": rxcui, "name": name, "tty": tty } }))
        }

        async fn related(Path(rxcui): Path<String>) -> Json<Value> {
            Json(json!({
                "relatedGroup": {
                    "rxcui": rxcui,
                    "conceptGroup": [{
                        "tty": "IN",
                        "conceptProperties": [{ "rxcui": "32968", "name": "clopidogrel", "tty": "IN" }]
                    }]
                }
            }))
        }

        let rxnav = Router::new()
            .route("/approximateTerm.json", axum::routing::get(approximate_term))
            .route("/rxcui/{rxcui}/properties.json", axum::routing::get(properties))
            .route("/rxcui/{rxcui}/related.json", axum::routing::get(related));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, rxnav).await.unwrap();
        });

        format!("http://{}", addr)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_check_documented_interaction() {
        let (app, _) = test_app(false);
        let (status, body) = send(
            app,
            post_json(
                "/interactions/check",
                json!({ "ppi": "omeprazole", "other_drug": "clopidogrel" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ppi"], "Omeprazole");
        assert_eq!(body["other_drug"], "Clopidogrel");
        assert_eq!(body["interaction"]["severity"], "Major");
        assert_eq!(body["interaction"]["score"], 9);
        assert_eq!(body["interaction"]["sources"].as_array().unwrap().len(), 2);
        assert_eq!(body["risk_tier"], "HIGH");
        assert_eq!(body["source"], INTERACTION_SOURCE);
    }

    #[tokio::test]
    async fn test_check_undocumented_and_unknown() {
        let (app, _) = test_app(false);
        let (_, body) = send(
            app.clone(),
            post_json(
                "/interactions/check",
                json!({ "ppi": "Pantoprazole", "other_drug": "metformin" }),
            ),
        )
        .await;
        assert_eq!(body["interaction"]["severity"], "None");
        assert_eq!(body["risk_tier"], "NONE");
        assert!(body["interaction"].get("sources").is_none());

        let (_, body) = send(
            app,
            post_json(
                "/interactions/check",
                json!({ "ppi": "rabeprazole", "other_drug": "warfarin" }),
            ),
        )
        .await;
        assert_eq!(body["interaction"]["severity"], "Unknown");
        assert_eq!(body["interaction"]["score"], 0);
    }

    #[tokio::test]
    async fn test_check_requires_other_drug() {
        let (app, _) = test_app(false);
        let (status, body) = send(
            app,
            post_json(
                "/interactions/check",
                json!({ "ppi": "Omeprazole", "other_drug": "  " }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("medication name"));
    }

    #[tokio::test]
    async fn test_rxnorm_failure_falls_back_to_input() {
        let (app, _) = test_app(false);
        let (status, body) = send(
            app,
            post_json(
                "/interactions/check",
                json!({ "ppi": "Omeprazole", "other_drug": "metformin", "resolve_with_rxnorm": true }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["other_drug"], "Metformin");
        assert_eq!(body["interaction"]["severity"], "None");
    }

    #[tokio::test]
    async fn test_chat_rating_and_stats() {
        let (app, state) = test_app(false);
        let (status, body) = send(
            app.clone(),
            post_json("/chat", json!({ "question": "Can PPIs be taken with clopidogrel?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "reference");
        assert_eq!(body["clinically_relevant"], true);
        let references = body["references"].as_array().unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0]["number"], "1");
        assert_eq!(references[0]["url"], "https://journals.lww.com/ajg");
        assert_eq!(references[1]["url"], Value::Null);

        let answer_id = body["answer_id"].as_str().unwrap().to_string();
        let (status, _) = send(
            app.clone(),
            post_json(&format!("/chat/{}/rating", answer_id), json!({ "rating": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.feedback.rating(&answer_id).unwrap().rating, 4);

        let (status, _) = send(
            app.clone(),
            post_json(&format!("/chat/{}/rating", answer_id), json!({ "rating": 9 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app.clone(),
            post_json("/chat/not-an-answer/rating", json!({ "rating": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, stats) = send(app, get("/stats")).await;
        assert_eq!(stats["total_queries"], 1);
        assert_eq!(stats["successful_responses"], 1);
        assert_eq!(stats["ratings"], 1);
    }

    #[tokio::test]
    async fn test_chat_failures() {
        let (app, state) = test_app(true);

        let (status, _) = send(app.clone(), post_json("/chat", json!({ "question": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(app, post_json("/chat", json!({ "question": "Dose for GERD?" }))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["details"].as_str().unwrap().contains("quota exceeded"));

        let stats = state.feedback.stats();
        assert_eq!(stats.total_queries, 1);
        assert_eq!(stats.failed_responses, 1);
    }

    #[tokio::test]
    async fn test_handout_download() {
        let (app, _) = test_app(false);
        let response = app
            .oneshot(get("/handouts?ppi=omeprazole&indication=H.%20pylori%20Infection"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Omeprazole_H._pylori_Infection_Guide.md\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("# Patient Guide: Omeprazole for H. pylori Infection"));
    }

    #[tokio::test]
    async fn test_handout_rejects_unsupported_choices() {
        let (app, _) = test_app(false);
        let (status, _) = send(app.clone(), get("/handouts?ppi=Ranitidine&indication=GERD")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, get("/handouts?ppi=Omeprazole&indication=Migraine")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_catalogue_and_reference_routes() {
        let (app, _) = test_app(false);

        let (status, catalogue) = send(app.clone(), get("/interactions")).await;
        assert_eq!(status, StatusCode::OK);
        let entries = catalogue.as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0]["ppi"], "Esomeprazole");
        assert_eq!(entries[0]["drugs"], json!(["Clopidogrel"]));

        let (_, guidelines) = send(app.clone(), get("/reference/guidelines")).await;
        assert_eq!(guidelines.as_array().unwrap().len(), KEY_GUIDELINES.len());

        let (_, deprescribing) = send(app.clone(), get("/reference/deprescribing")).await;
        assert_eq!(deprescribing["strategies"][0]["strategy"], "Dose Reduction");

        let (_, effects) = send(app.clone(), get("/reference/adverse-effects")).await;
        assert_eq!(effects[0]["system"], "Renal Effects");

        let (_, pearls) = send(app.clone(), get("/reference/safety-pearls")).await;
        assert_eq!(pearls.as_array().unwrap().len(), SAFETY_PEARLS.len());

        let (status, health) = send(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");
    }

    #[tokio::test]
    async fn test_documented_typed_name_is_kept_when_resolving() {
        let rxnav = spawn_rxnav().await;
        let (app, _) = app_with(false, &rxnav, InteractionTable::builtin().unwrap().clone());

        for resolve in [false, true] {
            let (status, body) = send(
                app.clone(),
                post_json(
                    "/interactions/check",
                    json!({
                        "ppi": "Omeprazole",
                        "other_drug": "cyanocobalamin (vitamin b12)",
                        "resolve_with_rxnorm": resolve
                    }),
                ),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["other_drug"], "Cyanocobalamin (Vitamin B12)");
            assert_eq!(body["interaction"]["severity"], "Moderate");
            assert_eq!(body["interaction"]["score"], 7);
        }
    }

    #[tokio::test]
    async fn test_brand_name_resolves_to_documented_ingredient() {
        let rxnav = spawn_rxnav().await;
        let (app, _) = app_with(false, &rxnav, InteractionTable::builtin().unwrap().clone());

        let (status, body) = send(
            app.clone(),
            post_json(
                "/interactions/check",
                json!({ "ppi": "omeprazole", "other_drug": "Plavix", "resolve_with_rxnorm": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["other_drug"], "Clopidogrel");
        assert_eq!(body["interaction"]["severity"], "Major");
        assert_eq!(body["interaction"]["score"], 9);

        let (_, body) = send(
            app,
            post_json(
                "/interactions/check",
                json!({ "ppi": "Omeprazole", "other_drug": "unknownium", "resolve_with_rxnorm": true }),
            ),
        )
        .await;
        assert_eq!(body["other_drug"], "Unknownium");
        assert_eq!(body["interaction"]["severity"], "None");
    }

    #[tokio::test]
    async fn test_drug_concept_route() {
        let rxnav = spawn_rxnav().await;
        let (app, _) = app_with(false, &rxnav, InteractionTable::builtin().unwrap().clone());

        let (status, body) = send(app.clone(), get("/drugs/plavix")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rxcui"], "174742");
        assert_eq!(body["name"], "Plavix");
        assert_eq!(body["tty"], "BN");

        let (status, body) = send(app, get("/drugs/unknownium")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["id"], "unknownium");

        let (offline, _) = test_app(false);
        let (status, _) = send(offline, get("/drugs/plavix")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_malformed_entry_is_internal_error() {
        let table = InteractionTable::from_json(
            r#"{ "Omeprazole": { "Warfarin": { "mechanism": "inhibits CYP2C19", "severity": "Moderate", "score": 7 } } }"#,
        )
        .unwrap();
        let (app, _) = app_with(false, CLOSED_PORT_URL, table);

        let (status, body) = send(
            app.clone(),
            post_json(
                "/interactions/check",
                json!({ "ppi": "Omeprazole", "other_drug": "warfarin" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Error checking interaction between Omeprazole and Warfarin")
        );

        let (status, body) = send(
            app,
            post_json(
                "/interactions/check",
                json!({ "ppi": "Omeprazole", "other_drug": "digoxin" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interaction"]["severity"], "None");
    }
}
