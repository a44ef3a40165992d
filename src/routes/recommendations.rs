use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;
use crate::config::RecommendationSettings;
use crate::core::{distance_meters, RecommendError, RecommendationPipeline};
use crate::models::{
    Coordinate, ErrorResponse, HealthResponse, Locale, Reason, RecommendRequest, Recommendation,
    RecommendationQuery, RecommendationView, RecommendationsResponse,
};
use crate::services::{reason_text, PostgresClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: RecommendationPipeline,
    pub postgres: Option<Arc<PostgresClient>>,
    pub settings: RecommendationSettings,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::get().to(recommend));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = match &state.postgres {
        Some(postgres) => postgres.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommendations endpoint
///
/// GET /api/v1/recommendations?location=19.04365,-98.197968&radius=800&access-token=...
///
/// `radius` falls back to the configured default; `access-token` is optional
/// and enables SELF and SOCIAL recommendations. Reason text follows the
/// `Accept-Language` header.
async fn recommend(
    state: web::Data<AppState>,
    query: web::Query<RecommendRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let span = tracing::info_span!("recommend", request_id = %uuid::Uuid::new_v4());
    handle_recommend(state, query.into_inner(), http_req)
        .instrument(span)
        .await
}

async fn handle_recommend(
    state: web::Data<AppState>,
    req: RecommendRequest,
    http_req: HttpRequest,
) -> HttpResponse {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendations request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let center: Coordinate = match req.location.parse() {
        Ok(center) => center,
        Err(e) => {
            tracing::info!("Rejected location {:?}: {}", req.location, e);
            return bad_request("location.format.error", e.to_string());
        }
    };

    let locale = http_req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(Locale::from_language_tag)
        .unwrap_or_default();

    let radius_m = state.settings.effective_radius(req.radius);
    let query = RecommendationQuery::new(center, radius_m, req.access_token, locale);

    tracing::info!(
        "Recommending around {} within {}m ({})",
        center,
        radius_m,
        if query.access_token.is_some() { "personalized" } else { "anonymous" }
    );

    match state.pipeline.recommend(&query).await {
        Ok(recommendations) => {
            let views: Vec<RecommendationView> = recommendations
                .into_iter()
                .map(|r| to_view(r, center, locale))
                .collect();

            HttpResponse::Ok().json(RecommendationsResponse {
                total: views.len(),
                recommendations: views,
            })
        }
        Err(e @ RecommendError::InvalidUser) => HttpResponse::Unauthorized().json(ErrorResponse {
            error: e.key().to_string(),
            message: e.to_string(),
            status_code: 401,
        }),
        Err(e) => {
            tracing::error!("Failed to build recommendations: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.key().to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// Attach reason text and distance for the client
pub fn to_view(recommendation: Recommendation, center: Coordinate, locale: Locale) -> RecommendationView {
    let reason = reason_text(&recommendation.reason, locale);
    let kind = recommendation.kind();
    let distance_meters = distance_meters(center, recommendation.poi.location);

    let (category, friend) = match recommendation.reason {
        Reason::Global => (None, None),
        Reason::SelfLiked { category } => (Some(category), None),
        Reason::Social { friend, category } => (Some(category), Some(friend)),
    };

    RecommendationView {
        poi: recommendation.poi,
        kind,
        category,
        friend,
        reason,
        distance_meters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Poi, RecommendationType};
    use crate::services::InMemorySource;
    use actix_web::{http::StatusCode, test, App};

    fn state() -> AppState {
        let source = InMemorySource::new()
            .with_poi(
                Poi::new("t1", "Taquería Los Ángeles", Coordinate::new(19.04336700060403, -98.19716334342957).unwrap())
                    .with_rating(8.7)
                    .with_categories([Category::new("4bf58dd8d48988d151941735", "Taco Place", "")]),
            )
            .with_user("u1", "Daniel", None)
            .with_credential("tok-1", "u1")
            .with_like("u1", "4bf58dd8d48988d151941735");

        AppState {
            pipeline: RecommendationPipeline::new(Arc::new(source)),
            postgres: None,
            settings: RecommendationSettings::default(),
        }
    }

    #[::core::prelude::v1::test]
    fn test_view_carries_reason_fields() {
        let recommendation = Recommendation {
            poi: Poi::new("p", "Café", Coordinate::new(19.0, -98.0).unwrap()),
            reason: Reason::Social {
                friend: "Ana".to_string(),
                category: "Café".to_string(),
            },
        };

        let view = to_view(recommendation, Coordinate::new(19.0, -98.0).unwrap(), Locale::Es);
        assert_eq!(view.kind, RecommendationType::Social);
        assert_eq!(view.friend.as_deref(), Some("Ana"));
        assert_eq!(view.reason, "Porque a Ana le gusta Café");
        assert_eq!(view.distance_meters, 0.0);
    }

    #[actix_web::test]
    async fn test_recommend_endpoint_status_codes() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let ok = test::TestRequest::get()
            .uri("/recommendations?location=19.04365,-98.197968&radius=800&access-token=tok-1")
            .to_request();
        let body: RecommendationsResponse = test::call_and_read_body_json(&app, ok).await;
        assert_eq!(body.total, 1);
        assert_eq!(body.recommendations[0].kind, RecommendationType::SelfLiked);
        assert_eq!(body.recommendations[0].category.as_deref(), Some("Taco Place"));

        let unauthorized = test::TestRequest::get()
            .uri("/recommendations?location=19.04365,-98.197968&radius=800&access-token=unknown")
            .to_request();
        assert_eq!(test::call_service(&app, unauthorized).await.status(), StatusCode::UNAUTHORIZED);

        let bad_location = test::TestRequest::get()
            .uri("/recommendations?location=200,0&radius=800")
            .to_request();
        assert_eq!(test::call_service(&app, bad_location).await.status(), StatusCode::BAD_REQUEST);

        let bad_radius = test::TestRequest::get()
            .uri("/recommendations?location=19.04365,-98.197968&radius=0")
            .to_request();
        assert_eq!(test::call_service(&app, bad_radius).await.status(), StatusCode::BAD_REQUEST);
    }
}
