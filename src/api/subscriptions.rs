//! Subscription endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::subscription::format_month;
use crate::domain::{Subscription, SubscriptionId};
use crate::infrastructure::subscription::{CreateSubscriptionRequest, TotalCostRequest};

/// Create the `/subscriptions` router
pub fn create_subscriptions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subscriptions).post(create_subscription))
        .route("/total", get(total_cost))
        .route("/{id}", get(get_subscription).delete(delete_subscription))
}

/// Request body for creating a subscription
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionApiRequest {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    /// `MM-YYYY`
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Subscription as returned by the API, dates in `MM-YYYY`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: SubscriptionId,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id(),
            service_name: subscription.service_name().to_string(),
            price: subscription.price(),
            user_id: subscription.user_id(),
            start_date: format_month(subscription.start_date()),
            end_date: subscription.end_date().map(format_month),
            created_at: subscription.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSubscriptionsResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSubscriptionsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TotalCostQuery {
    pub user: Option<String>,
    pub service: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalCostResponse {
    pub total: i64,
}

/// POST /subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionApiRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    debug!(service = %request.service_name, user_id = %request.user_id, "Creating subscription");

    let service_request = CreateSubscriptionRequest {
        service_name: request.service_name,
        price: request.price,
        user_id: request.user_id,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    let subscription = state
        .subscription_service
        .create(service_request)
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from(&subscription)),
    ))
}

/// GET /subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<ListSubscriptionsQuery>,
) -> Result<Json<ListSubscriptionsResponse>, ApiError> {
    let user_id = query.user_id.as_deref().filter(|u| !u.is_empty());

    let subscriptions = state
        .subscription_service
        .list(user_id)
        .await
        .map_err(|e| ApiError::from(e).with_param("user_id"))?;

    let subscriptions: Vec<SubscriptionResponse> =
        subscriptions.iter().map(SubscriptionResponse::from).collect();
    let count = subscriptions.len();

    Ok(Json(ListSubscriptionsResponse {
        subscriptions,
        count,
    }))
}

/// GET /subscriptions/{id}
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let id = parse_id(&id)?;

    let subscription = state
        .subscription_service
        .get(id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Subscription '{}' not found", id)))?;

    Ok(Json(SubscriptionResponse::from(&subscription)))
}

/// DELETE /subscriptions/{id}
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    debug!(id = %id, "Deleting subscription");

    state
        .subscription_service
        .delete(id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /subscriptions/total
pub async fn total_cost(
    State(state): State<AppState>,
    Query(query): Query<TotalCostQuery>,
) -> Result<Json<TotalCostResponse>, ApiError> {
    let user_id = required(query.user, "user")?;
    let start = required(query.start, "start")?;
    let end = required(query.end, "end")?;

    let total = state
        .subscription_service
        .total_cost(TotalCostRequest {
            user_id,
            service_name: query.service,
            start,
            end,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Json(TotalCostResponse { total }))
}

fn parse_id(value: &str) -> Result<SubscriptionId, ApiError> {
    value
        .parse::<i64>()
        .map(SubscriptionId::new)
        .map_err(|_| {
            ApiError::bad_request(format!("Invalid subscription id '{}'", value)).with_param("id")
        })
}

fn required(value: Option<String>, param: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::missing_param(param))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use super::*;
    use crate::api::router::create_router_with_state;
    use crate::domain::EffectiveEndPolicy;
    use crate::infrastructure::subscription::{InMemorySubscriptionRepository, SubscriptionService};

    const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

    fn app() -> Router {
        app_with_policy(EffectiveEndPolicy::Clamped)
    }

    fn app_with_policy(policy: EffectiveEndPolicy) -> Router {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let service = SubscriptionService::with_policy(repo, policy);
        create_router_with_state(AppState::new(Arc::new(service)), None)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/subscriptions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn create(
        app: &Router,
        service: &str,
        price: i64,
        start: &str,
        end: Option<&str>,
    ) -> SubscriptionResponse {
        let mut body = serde_json::json!({
            "service_name": service,
            "price": price,
            "user_id": USER,
            "start_date": start,
        });
        if let Some(end) = end {
            body["end_date"] = serde_json::json!(end);
        }

        let (status, body) = send(app, post(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        parse(&body)
    }

    async fn total(app: &Router, query: &str) -> i64 {
        let (status, body) = send(app, get(&format!("/subscriptions/total?{}", query))).await;
        assert_eq!(status, StatusCode::OK);
        parse::<TotalCostResponse>(&body).total
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let app = app();
        let created = create(&app, "Yandex Plus", 400, "07-2025", None).await;

        assert_eq!(created.start_date, "07-2025");
        assert!(created.end_date.is_none());

        let (status, body) = send(&app, get(&format!("/subscriptions/{}", created.id))).await;
        assert_eq!(status, StatusCode::OK);

        let fetched: SubscriptionResponse = parse(&body);
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.service_name, "Yandex Plus");
    }

    #[tokio::test]
    async fn test_open_ended_omits_end_date() {
        let app = app();
        create(&app, "Netflix", 100, "01-2024", None).await;

        let (_, body) = send(&app, get("/subscriptions")).await;
        let json: serde_json::Value = parse(&body);

        assert_eq!(json["count"], 1);
        assert!(json["subscriptions"][0].get("end_date").is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_month() {
        let app = app();
        let body = serde_json::json!({
            "service_name": "Netflix",
            "price": 100,
            "user_id": USER,
            "start_date": "2024-01",
        });

        let (status, body) = send(&app, post(body)).await;
        let json: serde_json::Value = parse(&body);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "invalid_date_format");
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/subscriptions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"service_name\":"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        let json: serde_json::Value = parse(&body);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let app = app();
        let created = create(&app, "Spotify", 169, "02-2024", Some("04-2024")).await;
        let uri = format!("/subscriptions/{}", created.id);

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .body(Body::empty())
                .unwrap()
        };

        let (status, _) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let (status, body) = send(&app(), get("/subscriptions/abc")).await;
        let json: serde_json::Value = parse(&body);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["param"], "id");
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let app = app();
        create(&app, "Netflix", 100, "01-2024", None).await;

        let other = Uuid::new_v4();
        let (status, _) = send(
            &app,
            post(serde_json::json!({
                "service_name": "Netflix",
                "price": 100,
                "user_id": other.to_string(),
                "start_date": "01-2024",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, get(&format!("/subscriptions?user_id={}", USER))).await;
        let list: ListSubscriptionsResponse = parse(&body);

        assert_eq!(list.count, 1);
        assert_eq!(list.subscriptions[0].user_id.to_string(), USER);

        let (_, body) = send(&app, get("/subscriptions")).await;
        assert_eq!(parse::<ListSubscriptionsResponse>(&body).count, 2);
    }

    #[tokio::test]
    async fn test_total_inclusive_months() {
        let app = app();
        create(&app, "Netflix", 100, "01-2024", Some("03-2024")).await;

        let query = format!("user={}&start=01-2024&end=03-2024", USER);
        assert_eq!(total(&app, &query).await, 300);
    }

    #[tokio::test]
    async fn test_total_open_ended() {
        let app = app();
        create(&app, "Netflix", 50, "01-2024", None).await;

        let query = format!("user={}&start=01-2024&end=06-2024", USER);
        assert_eq!(total(&app, &query).await, 300);
    }

    #[tokio::test]
    async fn test_total_no_overlap_and_empty_user() {
        let app = app();
        create(&app, "Netflix", 100, "01-2024", Some("02-2024")).await;

        let query = format!("user={}&start=06-2024&end=07-2024", USER);
        assert_eq!(total(&app, &query).await, 0);

        let query = format!("user={}&start=01-2024&end=12-2024", Uuid::new_v4());
        assert_eq!(total(&app, &query).await, 0);
    }

    #[tokio::test]
    async fn test_total_filter_and_sum() {
        let app = app();
        create(&app, "Netflix", 100, "01-2024", Some("03-2024")).await;
        create(&app, "Spotify", 50, "02-2024", None).await;

        let all = format!("user={}&start=01-2024&end=03-2024", USER);
        assert_eq!(total(&app, &all).await, 300 + 100);

        let spotify = format!("user={}&service=Spotify&start=01-2024&end=03-2024", USER);
        assert_eq!(total(&app, &spotify).await, 100);

        let empty_service = format!("user={}&service=&start=01-2024&end=03-2024", USER);
        assert_eq!(total(&app, &empty_service).await, 400);
    }

    #[tokio::test]
    async fn test_total_policy_past_window_end() {
        let query = format!("user={}&start=01-2024&end=03-2024", USER);

        let clamped = app_with_policy(EffectiveEndPolicy::Clamped);
        create(&clamped, "Netflix", 100, "01-2024", Some("12-2024")).await;
        assert_eq!(total(&clamped, &query).await, 300);

        let uncapped = app_with_policy(EffectiveEndPolicy::Uncapped);
        create(&uncapped, "Netflix", 100, "01-2024", Some("12-2024")).await;
        assert_eq!(total(&uncapped, &query).await, 1200);
    }

    #[tokio::test]
    async fn test_total_errors() {
        let app = app();

        let (status, body) = send(&app, get("/subscriptions/total?start=01-2024&end=02-2024")).await;
        let json: serde_json::Value = parse(&body);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["param"], "user");

        let uri = format!("/subscriptions/total?user={}&start=13-2024&end=02-2025", USER);
        let (status, body) = send(&app, get(&uri)).await;
        let json: serde_json::Value = parse(&body);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "invalid_date_format");

        let uri = format!("/subscriptions/total?user={}&start=06-2024&end=01-2024", USER);
        let (status, _) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = "/subscriptions/total?user=not-a-uuid&start=01-2024&end=02-2024";
        let (status, _) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
