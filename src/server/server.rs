use bytes::Bytes;
use chrono::NaiveDateTime;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::Incoming,
    header::{HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
    service::Service,
    HeaderMap, Method, Request, Response, StatusCode, Uri,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};
use url_escape::decode;

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use crate::{
    branch::{
        locale::resolve_locale,
        model::{BranchChanges, NewBranch},
        service::{BranchService, Page},
        validation::{OpenDayRequest, WorkingHoursRequest},
    },
    config::Config,
    database::sqlite::ConnectionPool,
    error::{AppError, AppResult},
    timing::{availability::AvailabilityEvaluator, clock::Clock, weekday::Weekday},
    ISO_FORMAT,
};

use super::{
    resource::{AvailabilityResource, BranchResource},
    response::ApiResponse,
};

type HttpResponse = Response<Full<Bytes>>;

/// The Server
///
/// Handles every API endpoint. Storage work goes through `BranchService`, the
/// open/closed answer through `AvailabilityEvaluator`.
///
/// This struct implements the `Service` trait from `hyper` so each accepted
/// connection gets its own clone; all clones share the pool, config and clock.
#[derive(Clone)]
pub struct Server {
    branches: BranchService,
    evaluator: AvailabilityEvaluator,
    config: Arc<Config>,
}

impl Server {
    pub fn setup(connection_pool: Arc<ConnectionPool>, config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            branches: BranchService::new(connection_pool),
            evaluator: AvailabilityEvaluator::new(clock),
            config: Arc::new(config),
        }
    }

    /// Parses the query parameters and returns a `hashmap` of key pair values
    /// Returns `None` if the parameters are malformed
    fn parse_params(text: Option<&str>) -> Option<HashMap<String, String>> {
        let mut map: HashMap<String, String> = HashMap::new();
        let Some(text) = text else {
            return Some(map);
        };
        for pair in text.split('&').filter(|pair| !pair.is_empty()) {
            let mut iterator = pair.splitn(2, '=');
            map.insert(
                decode(iterator.next()?).to_string(),
                decode(iterator.next()?).to_string(),
            );
        }
        Some(map)
    }

    fn parse_id(text: &str) -> AppResult<i64> {
        text.parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::NotFound(format!("Branch {} not found.", text)))
    }

    fn parse_day(text: &str) -> AppResult<Weekday> {
        text.parse::<u8>()
            .ok()
            .and_then(Weekday::from_number)
            .ok_or_else(|| AppError::BadRequest("Day of week must be between 0 and 6.".to_string()))
    }

    /// An empty body reads as `{}`.
    fn parse_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
        let body = if body.is_empty() { b"{}".as_slice() } else { body };
        Ok(serde_json::from_slice(body)?)
    }

    /// Administrator check against the configured bearer token.
    fn authorize(&self, headers: &HeaderMap) -> AppResult<()> {
        let Some(expected) = self.config.admin_token.as_deref() else {
            return Err(AppError::Unauthorized);
        };
        let provided = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        if provided == Some(expected) {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// Answers one request whose body has already been read.
    pub fn handle(&self, method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> HttpResponse {
        let accept_language = headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        let locale = resolve_locale(accept_language, &self.config.default_locale);

        let response = match self.route(method, uri, headers, body, &locale) {
            Ok(response) => response,
            Err(err) => Self::error_response(err),
        };
        info!(
            %method,
            path = uri.path(),
            status = response.status().as_u16(),
            "Handled request"
        );
        response
    }

    fn route(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: &[u8],
        locale: &str,
    ) -> AppResult<HttpResponse> {
        let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
        match (method, segments.as_slice()) {
            (&Method::GET, ["api", "health"]) => {
                Self::respond(StatusCode::OK, &serde_json::json!({"status": "ok"}))
            }
            (&Method::GET, ["api", "v1", "branches"]) => self.list_branches(uri.query(), locale),
            (&Method::POST, ["api", "v1", "branches"]) => {
                self.authorize(headers)?;
                self.create_branch(body, locale)
            }
            (&Method::GET, ["api", "v1", "branches", id]) => {
                self.branch_response(Self::parse_id(id)?, locale, StatusCode::OK, None)
            }
            (&Method::PATCH, ["api", "v1", "branches", id]) => {
                self.authorize(headers)?;
                let id = Self::parse_id(id)?;
                let changes: BranchChanges = Self::parse_body(body)?;
                self.branches.update_branch(id, changes)?;
                self.branch_response(id, locale, StatusCode::OK, Some("Branch updated."))
            }
            (&Method::DELETE, ["api", "v1", "branches", id]) => {
                self.authorize(headers)?;
                self.branches.delete_branch(Self::parse_id(id)?)?;
                Self::respond(StatusCode::OK, &ApiResponse::message("Branch deleted."))
            }
            (&Method::POST, ["api", "v1", "branches", id, "activate"]) => {
                self.authorize(headers)?;
                let id = Self::parse_id(id)?;
                self.branches.activate_branch(id)?;
                self.branch_response(id, locale, StatusCode::OK, Some("Branch activated."))
            }
            (&Method::POST, ["api", "v1", "branches", id, "deactivate"]) => {
                self.authorize(headers)?;
                let id = Self::parse_id(id)?;
                self.branches.deactivate_branch(id)?;
                self.branch_response(id, locale, StatusCode::OK, Some("Branch deactivated."))
            }
            (&Method::GET, ["api", "v1", "branches", id, "working-hours"]) => {
                let (_, schedule) = self.branches.branch_with_schedule(Self::parse_id(id)?)?;
                Self::respond(StatusCode::OK, &ApiResponse::success(schedule))
            }
            (&Method::PUT, ["api", "v1", "branches", id, "working-hours"]) => {
                self.authorize(headers)?;
                let id = Self::parse_id(id)?;
                let request: WorkingHoursRequest = Self::parse_body(body)?;
                let schedule = self.branches.set_working_hours(id, &request.data)?;
                Self::respond(
                    StatusCode::OK,
                    &ApiResponse::success(schedule).with_message("Working hours updated."),
                )
            }
            (&Method::POST, ["api", "v1", "branches", id, "working-hours", day, "open"]) => {
                self.authorize(headers)?;
                let id = Self::parse_id(id)?;
                let weekday = Self::parse_day(day)?;
                let request: OpenDayRequest = Self::parse_body(body)?;
                let schedule = self.branches.open_day(id, weekday, &request)?;
                Self::respond(
                    StatusCode::OK,
                    &ApiResponse::success(schedule).with_message("Day opened."),
                )
            }
            (&Method::POST, ["api", "v1", "branches", id, "working-hours", day, "close"]) => {
                self.authorize(headers)?;
                let id = Self::parse_id(id)?;
                let weekday = Self::parse_day(day)?;
                let schedule = self.branches.close_day(id, weekday)?;
                Self::respond(
                    StatusCode::OK,
                    &ApiResponse::success(schedule).with_message("Day closed."),
                )
            }
            (&Method::GET, ["api", "v1", "branches", id, "availability"]) => {
                self.availability(Self::parse_id(id)?, uri.query())
            }
            _ => Err(AppError::NotFound("Route not found.".to_string())),
        }
    }

    /// The /api/v1/branches endpoint.
    ///
    /// Active branches only, paginated with `page` and `per_page`. Every entry
    /// is evaluated against the same instant.
    fn list_branches(&self, query: Option<&str>, locale: &str) -> AppResult<HttpResponse> {
        let params = Self::parse_params(query)
            .ok_or_else(|| AppError::BadRequest("Malformed Parameters.".to_string()))?;
        let page = Page::resolve(
            params.get("page").map(String::as_str),
            params.get("per_page").map(String::as_str),
        );

        let now = self.evaluator.now();
        let data: Vec<BranchResource> = self
            .branches
            .active_branches(page)?
            .iter()
            .map(|(branch, schedule)| {
                BranchResource::new(branch, locale, AvailabilityEvaluator::is_open_at(schedule, now))
            })
            .collect();
        Self::respond(StatusCode::OK, &ApiResponse::success(data))
    }

    /// POST /api/v1/branches. A new branch has no hours yet, so it starts closed.
    fn create_branch(&self, body: &[u8], locale: &str) -> AppResult<HttpResponse> {
        let new_branch: NewBranch = Self::parse_body(body)?;
        let branch = self.branches.create_branch(new_branch, self.evaluator.now())?;
        Self::respond(
            StatusCode::CREATED,
            &ApiResponse::success(BranchResource::new(&branch, locale, false))
                .with_message("Branch created."),
        )
    }

    /// A single branch with `is_open_now` evaluated against the server clock.
    /// Inactive branches are still shown.
    fn branch_response(
        &self,
        id: i64,
        locale: &str,
        status: StatusCode,
        message: Option<&str>,
    ) -> AppResult<HttpResponse> {
        let (branch, schedule) = self.branches.branch_with_schedule(id)?;
        let resource = BranchResource::new(&branch, locale, self.evaluator.is_open_now(&schedule));
        let mut body = ApiResponse::success(resource);
        if let Some(message) = message {
            body = body.with_message(message);
        }
        Self::respond(status, &body)
    }

    /// The /api/v1/branches/{id}/availability endpoint.
    ///
    /// Takes an optional `at` (`YYYY-MM-DDTHH:MM:SS`, local to the configured
    /// zone); without it the current time is used.
    fn availability(&self, id: i64, query: Option<&str>) -> AppResult<HttpResponse> {
        let params = Self::parse_params(query)
            .ok_or_else(|| AppError::BadRequest("Malformed Parameters.".to_string()))?;
        let at = match params.get("at") {
            Some(text) => NaiveDateTime::parse_from_str(text, ISO_FORMAT)
                .map_err(|_| AppError::BadRequest("Malformed Date".to_string()))?,
            None => self.evaluator.now(),
        };

        let (_, schedule) = self.branches.branch_with_schedule(id)?;
        let is_open = AvailabilityEvaluator::is_open_at(&schedule, at);
        Self::respond(
            StatusCode::OK,
            &ApiResponse::success(AvailabilityResource::new(id, at, is_open)),
        )
    }

    fn build(status: StatusCode, data: Vec<u8>) -> HttpResponse {
        let mut response = Response::new(Full::new(Bytes::from(data)));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    /// Serialize `body` into a JSON response with the given status.
    fn respond<T: Serialize>(status: StatusCode, body: &T) -> AppResult<HttpResponse> {
        let data = serde_json::to_vec(body)?;
        Ok(Self::build(status, data))
    }

    fn error_response(err: AppError) -> HttpResponse {
        let (status, body) = match err {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, ApiResponse::error(&message, None)),
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ApiResponse::error(&message, None))
            }
            AppError::Json(err) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::error(&format!("Malformed JSON body: {}", err), None),
            ),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::error("The given data was invalid.", Some(errors)),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::error("Unauthenticated.", None),
            ),
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("Server error.", None),
                )
            }
        };
        match serde_json::to_vec(&body) {
            Ok(data) => Self::build(status, data),
            Err(_) => Self::build(
                StatusCode::INTERNAL_SERVER_ERROR,
                b"{\"success\":false}".to_vec(),
            ),
        }
    }
}

impl Service<Request<Incoming>> for Server {
    type Response = HttpResponse;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let server = self.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes();
            Ok(server.handle(&parts.method, &parts.uri, &parts.headers, &body))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use hyper::header::HeaderName;
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        branch::model::Translations, database::sqlite::SqliteDatabase, timing::clock::FixedClock,
    };

    const ADMIN: (&str, &str) = ("authorization", "Bearer secret");

    // 2026-02-05 is a Thursday.
    fn thursday_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 5)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn server_at(now: NaiveDateTime) -> Server {
        let config = Config {
            admin_token: Some("secret".to_string()),
            ..Config::default()
        };
        Server::setup(
            Arc::new(SqliteDatabase::open_memory_pool()),
            config,
            Arc::new(FixedClock(now)),
        )
    }

    fn add_branch(server: &Server, is_active: bool) -> i64 {
        let branch = NewBranch {
            name: Translations::new()
                .with("ar", "فرع الرياض")
                .with("en", "Riyadh Branch"),
            address: Translations::new().with("ar", "الرياض").with("en", "Riyadh"),
            description: Translations::new().with("en", "Head office"),
            is_active,
        };
        server
            .branches
            .create_branch(branch, thursday_at(8, 0))
            .unwrap()
            .id
    }

    async fn call(
        server: &Server,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> (StatusCode, Value) {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            header_map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        let uri: Uri = path.parse().unwrap();
        let response = server.handle(&method, &uri, &header_map, body.as_bytes());
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn set_hours(server: &Server, id: i64, data: Value) -> (StatusCode, Value) {
        call(
            server,
            Method::PUT,
            &format!("/api/v1/branches/{}/working-hours", id),
            &[ADMIN],
            &json!({ "data": data }).to_string(),
        )
        .await
    }

    #[tokio::test]
    async fn health_check() {
        let server = server_at(thursday_at(12, 0));
        let (status, body) = call(&server, Method::GET, "/api/health", &[], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn lists_only_active_branches() {
        let server = server_at(thursday_at(12, 0));
        add_branch(&server, false);
        let (status, body) = call(&server, Method::GET, "/api/v1/branches", &[], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 0);

        add_branch(&server, true);
        let (_, body) = call(&server, Method::GET, "/api/v1/branches", &[], "").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pagination_defaults_and_caps() {
        let server = server_at(thursday_at(12, 0));
        for _ in 0..20 {
            add_branch(&server, true);
        }

        let count = |body: &Value| body["data"].as_array().unwrap().len();
        let (_, body) = call(&server, Method::GET, "/api/v1/branches", &[], "").await;
        assert_eq!(count(&body), 15);
        let (_, body) = call(&server, Method::GET, "/api/v1/branches?per_page=10", &[], "").await;
        assert_eq!(count(&body), 10);
        let (_, body) = call(&server, Method::GET, "/api/v1/branches?per_page=500", &[], "").await;
        assert_eq!(count(&body), 20);
        let (_, body) = call(&server, Method::GET, "/api/v1/branches?page=2", &[], "").await;
        assert_eq!(count(&body), 5);
    }

    #[tokio::test]
    async fn texts_follow_accept_language() {
        let server = server_at(thursday_at(12, 0));
        let id = add_branch(&server, true);
        let path = format!("/api/v1/branches/{}", id);

        let (_, body) = call(&server, Method::GET, &path, &[("accept-language", "ar-SA")], "").await;
        assert_eq!(body["data"]["name"], "فرع الرياض");
        assert_eq!(body["data"]["address"], "الرياض");

        let (_, body) = call(&server, Method::GET, &path, &[("accept-language", "en")], "").await;
        assert_eq!(body["data"]["name"], "Riyadh Branch");

        let (_, body) = call(&server, Method::GET, &path, &[("accept-language", "fr")], "").await;
        assert_eq!(body["data"]["name"], "Riyadh Branch");
        assert_eq!(body["data"]["description"], "Head office");
    }

    #[tokio::test]
    async fn show_returns_resource_shape_and_404() {
        let server = server_at(thursday_at(12, 0));
        let id = add_branch(&server, false);

        let (status, body) =
            call(&server, Method::GET, &format!("/api/v1/branches/{}", id), &[], "").await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_object().unwrap();
        for key in ["id", "name", "address", "description", "is_active", "is_open_now", "created_at"] {
            assert!(data.contains_key(key), "missing {}", key);
        }
        assert_eq!(body["data"]["is_active"], false);
        assert_eq!(body["data"]["created_at"], "2026-02-05T08:00:00");

        let (status, body) = call(&server, Method::GET, "/api/v1/branches/999999", &[], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = call(&server, Method::GET, "/api/v1/branches/abc", &[], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn is_open_now_uses_server_clock() {
        let server = server_at(thursday_at(12, 0));
        let open = add_branch(&server, true);
        let closed = add_branch(&server, true);
        let unscheduled = add_branch(&server, true);
        set_hours(
            &server,
            open,
            json!([{"day_of_week": 4, "opens_at": "09:00:00", "closes_at": "18:00:00", "is_closed": false}]),
        )
        .await;
        set_hours(
            &server,
            closed,
            json!([{"day_of_week": 4, "opens_at": null, "closes_at": null, "is_closed": true}]),
        )
        .await;

        for (id, expected) in [(open, true), (closed, false), (unscheduled, false)] {
            let (_, body) =
                call(&server, Method::GET, &format!("/api/v1/branches/{}", id), &[], "").await;
            assert_eq!(body["data"]["is_open_now"], expected, "branch {}", id);
        }

        let (_, body) = call(&server, Method::GET, "/api/v1/branches", &[], "").await;
        let flags: Vec<bool> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|branch| branch["is_open_now"].as_bool().unwrap())
            .collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[tokio::test]
    async fn overnight_hours_at_late_night() {
        let server = server_at(thursday_at(23, 0));
        let id = add_branch(&server, true);
        set_hours(
            &server,
            id,
            json!([{"day_of_week": 4, "opens_at": "22:00:00", "closes_at": "02:00:00", "is_closed": false}]),
        )
        .await;

        let (_, body) = call(&server, Method::GET, &format!("/api/v1/branches/{}", id), &[], "").await;
        assert_eq!(body["data"]["is_open_now"], true);
    }

    #[tokio::test]
    async fn availability_at_given_instant() {
        let server = server_at(thursday_at(20, 0));
        let id = add_branch(&server, true);
        set_hours(
            &server,
            id,
            json!([{"day_of_week": 4, "opens_at": "09:00:00", "closes_at": "18:00:00", "is_closed": false}]),
        )
        .await;
        let path = |at: &str| format!("/api/v1/branches/{}/availability{}", id, at);

        let (_, body) = call(&server, Method::GET, &path("?at=2026-02-05T10:00:00"), &[], "").await;
        assert_eq!(body["data"], json!({"branch_id": id, "at": "2026-02-05T10:00:00", "is_open": true}));

        let (_, body) = call(&server, Method::GET, &path("?at=2026-02-05T09:00:00"), &[], "").await;
        assert_eq!(body["data"]["is_open"], false);

        let (_, body) = call(&server, Method::GET, &path(""), &[], "").await;
        assert_eq!(body["data"]["at"], "2026-02-05T20:00:00");
        assert_eq!(body["data"]["is_open"], false);

        let (status, _) = call(&server, Method::GET, &path("?at=tomorrow"), &[], "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn writes_require_admin_token() {
        let server = server_at(thursday_at(12, 0));
        let body = r#"{"name": {"en": "North"}}"#;

        let (status, _) = call(&server, Method::POST, "/api/v1/branches", &[], body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = call(
            &server,
            Method::POST,
            "/api/v1/branches",
            &[("authorization", "Bearer wrong")],
            body,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, created) = call(&server, Method::POST, "/api/v1/branches", &[ADMIN], body).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["name"], "North");
        assert_eq!(created["data"]["is_open_now"], false);
    }

    #[tokio::test]
    async fn update_deactivate_and_delete() {
        let server = server_at(thursday_at(12, 0));
        let id = add_branch(&server, true);
        let path = format!("/api/v1/branches/{}", id);

        let (status, body) = call(
            &server,
            Method::PATCH,
            &path,
            &[ADMIN, ("accept-language", "en")],
            r#"{"name": {"en": "Renamed"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Renamed");

        let (_, body) =
            call(&server, Method::POST, &format!("{}/deactivate", path), &[ADMIN], "").await;
        assert_eq!(body["data"]["is_active"], false);
        let (_, body) =
            call(&server, Method::POST, &format!("{}/activate", path), &[ADMIN], "").await;
        assert_eq!(body["data"]["is_active"], true);

        let (status, _) = call(&server, Method::DELETE, &path, &[ADMIN], "").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&server, Method::GET, &path, &[], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn working_hours_validation_errors() {
        let server = server_at(thursday_at(12, 0));
        let id = add_branch(&server, true);

        let (status, body) = set_hours(
            &server,
            id,
            json!([
                {"day_of_week": 1, "opens_at": null, "closes_at": "18:00:00", "is_closed": false},
                {"day_of_week": 2, "opens_at": "09:00:00", "closes_at": null, "is_closed": true},
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["errors"]["data.0.opens_at"][0],
            "Opening time is required when the day is not closed."
        );
        assert_eq!(
            body["errors"]["data.1.opens_at"][0],
            "Opening time must be null when the day is marked as closed."
        );

        let (status, _) = call(
            &server,
            Method::PUT,
            &format!("/api/v1/branches/{}/working-hours", id),
            &[ADMIN],
            "{ nope",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mistyped_working_hours_fields_are_422() {
        let server = server_at(thursday_at(12, 0));
        let id = add_branch(&server, true);

        let (status, body) = set_hours(
            &server,
            id,
            json!([
                {"day_of_week": 1, "opens_at": "09:00:00", "closes_at": "18:00:00"},
                {"day_of_week": "x", "is_closed": "yes"},
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["data.0.is_closed"][0], "The is closed field is required.");
        assert_eq!(
            body["errors"]["data.1.day_of_week"][0],
            "The day of week must be an integer."
        );
        assert_eq!(
            body["errors"]["data.1.is_closed"][0],
            "The is closed field must be true or false."
        );

        let (status, body) = set_hours(
            &server,
            id,
            json!([
                {"day_of_week": "4", "opens_at": "09:00:00", "closes_at": "18:00:00", "is_closed": 0},
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["day_of_week"], 4);
        assert_eq!(body["data"][0]["is_closed"], false);
    }

    #[tokio::test]
    async fn open_and_close_single_day() {
        let server = server_at(thursday_at(12, 0));
        let id = add_branch(&server, true);
        let base = format!("/api/v1/branches/{}/working-hours", id);

        let (status, body) = call(
            &server,
            Method::POST,
            &format!("{}/4/open", base),
            &[ADMIN],
            r#"{"opens_at": "11:00:00", "closes_at": "13:00:00"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!([{"day_of_week": 4, "opens_at": "11:00:00", "closes_at": "13:00:00", "is_closed": false}])
        );
        let (_, body) = call(&server, Method::GET, &format!("/api/v1/branches/{}", id), &[], "").await;
        assert_eq!(body["data"]["is_open_now"], true);

        let (status, _) = call(&server, Method::POST, &format!("{}/4/close", base), &[ADMIN], "").await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&server, Method::GET, &base, &[], "").await;
        assert_eq!(body["data"][0]["is_closed"], true);
        assert_eq!(body["data"][0]["opens_at"], Value::Null);

        let (status, _) = call(&server, Method::POST, &format!("{}/9/close", base), &[ADMIN], "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(
            &server,
            Method::POST,
            &format!("{}/4/open", base),
            &[ADMIN],
            r#"{"opens_at": "11:00:00", "closes_at": "11:00:00"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let server = server_at(thursday_at(12, 0));
        let (status, body) = call(&server, Method::GET, "/api/v2/branches", &[], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[test]
    fn query_parameters() {
        let params = Server::parse_params(Some("page=2&per_page=10&at=2026-02-05T10%3A00%3A00")).unwrap();
        assert_eq!(params["page"], "2");
        assert_eq!(params["at"], "2026-02-05T10:00:00");
        assert!(Server::parse_params(None).unwrap().is_empty());
        assert!(Server::parse_params(Some("page")).is_none());
    }
}
