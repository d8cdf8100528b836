//! JSON HTTP API in front of the game loop
//!
//! Routes:
//! - `POST /api/start` with an optional `{"player_id": ...}` body
//! - `POST /api/answer` with `{"player_id": ..., "answer": true|false}`
//! - `GET /api/status?player_id=...`
//! - `GET /api/leaderboard`
//! - `GET /api/health`
//!
//! Input validation happens here; the game loop only ever sees well-formed
//! requests.

use crate::network::{GameHandle, ServerError};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use shared::{AnswerRequest, StartReply, StartRequest, StatusReply};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub player_id: Option<String>,
}

/// All API routes with JSON error bodies for rejected requests
pub fn routes(
    handle: GameHandle,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let start = warp::path!("api" / "start")
        .and(warp::post())
        .and(optional_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_handle(handle.clone()))
        .then(start_game);

    let answer = warp::path!("api" / "answer")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_handle(handle.clone()))
        .then(submit_answer);

    let status = warp::path!("api" / "status")
        .and(warp::get())
        .and(warp::query::<StatusQuery>())
        .and(with_handle(handle.clone()))
        .then(get_status);

    let leaderboard = warp::path!("api" / "leaderboard")
        .and(warp::get())
        .and(with_handle(handle.clone()))
        .then(get_leaderboard);

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and(with_handle(handle))
        .then(get_health);

    start
        .or(answer)
        .or(status)
        .or(leaderboard)
        .or(health)
        .recover(handle_rejection)
}

/// Binds the API to `addr`. The returned future serves requests until
/// `shutdown` completes.
pub fn bind(
    addr: SocketAddr,
    handle: GameHandle,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = ()>), warp::Error> {
    warp::serve(routes(handle)).try_bind_with_graceful_shutdown(addr, shutdown)
}

#[derive(Debug)]
struct BodyTooLarge;

impl warp::reject::Reject for BodyTooLarge {}

/// Like `warp::body::content_length_limit`, but a request without a
/// `Content-Length` header passes through.
fn optional_length_limit(limit: u64) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(move |length: Option<u64>| async move {
            match length {
                Some(length) if length > limit => Err(warp::reject::custom(BodyTooLarge)),
                _ => Ok(()),
            }
        })
        .untuple_one()
}

fn with_handle(
    handle: GameHandle,
) -> impl Filter<Extract = (GameHandle,), Error = Infallible> + Clone {
    warp::any().map(move || handle.clone())
}

async fn start_game(body: Bytes, handle: GameHandle) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        match serde_json::from_slice::<StartRequest>(&body) {
            Ok(request) => request,
            Err(err) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid request body: {}", err),
                )
            }
        }
    };

    match handle.start(request.player_id).await {
        Ok(reply) => {
            if let StartReply::Success { player_id, .. } = &reply {
                info!("Game started for player: {}", player_id);
            }
            json_response(StatusCode::OK, &reply)
        }
        Err(err) => internal_error("start", err),
    }
}

async fn submit_answer(request: AnswerRequest, handle: GameHandle) -> Response {
    let player_id = request.player_id.filter(|id| !id.is_empty());
    let (Some(player_id), Some(answer)) = (player_id, request.answer) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "player_id and answer are required".to_string(),
        );
    };

    match handle.answer(player_id, answer).await {
        Ok(reply) => json_response(StatusCode::OK, &reply),
        Err(err) => internal_error("answer", err),
    }
}

async fn get_status(query: StatusQuery, handle: GameHandle) -> Response {
    let Some(player_id) = query.player_id.filter(|id| !id.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "player_id is required".to_string());
    };

    match handle.status(player_id).await {
        Ok(reply @ StatusReply::Success { .. }) => json_response(StatusCode::OK, &reply),
        Ok(reply @ StatusReply::Error { .. }) => json_response(StatusCode::NOT_FOUND, &reply),
        Err(err) => internal_error("status", err),
    }
}

async fn get_leaderboard(handle: GameHandle) -> Response {
    match handle.leaderboard().await {
        Ok(reply) => json_response(StatusCode::OK, &reply),
        Err(err) => internal_error("leaderboard", err),
    }
}

async fn get_health(handle: GameHandle) -> Response {
    match handle.health().await {
        Ok(reply) => json_response(StatusCode::OK, &reply),
        Err(err) => internal_error("health", err),
    }
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if let Some(cause) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", cause),
        )
    } else if let Some(cause) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, format!("Invalid query: {}", cause))
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Content-Length header is required".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected a JSON body".to_string(),
        )
    } else if err.find::<warp::reject::InvalidHeader>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid request headers".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some()
        || err.find::<BodyTooLarge>().is_some()
    {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(error_response(status, message))
}

fn internal_error(route: &str, err: ServerError) -> Response {
    error!("API {} error: {}", route, err);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn json_response<T>(status: StatusCode, body: &T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(body), status).into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    #[derive(Serialize)]
    struct ErrorBody<'a> {
        status: &'a str,
        message: String,
    }

    json_response(
        status,
        &ErrorBody {
            status: "error",
            message,
        },
    )
}
