use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::domain::{BatchQuery, EmailUpdate};
use crate::service::{EmailService, ServiceError};

/// Failure body shared by every endpoint: a non-2xx status plus
/// `{"Error": "<message>"}`.
#[derive(serde::Serialize)]
pub struct ErrorBody {
    #[serde(rename = "Error")]
    pub error: String,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailAddressBody {
    pub email: String,
}

#[tracing::instrument(
    name = "Creating a new email handler",
    skip(body, service),
    fields(email = %body.email)
)]
pub async fn handle_create_email(
    body: web::Json<EmailAddressBody>,
    service: web::Data<EmailService>,
) -> impl Responder {
    match service.create_email(&body.email).await {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(err) => error_response(err),
    }
}

#[tracing::instrument(
    name = "Getting an email handler",
    skip(body, service),
    fields(email = %body.email)
)]
pub async fn handle_get_email(
    body: web::Json<EmailAddressBody>,
    service: web::Data<EmailService>,
) -> impl Responder {
    match service.get_email(&body.email).await {
        // An absent record renders as a JSON null body, not as an error.
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(err) => error_response(err),
    }
}

#[tracing::instrument(
    name = "Getting a batch of emails handler",
    skip(body, service),
    fields(page = %body.page, count = %body.count)
)]
pub async fn handle_get_email_batch(
    body: web::Json<BatchQuery>,
    service: web::Data<EmailService>,
) -> impl Responder {
    match service.get_email_batch(*body).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(err) => error_response(err),
    }
}

#[tracing::instrument(
    name = "Updating an email handler",
    skip(body, service),
    fields(email = %body.email)
)]
pub async fn handle_update_email(
    body: web::Json<EmailUpdate>,
    service: web::Data<EmailService>,
) -> impl Responder {
    match service.update_email(body.into_inner()).await {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(err) => error_response(err),
    }
}

#[tracing::instrument(
    name = "Deleting an email handler",
    skip(body, service),
    fields(email = %body.email)
)]
pub async fn handle_delete_email(
    body: web::Json<EmailAddressBody>,
    service: web::Data<EmailService>,
) -> impl Responder {
    match service.delete_email(&body.email).await {
        // Absent after removal means the delete took; the body is null.
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(err) => error_response(err),
    }
}

/// Fallback for a known path hit with the wrong verb. Method mismatch is a
/// client error, same class as a malformed body.
pub async fn method_not_allowed(request: HttpRequest) -> impl Responder {
    HttpResponse::MethodNotAllowed().json(ErrorBody::new(format!(
        "http method {} not allowed",
        request.method()
    )))
}

/// Rewrites actix's JSON deserialization failures into the shared error
/// body so malformed requests look the same as any other validation error.
pub fn json_error_handler(err: JsonPayloadError, _request: &HttpRequest) -> actix_web::Error {
    let body = ErrorBody::new(err.to_string());

    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn error_response(err: ServiceError) -> HttpResponse {
    tracing::error!("Request failed: {:?}", err);

    if err.is_client_error() {
        HttpResponse::BadRequest().json(ErrorBody::new(err.to_string()))
    } else {
        HttpResponse::InternalServerError().json(ErrorBody::new(err.to_string()))
    }
}
