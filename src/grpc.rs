use tonic::{Request, Response, Status};

use crate::domain::{BatchQuery, EmailEntry, EmailUpdate};
use crate::pb::mailing_list_server::MailingList;
use crate::pb::{
    CreateEmailRequest, DeleteEmailRequest, EmailResponse, GetEmailBatchRequest,
    GetEmailBatchResponse, GetEmailRequest, UpdateEmailRequest,
};
use crate::service::{EmailService, ServiceError};

/// gRPC adapter: decodes protobuf requests, delegates to the shared CRUD
/// service, and encodes records or error statuses back. No business logic
/// lives here.
///
/// Serving concurrent requests is safe: the service only holds a cloneable
/// pool handle, and tonic spawns one task per call.
pub struct MailingListGrpc {
    service: EmailService,
}

impl MailingListGrpc {
    pub fn new(service: EmailService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl MailingList for MailingListGrpc {
    #[tracing::instrument(name = "gRPC CreateEmail", skip(self, request))]
    async fn create_email(
        &self,
        request: Request<CreateEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let request = request.into_inner();

        let entry = self
            .service
            .create_email(&request.email_addr)
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(email_response(entry)))
    }

    #[tracing::instrument(name = "gRPC GetEmail", skip(self, request))]
    async fn get_email(
        &self,
        request: Request<GetEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let request = request.into_inner();

        let entry = self
            .service
            .get_email(&request.email_addr)
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(email_response(entry)))
    }

    #[tracing::instrument(name = "gRPC GetEmailBatch", skip(self, request))]
    async fn get_email_batch(
        &self,
        request: Request<GetEmailBatchRequest>,
    ) -> Result<Response<GetEmailBatchResponse>, Status> {
        let request = request.into_inner();
        let query = BatchQuery {
            page: i64::from(request.page),
            count: i64::from(request.count),
        };

        let entries = self
            .service
            .get_email_batch(query)
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(GetEmailBatchResponse {
            email_entries: entries.into_iter().map(pb_entry_from_entry).collect(),
        }))
    }

    #[tracing::instrument(name = "gRPC UpdateEmail", skip(self, request))]
    async fn update_email(
        &self,
        request: Request<UpdateEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let pb_entry = request
            .into_inner()
            .email_entry
            .ok_or_else(|| Status::invalid_argument("email_entry field is required"))?;

        // Only the mutable fields cross into the service; the identifier in
        // the request is ignored and the email acts as the lookup key.
        let update = EmailUpdate {
            email: pb_entry.email,
            confirmed_at: EmailEntry::confirmed_at_from_seconds(pb_entry.confirmed_at),
            opt_out: pb_entry.opt_out,
        };

        let entry = self
            .service
            .update_email(update)
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(email_response(entry)))
    }

    #[tracing::instrument(name = "gRPC DeleteEmail", skip(self, request))]
    async fn delete_email(
        &self,
        request: Request<DeleteEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let request = request.into_inner();

        let entry = self
            .service
            .delete_email(&request.email_addr)
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(email_response(entry)))
    }
}

/// An absent record is an unset `email_entry`, never an error status.
fn email_response(entry: Option<EmailEntry>) -> EmailResponse {
    EmailResponse {
        email_entry: entry.map(pb_entry_from_entry),
    }
}

fn pb_entry_from_entry(entry: EmailEntry) -> crate::pb::EmailEntry {
    crate::pb::EmailEntry {
        id: entry.id,
        email: entry.email,
        confirmed_at: entry.confirmed_at.timestamp(),
        opt_out: entry.opt_out,
    }
}

fn status_from_error(err: ServiceError) -> Status {
    tracing::error!("Request failed: {:?}", err);

    match &err {
        ServiceError::Validation(message) => Status::invalid_argument(message.clone()),
        ServiceError::DuplicateEmail(_) => Status::already_exists(err.to_string()),
        ServiceError::StoreUnavailable(_) | ServiceError::Timeout(_) => {
            Status::unavailable(err.to_string())
        }
    }
}
