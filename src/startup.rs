use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::grpc::MailingListGrpc;
use crate::pb::mailing_list_server::MailingListServer;
use crate::routes::{
    handle_create_email, handle_delete_email, handle_get_email, handle_get_email_batch,
    handle_update_email, health_check, json_error_handler, method_not_allowed,
};
use crate::service::EmailService;
use crate::store::EmailStore;

pub struct Application {
    json_port: u16,
    grpc_port: u16,
    server: Server,
    grpc_server: MailingListServer<MailingListGrpc>,
    grpc_listener: tokio::net::TcpListener,
}

impl Application {
    /// Builds the single process-wide store handle, initializes the emails
    /// table (fatal on anything but the tolerated "already exists"), and
    /// binds both transport listeners. Binding port 0 picks a free port,
    /// which `get_json_port`/`get_grpc_port` report back.
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);
        let store = EmailStore::new(db_pool);

        store
            .try_create()
            .await
            .expect("Failed to initialize the emails table.");

        let service = EmailService::new(store, config.get_operation_timeout());

        let listener =
            TcpListener::bind(config.get_json_address()).expect("Failed to bind the address.");
        let json_port = listener.local_addr().unwrap().port();
        let server = run(listener, service.clone())?;

        let grpc_listener = tokio::net::TcpListener::bind(config.get_grpc_address()).await?;
        let grpc_port = grpc_listener.local_addr().unwrap().port();
        let grpc_server = MailingListServer::new(MailingListGrpc::new(service));

        Ok(Self {
            json_port,
            grpc_port,
            server,
            grpc_server,
            grpc_listener,
        })
    }

    pub fn get_json_port(&self) -> u16 {
        self.json_port
    }

    pub fn get_grpc_port(&self) -> u16 {
        self.grpc_port
    }

    /// Drives both servers; whichever exits first takes the process down
    /// with its result.
    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        let grpc_server = tonic::transport::Server::builder()
            .add_service(self.grpc_server)
            .serve_with_incoming(TcpListenerStream::new(self.grpc_listener));

        tokio::select! {
            result = self.server => result,
            result = grpc_server => {
                result.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
            }
        }
    }
}

pub fn run(listener: TcpListener, service: EmailService) -> Result<Server, std::io::Error> {
    let service = web::Data::new(service);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(health_check))
            // Each resource keeps a catch-all route so a wrong verb gets the
            // shared error body instead of an empty 405.
            .service(
                web::resource("/email/create")
                    .route(web::post().to(handle_create_email))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .service(
                web::resource("/email/get")
                    .route(web::get().to(handle_get_email))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .service(
                web::resource("/email/get_batch")
                    .route(web::get().to(handle_get_email_batch))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .service(
                web::resource("/email/update")
                    .route(web::put().to(handle_update_email))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .service(
                web::resource("/email/delete")
                    .route(web::post().to(handle_delete_email))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .app_data(service.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Sqlite> {
    SqlitePoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
