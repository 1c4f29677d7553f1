pub mod config;
pub mod domain;
pub mod grpc;
pub mod routes;
pub mod service;
pub mod startup;
pub mod store;
pub mod telemetry;

/// Types generated from proto/mailinglist.proto, shared by the gRPC adapter
/// and its clients.
pub mod pb {
    tonic::include_proto!("mailinglist");
}
