use mailinglist::config::get_configuration;
use mailinglist::startup::Application;
use mailinglist::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(String::from("mailinglist"), String::from("info"));

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config.clone()).await?;

    tracing::info!("JSON API listening on {}", config.get_json_address());
    tracing::info!("gRPC API listening on {}", config.get_grpc_address());

    application.run_until_stop().await
}
