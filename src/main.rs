use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use scout::chat::TurnOrchestrator;
use scout::cli::{commands::{Cli, Commands}, run_cli};
use scout::config::AppConfig;
use scout::llm::ProviderFactory;
use scout::tools::ToolDispatcher;
use tracing::{error, info};

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

async fn index() -> impl Responder {
    let html = include_str!("../static/index.html");
    HttpResponse::Ok().content_type("text/html").body(html)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        run_cli(cli.command, cli.config).await;
        return Ok(());
    }

    info!("Starting Scout server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let llm_provider = match ProviderFactory::create_default(&config) {
        Some(p) => p,
        None => {
            error!("Failed to initialize LLM provider from config");
            std::process::exit(1);
        }
    };

    let dispatcher = ToolDispatcher::from_config(&config.search);
    let orchestrator = TurnOrchestrator::new(llm_provider, dispatcher);

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(orchestrator.clone()))
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .configure(scout::api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
