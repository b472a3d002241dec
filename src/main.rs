mod config;
mod db;
mod errors;
mod handlers;
mod middleware;
mod models;
mod utils;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::ServerConfig;
use db::todo_repository::TodoRepository;
use db::user_repository::UserRepository;
use db::Database;
use dotenv::dotenv;
use middleware::auth::AuthMiddleware;
use std::env;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::me,
        handlers::todos::list_todos,
        handlers::todos::create_todo,
        handlers::todos::update_todo,
        handlers::todos::delete_todo,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::health::HealthChecks,
            handlers::auth::SignupRequest,
            handlers::auth::LoginRequest,
            handlers::auth::AuthResponse,
            handlers::auth::UserResponse,
            handlers::todos::CreateTodoRequest,
            handlers::todos::UpdateTodoRequest,
            handlers::todos::DeleteTodoResponse,
            errors::FieldError,
            models::todo::Todo,
            models::todo::Category,
            models::user::Claims,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Authentication", description = "User signup, login and identity endpoints"),
        (name = "Todos", description = "Per-user todo management requiring JWT authentication")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .json()
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration, refusing to start");
            std::process::exit(1);
        }
    };

    if config.jwt_uses_default() {
        warn!("Using default JWT secret - NOT SECURE FOR PRODUCTION");
    }

    let database = Database::new(&config.db_path).unwrap_or_else(|e| {
        error!(error = %e, db_path = %config.db_path, "Failed to open database");
        std::process::exit(1);
    });
    info!(db_path = %config.db_path, "Database initialized");

    let bind_address = config.bind_addr();

    info!(bind_address = %bind_address, "Starting todo API server");
    info!("Available endpoints:");
    info!("   GET    /api/health      - Health check (public)");
    info!("   POST   /api/auth/signup - Register new user (public)");
    info!("   POST   /api/auth/login  - Login user (public)");
    info!("   GET    /api/auth/me     - Current user (protected)");
    info!("   GET    /api/todos       - List own todos (protected)");
    info!("   POST   /api/todos       - Create todo (protected)");
    info!("   PUT    /api/todos/{{id}}  - Update own todo (protected)");
    info!("   DELETE /api/todos/{{id}}  - Delete own todo (protected)");
    info!(
        swagger_url = format!("http://{}/swagger-ui/", bind_address),
        "Swagger UI available"
    );

    HttpServer::new(move || {
        let user_repo = UserRepository::new(database.clone());
        let todo_repo = TodoRepository::new(database.clone());

        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(user_repo))
            .app_data(web::Data::new(todo_repo))
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Swagger UI
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Public routes
            .route("/api/health", web::get().to(handlers::health::health))
            // Auth routes; /me sits behind the bearer gate
            .service(
                web::scope("/api/auth")
                    .route("/signup", web::post().to(handlers::auth::signup))
                    .route("/login", web::post().to(handlers::auth::login))
                    .service(
                        web::resource("/me")
                            .wrap(AuthMiddleware::new(config.jwt_secret.clone()))
                            .route(web::get().to(handlers::auth::me)),
                    ),
            )
            // Protected todo routes
            .service(
                web::scope("/api/todos")
                    .wrap(AuthMiddleware::new(config.jwt_secret.clone()))
                    .route("", web::get().to(handlers::todos::list_todos))
                    .route("", web::post().to(handlers::todos::create_todo))
                    .route("/{id}", web::put().to(handlers::todos::update_todo))
                    .route("/{id}", web::delete().to(handlers::todos::delete_todo)),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
