//! Main entry point for the YonderCamp server.
//! Wires configuration, the database pool, the media client, cookie sessions,
//! and every route onto one actix-web application.

use actix_files::Files;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware::Logger, web};

use media_services::MediaService;
use postgres::database::{create_connection_pool, init_schema, test_connection};
use web_handlers::method_override::MethodOverride;
use web_handlers::types::AppSettings;
use web_handlers::{campground_handlers, comment_handlers, session_handlers, user_handlers};

mod config;
use config::ServerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("Starting YonderCamp server...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Create database connection pool
    let pool = match create_connection_pool(&config.database_url).await {
        Ok(pool) => {
            log::info!("Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_schema(&pool).await {
        log::error!("Failed to initialize schema: {}", e);
        std::process::exit(1);
    }

    // Create the media client
    let media = match MediaService::new(config.media.clone()) {
        Ok(media) => {
            log::info!("Media client initialized successfully");
            media
        }
        Err(e) => {
            log::error!("Failed to initialize media client: {}", e);
            std::process::exit(1);
        }
    };

    let settings = AppSettings {
        admin_code: config.admin_code.clone(),
    };
    let session_key = Key::derive_from(config.session_secret.as_bytes());
    let port = config.port;

    log::info!("Server will be available at: http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(media.clone()))
            .app_data(web::Data::new(settings.clone()))
            .wrap(Logger::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .wrap(MethodOverride)
            // Landing and account routes
            .route("/", web::get().to(session_handlers::landing))
            .route("/register", web::get().to(session_handlers::register_form))
            .route("/register", web::post().to(session_handlers::register))
            .route("/login", web::get().to(session_handlers::login_form))
            .route("/login", web::post().to(session_handlers::login))
            .route("/logout", web::get().to(session_handlers::logout))
            // Campgrounds
            .service(
                web::scope("/campgrounds")
                    .route("", web::get().to(campground_handlers::index))
                    .route("", web::post().to(campground_handlers::create))
                    .route("/new", web::get().to(campground_handlers::new_form))
                    .route("/{id}", web::get().to(campground_handlers::show))
                    .route("/{id}", web::put().to(campground_handlers::update))
                    .route("/{id}", web::delete().to(campground_handlers::delete))
                    .route("/{id}/edit", web::get().to(campground_handlers::edit_form))
                    // Comments
                    .route("/{id}/comments", web::post().to(comment_handlers::create))
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::put().to(comment_handlers::update),
                    )
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::delete().to(comment_handlers::delete),
                    ),
            )
            // User profiles
            .service(
                web::scope("/users")
                    .route("/{id}", web::get().to(user_handlers::show))
                    .route("/{id}", web::put().to(user_handlers::update))
                    .route("/{id}/edit", web::get().to(user_handlers::edit_form)),
            )
            .service(Files::new("/static", "./static"))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
