use actix_cors::Cors;
use actix_web::{middleware::Compress, web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use forum_api::auth::TokenManager;
use forum_api::openapi::ApiDoc;
use forum_api::repo::pg::PgRepo;
use forum_api::settings::{SeedUser, Settings};
use forum_api::{config, AppState, UseCases};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds to reduce manual setup overhead.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    // Structured logging initialisation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let settings = Settings::from_env()?;
    info!("Bootstrapping forum API");

    let use_cases = match settings.database_url.as_deref() {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(settings.database_max_connections)
                .connect_lazy(db_url)
                .context("failed to create Pg pool")?;
            if settings.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await.context("failed to run migrations")?;
                info!("Migrations applied");
            }
            info!("Using Postgres repository backend");
            UseCases::new(PgRepo::new(pool))
        }
        None => in_memory_use_cases(&settings.seed_users)?,
    };

    let state = AppState { use_cases };
    let tokens = TokenManager::new(settings.jwt_secret.clone(), settings.access_token_age);
    let openapi = ApiDoc::openapi();
    let frontend_url = settings.frontend_url.clone();

    let server = HttpServer::new(move || {
        let cors = {
            let mut c = Cors::default()
                // local frontends
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allow_any_header()
                .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .max_age(3600);
            if let Some(front) = frontend_url.as_deref() {
                c = c.allowed_origin(front);
            }
            c
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
    })
    .bind((settings.host.as_str(), settings.port))?;

    info!("Listening on http://{}:{}", settings.host, settings.port);

    server.run().await?;
    Ok(())
}

#[cfg(feature = "inmem-store")]
fn in_memory_use_cases(seed_users: &[SeedUser]) -> anyhow::Result<UseCases> {
    tracing::warn!("DATABASE_URL not set: using the in-memory repository, data is lost on restart");
    if seed_users.is_empty() {
        tracing::warn!("SEED_USERS is empty: every authenticated request will be rejected");
    }
    let repo = forum_api::repo::inmem::InMemRepo::with_users(
        seed_users.iter().map(|u| (u.id.as_str(), u.username.as_str())),
    )
    .context("failed to seed users")?;
    info!(count = seed_users.len(), "Seeded in-memory users");
    Ok(UseCases::new(repo))
}

#[cfg(not(feature = "inmem-store"))]
fn in_memory_use_cases(_seed_users: &[SeedUser]) -> anyhow::Result<UseCases> {
    anyhow::bail!("DATABASE_URL must be set when the inmem-store feature is disabled")
}
