use crate::{assistant::AssistantClient, push::PushGateway, server::ServerState};
use pageturn_core::{
    gateway::{Notifier, TextGenerator},
    service::{BookingService, PlaceService, PostService, ReviewService, UserService},
    store::AuthStore,
};
use pageturn_db::{
    auth::PgAuthStore, booking::PgBookingStore, place::PgPlaceStore, post::PgPostStore,
    push_token::PgPushTokenStore, review::PgReviewStore, user::PgUserStore,
};
use serde::Deserialize;
use sqlx::PgPool;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod assistant;
mod push;
mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error connecting to database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Error running migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: String,
    /// When set, only the original booker may cancel a booking.
    #[serde(default)]
    strict_cancel_auth: bool,
    push_gateway_url: Option<String>,
    push_gateway_key: Option<String>,
    assistant_url: Option<String>,
    assistant_key: Option<String>,
    assistant_model: Option<String>,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pageturn_api=debug,pageturn_core=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

fn build_state(env: &Env, pool: PgPool) -> ServerState {
    let auth: Arc<dyn AuthStore> = Arc::new(PgAuthStore::new(pool.clone()));
    let push_tokens = Arc::new(PgPushTokenStore::new(pool.clone()));

    let notifier: Option<Arc<dyn Notifier>> =
        match (env.push_gateway_url.clone(), env.push_gateway_key.clone()) {
            (Some(url), Some(key)) => Some(Arc::new(PushGateway::new(url, key))),
            _ => None,
        };
    let generator: Option<Arc<dyn TextGenerator>> = match (
        env.assistant_url.clone(),
        env.assistant_key.clone(),
        env.assistant_model.clone(),
    ) {
        (Some(url), Some(key), Some(model)) => Some(Arc::new(AssistantClient::new(url, key, model))),
        _ => None,
    };

    let users = UserService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgReviewStore::new(pool.clone())),
        push_tokens.clone(),
        auth.clone(),
    );
    let places = PlaceService::new(Arc::new(PgPlaceStore::new(pool.clone())));
    let posts = PostService::new(
        Arc::new(PgPostStore::new(pool.clone())),
        users.clone(),
        places.clone(),
        generator,
    );
    let bookings = BookingService::new(
        Arc::new(PgBookingStore::new(pool.clone())),
        users.clone(),
        posts.clone(),
        push_tokens,
        notifier,
        env.strict_cancel_auth,
    );
    let reviews = ReviewService::new(Arc::new(PgReviewStore::new(pool)), users.clone());

    ServerState {
        users,
        places,
        posts,
        bookings,
        reviews,
        auth,
    }
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let pool = PgPool::connect(&env.database_url).await?;
    pageturn_db::MIGRATOR.run(&pool).await?;

    let state = build_state(&env, pool);

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes()
        .with_state(state)
        .layer(tracing_layer);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed listening for the shutdown signal");
    }
}
