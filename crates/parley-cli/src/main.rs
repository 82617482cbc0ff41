use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley_cli::{
    config::Config,
    views::{self, ChatView, LoginView, ViewExit},
};
use parley_client::{ChatBackend, HttpBackend};
use parley_core::{ChatCoordinator, ConversationStore, Route, Router, SessionStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config);

    tracing::info!("Starting Parley against {}", config.backend.base_url);

    let backend: Arc<dyn ChatBackend> = Arc::new(
        HttpBackend::new(&config.backend.base_url).context("Failed to create backend client")?,
    );

    match backend.health().await {
        Ok(health) => tracing::debug!("Backend health: {:?}", health.status),
        Err(e) => tracing::warn!("Backend health check failed: {}", e),
    }

    let session = Arc::new(SessionStore::new(Arc::clone(&backend)));
    let conversations = Arc::new(ConversationStore::new(
        Arc::clone(&backend),
        Arc::clone(&session),
    ));
    let coordinator = Arc::new(ChatCoordinator::new(
        Arc::clone(&backend),
        Arc::clone(&session),
        Arc::clone(&conversations),
        config.backend.mode,
    ));
    let router = Router::new(Arc::clone(&session));

    let mut login_view = LoginView::new(Arc::clone(&session));
    let chat_view = ChatView::new(
        Arc::clone(&session),
        Arc::clone(&conversations),
        coordinator,
        config.ui.assistant_name.clone(),
    );
    let mut editor = views::new_editor().context("Failed to initialise line editor")?;

    let mut route = router.bootstrap().await;
    loop {
        tracing::debug!(route = route.name(), "Entering view");
        let exit = match route {
            Route::Login => login_view.run(&mut editor).await?,
            Route::Chat => chat_view.run(&mut editor).await?,
        };

        route = match exit {
            ViewExit::Navigate(target) => router.navigate(target),
            ViewExit::Logout => router.logout().await,
            ViewExit::Quit => break,
        };
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stderr keeps log lines out of the transcript
    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
