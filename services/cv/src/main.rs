use sea_orm::Database;
use tracing::info;

use digitalcv_core::tracing::init_tracing;
use digitalcv_cv::config::CvConfig;
use digitalcv_cv::infra::gateway::HttpPaymentGateway;
use digitalcv_cv::infra::mailer::HttpMailer;
use digitalcv_cv::router::build_router;
use digitalcv_cv::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CvConfig::from_env().expect("invalid configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let gateway =
        HttpPaymentGateway::new(&config.gateway).expect("failed to build gateway client");
    let mailer = HttpMailer::new(&config.mail).expect("failed to build mail client");
    if !mailer.is_enabled() {
        info!("MAIL_API_KEY not set; credentials emails will be skipped");
    }

    let state = AppState {
        db,
        gateway,
        mailer,
        pricing: config.pricing,
        public_base_url: config.public_base_url,
        webhook_secret: config.gateway.webhook_secret,
        notify_policy: config.notify_policy,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.cv_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(notify_on = %config.notify_policy, "cv service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
