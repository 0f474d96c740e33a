//! E2E specs against the Axum server.
//!
//! With `BASE_URL` (or `SHIFTTRACK_BASE_URL`) set, specs run against that
//! server. Otherwise each test boots an in-process server on an ephemeral
//! port backed by a throwaway data directory.

use std::sync::Arc;

use shifttrack_core::WeekStart;
use shifttrack_e2e::client::TestContext;
use shifttrack_server::{AppConfig, AppState, build_router, serve_on, storage};

/// Keeps the in-process server's data directory alive for the test.
struct Harness {
    ctx: TestContext,
    _data_dir: Option<tempfile::TempDir>,
}

async fn spawn_local() -> Harness {
    let data_dir = tempfile::tempdir().expect("create temp data dir");
    let db = storage::init_db(data_dir.path()).expect("init database");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

    let state = AppState {
        db,
        config: AppConfig {
            base_url: base_url.clone(),
            jwt_secret: "e2e-test-secret".into(),
            registration_open: true,
            week_starts_on: WeekStart::Monday,
            join_code_length: 6,
        },
    };
    tokio::spawn(serve_on(listener, build_router(state, None)));

    Harness {
        ctx: TestContext::new(base_url),
        _data_dir: Some(data_dir),
    }
}

async fn get_ctx() -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shifttrack_server=warn".into()),
        )
        .with_test_writer()
        .try_init();

    match std::env::var("BASE_URL").or_else(|_| std::env::var("SHIFTTRACK_BASE_URL")) {
        Ok(base_url) => Harness {
            ctx: TestContext::new(base_url),
            _data_dir: None,
        },
        Err(_) => spawn_local().await,
    }
}

macro_rules! e2e_test {
    ($module:ident :: $name:ident) => {
        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn $name() {
            let harness = get_ctx().await;
            shifttrack_e2e::specs::$module::$name(&harness.ctx)
                .await
                .unwrap();
        }
    };
}

shifttrack_e2e::for_each_spec!(e2e_test);

/// Every spec in parallel against one shared server.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn full_suite_shares_one_server() {
    let harness = get_ctx().await;
    let ctx = Arc::new(harness.ctx);
    let suite = shifttrack_e2e::runner::run_all(ctx, None).await;

    for result in suite.results.iter().filter(|r| !r.passed) {
        eprintln!(
            "FAILED {} ({:?}): {}",
            result.name,
            result.duration,
            result.error.as_deref().unwrap_or("")
        );
    }
    assert!(suite.total() > 0);
    assert_eq!(suite.failed(), 0, "{} of {} specs failed", suite.failed(), suite.total());
    assert_eq!(suite.passed(), suite.total());
}
