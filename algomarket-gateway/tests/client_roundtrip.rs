//! The HTTP client and moderation workflow against a live gateway.
//!
//! Each test serves the demo store on an ephemeral local port.

use std::sync::Arc;

use algomarket_client::{
    submit_form, ClientConfig, DecisionDialog, HttpModerationApi, LoadOutcome, ModerationApi,
    ModerationError, ModerationWorkflow, Scope,
};
use algomarket_core::{AlgorithmId, AlgorithmStatus, SubmissionForm, Verdict};
use algomarket_gateway::{
    routes::create_router,
    store::{MarketStore, DEMO_AUTHOR_TOKEN, DEMO_MODERATOR_TOKEN},
};

async fn spawn_gateway() -> String {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(l) => l,
        Err(e) => panic!("failed to bind: {e}"),
    };
    let addr = match listener.local_addr() {
        Ok(a) => a,
        Err(e) => panic!("no local address: {e}"),
    };
    let app = create_router(Arc::new(MarketStore::with_demo_data()));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            panic!("server error: {e}");
        }
    });
    format!("http://{addr}")
}

fn client(base_url: &str, token: Option<&str>) -> HttpModerationApi {
    let mut config = ClientConfig::new(base_url);
    if let Some(token) = token {
        config = config.with_token(token);
    }
    match HttpModerationApi::new(config) {
        Ok(c) => c,
        Err(e) => panic!("invalid client config: {e}"),
    }
}

fn ids(list: &[algomarket_core::ModeratedAlgorithm]) -> Vec<String> {
    list.iter().map(|a| a.id.to_string()).collect()
}

#[tokio::test]
async fn moderator_approves_and_rejects_over_http() {
    let base = spawn_gateway().await;
    let workflow = ModerationWorkflow::new(client(&base, Some(DEMO_MODERATOR_TOKEN)));

    assert_eq!(workflow.load(Scope::PendingOnly).await, Ok(LoadOutcome::Applied { count: 2 }));
    assert_eq!(ids(&workflow.pending().await), vec!["a", "b"]);

    assert!(workflow.decide(&AlgorithmId::new("a"), Verdict::Approved, None).await.is_ok());
    assert_eq!(ids(&workflow.pending().await), vec!["b"]);

    assert!(workflow
        .decide(&AlgorithmId::new("b"), Verdict::Rejected, Some("no tests"))
        .await
        .is_ok());
    assert!(workflow.pending().await.is_empty());

    assert_eq!(workflow.load(Scope::All).await, Ok(LoadOutcome::Applied { count: 4 + 3 }));
    let all = workflow.visible().await;
    let b = match all.iter().find(|a| a.id.as_str() == "b") {
        Some(b) => b,
        None => panic!("b must still be listed"),
    };
    assert_eq!(b.status, AlgorithmStatus::Rejected);
    assert_eq!(b.rejection_reason.as_deref(), Some("no tests"));
}

#[tokio::test]
async fn author_is_forbidden_and_anonymous_fails() {
    let base = spawn_gateway().await;

    let as_author = ModerationWorkflow::new(client(&base, Some(DEMO_AUTHOR_TOKEN)));
    assert_eq!(as_author.load(Scope::PendingOnly).await, Err(ModerationError::Forbidden));
    assert!(as_author.pending().await.is_empty());

    let anonymous = ModerationWorkflow::new(client(&base, None));
    let result = anonymous.load(Scope::PendingOnly).await;
    assert!(
        matches!(result, Err(ModerationError::Failed { .. })),
        "401 is a generic failure, got {result:?}"
    );
}

#[tokio::test]
async fn unknown_algorithm_reports_missing_endpoint() {
    let base = spawn_gateway().await;
    let workflow = ModerationWorkflow::new(client(&base, Some(DEMO_MODERATOR_TOKEN)));
    assert!(workflow.load(Scope::PendingOnly).await.is_ok());

    let result = workflow.decide(&AlgorithmId::new("nope"), Verdict::Approved, None).await;
    assert_eq!(result, Err(ModerationError::EndpointMissing));
    assert_eq!(workflow.pending_count().await, 2, "failed decision leaves the queue alone");
}

#[tokio::test]
async fn second_verdict_is_a_generic_failure_and_dialog_stays_open() {
    let base = spawn_gateway().await;
    let first = ModerationWorkflow::new(client(&base, Some(DEMO_MODERATOR_TOKEN)));
    let second = ModerationWorkflow::new(client(&base, Some(DEMO_MODERATOR_TOKEN)));
    assert!(first.load(Scope::PendingOnly).await.is_ok());
    assert!(second.load(Scope::PendingOnly).await.is_ok());

    assert!(first.decide(&AlgorithmId::new("a"), Verdict::Approved, None).await.is_ok());

    let stale = match second.pending().await.into_iter().find(|a| a.id.as_str() == "a") {
        Some(a) => a,
        None => panic!("second view still shows a"),
    };
    let mut dialog = match DecisionDialog::open(stale) {
        Ok(d) => d,
        Err(e) => panic!("dialog refused a pending algorithm: {e}"),
    };
    dialog.set_reason("too late");
    let dialog = match dialog.submit(&second, Verdict::Rejected).await {
        Ok(()) => panic!("conflicting verdict must fail"),
        Err((dialog, error)) => {
            assert!(matches!(error, ModerationError::Failed { .. }), "got {error:?}");
            dialog
        }
    };
    assert_eq!(dialog.reason(), "too late");
    assert_eq!(ids(&second.pending().await), vec!["a", "b"]);
}

#[tokio::test]
async fn submitted_algorithm_enters_the_queue_and_not_the_catalog() {
    let base = spawn_gateway().await;
    let author = client(&base, Some(DEMO_AUTHOR_TOKEN));
    let form = SubmissionForm {
        title: "Sieve of Eratosthenes".to_owned(),
        description: "Primes up to n".to_owned(),
        code: "int main() {}".to_owned(),
        tags: "math, primes".to_owned(),
        is_paid: true,
        ..SubmissionForm::default()
    };
    let created = match submit_form(&author, &form).await {
        Ok(c) => c,
        Err(e) => panic!("submission failed: {e}"),
    };
    assert!(created.is_pending());
    assert_eq!(created.author_name, "author");

    let moderator = client(&base, Some(DEMO_MODERATOR_TOKEN));
    let pending = match moderator.list(Scope::PendingOnly).await {
        Ok(p) => p,
        Err(e) => panic!("list failed: {e}"),
    };
    assert_eq!(ids(&pending), vec!["a".to_owned(), "b".to_owned(), created.id.to_string()]);

    let catalog = match author.catalog().await {
        Ok(c) => c,
        Err(e) => panic!("catalog failed: {e}"),
    };
    assert!(catalog.iter().all(|a| a.id != created.id));
    assert!(catalog.iter().any(|a| a.is_paid && a.price == Some(100)));
}
