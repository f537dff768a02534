use uuid::Uuid;

use digitalcv_cv::crypto::verify_pin;
use digitalcv_cv::error::CvServiceError;
use digitalcv_cv::usecase::webhook::{WebhookOutcome, parse_webhook};
use digitalcv_domain::cv::CvState;
use digitalcv_domain::payment::NotifyPolicy;

use crate::helpers::{World, signed_webhook, test_payment};

// ── State transitions ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_activate_cv_on_confirmed_payment() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let outcome = usecase
        .execute(signed_webhook(&world.token(), "txn_1", "CONFIRMED"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Applied);
    let payment = world.stored_payment();
    assert_eq!(payment.status, "CONFIRMED");
    assert_eq!(payment.gateway_transaction_id.as_deref(), Some("txn_1"));
    assert_eq!(payment.response_payload.unwrap()["amount"], 250000);
    assert_eq!(world.stored_cv().unwrap().state, CvState::Active);
    assert!(world.sent_emails().is_empty());
}

#[tokio::test]
async fn should_deactivate_cv_on_failed_payment() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    usecase
        .execute(signed_webhook(&world.token(), "txn_1", "failed"))
        .await
        .unwrap();

    assert_eq!(world.stored_payment().status, "failed");
    assert_eq!(world.stored_cv().unwrap().state, CvState::Deactive);
    assert!(world.sent_emails().is_empty());
}

#[tokio::test]
async fn should_deactivate_cv_and_email_fresh_pin_on_cancelled_payment() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let outcome = usecase
        .execute(signed_webhook(&world.token(), "txn_1", "cancelled"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Applied);
    let cv = world.stored_cv().unwrap();
    assert_eq!(cv.state, CvState::Deactive);

    let sent = world.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, world.owner.email);
    assert_eq!(sent[0].cv_username, "ada");
    assert_ne!(cv.pin_hash, world.cv.pin_hash);
    assert!(verify_pin(&sent[0].cv_pin, &cv.pin_hash).unwrap());
}

#[tokio::test]
async fn should_leave_cv_unchanged_for_unrecognized_state() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Terminal);

    let outcome = usecase
        .execute(signed_webhook(&world.token(), "txn_1", "Chargeback"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::UnrecognizedState);
    assert_eq!(world.stored_payment().status, "Chargeback");
    assert_eq!(world.stored_cv().unwrap().state, CvState::Pending);
    assert!(world.sent_emails().is_empty());
}

#[tokio::test]
async fn should_allow_terminal_status_to_be_overwritten() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Never);

    usecase
        .execute(signed_webhook(&world.token(), "txn_1", "CONFIRMED"))
        .await
        .unwrap();
    usecase
        .execute(signed_webhook(&world.token(), "txn_1", "CANCELLED"))
        .await
        .unwrap();

    assert_eq!(world.stored_payment().status, "CANCELLED");
    assert_eq!(world.stored_cv().unwrap().state, CvState::Deactive);
}

#[tokio::test]
async fn should_apply_state_that_returns_after_a_different_one() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Never);
    let token = world.token();

    let mut outcomes = vec![];
    for state in ["CONFIRMED", "CANCELLED", "CONFIRMED"] {
        outcomes.push(
            usecase
                .execute(signed_webhook(&token, "txn_1", state))
                .await
                .unwrap(),
        );
    }

    assert_eq!(outcomes, vec![WebhookOutcome::Applied; 3]);
    assert_eq!(world.stored_payment().status, "CONFIRMED");
    assert_eq!(world.stored_cv().unwrap().state, CvState::Active);
}

#[tokio::test]
async fn should_store_padded_state_as_signed() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Never);

    let outcome = usecase
        .execute(signed_webhook(&world.token(), "txn_1", " Confirmed "))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Applied);
    assert_eq!(world.stored_payment().status, " Confirmed ");
    assert_eq!(world.stored_cv().unwrap().state, CvState::Active);
}

// ── Idempotency ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_ignore_duplicate_delivery_and_email_once() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);
    let token = world.token();

    let first = usecase
        .execute(signed_webhook(&token, "txn_1", "CANCELLED"))
        .await
        .unwrap();
    let cv_after_first = world.stored_cv().unwrap();
    let payment_after_first = world.stored_payment();

    let second = usecase
        .execute(signed_webhook(&token, "txn_1", "cancelled"))
        .await
        .unwrap();

    assert_eq!(first, WebhookOutcome::Applied);
    assert_eq!(second, WebhookOutcome::Duplicate);
    assert_eq!(world.sent_emails().len(), 1);

    let cv = world.stored_cv().unwrap();
    assert_eq!(cv.state, cv_after_first.state);
    assert_eq!(cv.pin_hash, cv_after_first.pin_hash);
    let payment = world.stored_payment();
    assert_eq!(payment.status, payment_after_first.status);
    assert_eq!(payment.updated_at, payment_after_first.updated_at);
}

#[tokio::test]
async fn should_apply_reused_transaction_id_to_another_payment() {
    let world = World::new();
    let retry = test_payment(world.owner.id, Some(world.cv.id));
    world.payments.lock().unwrap().push(retry.clone());
    let usecase = world.webhook_usecase(NotifyPolicy::Never);

    let first = usecase
        .execute(signed_webhook(&world.token(), "txn_1", "failed"))
        .await
        .unwrap();
    let second = usecase
        .execute(signed_webhook(&retry.id.to_string(), "txn_1", "failed"))
        .await
        .unwrap();

    assert_eq!(first, WebhookOutcome::Applied);
    assert_eq!(second, WebhookOutcome::Applied);
    let retried = world
        .payments
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.id == retry.id)
        .cloned()
        .unwrap();
    assert_eq!(retried.status, "failed");
    assert_eq!(retried.gateway_transaction_id.as_deref(), Some("txn_1"));
    assert_eq!(world.ledger.lock().unwrap().len(), 2);
}

// ── Lookup failures ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_unknown_token_without_mutation() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let result = usecase
        .execute(signed_webhook(
            &Uuid::now_v7().to_string(),
            "txn_1",
            "CONFIRMED",
        ))
        .await;

    assert!(
        matches!(result, Err(CvServiceError::PaymentNotFound)),
        "expected PaymentNotFound, got {result:?}"
    );
    assert_eq!(world.stored_payment().status, "PENDING");
    assert_eq!(world.stored_cv().unwrap().state, CvState::Pending);
    assert!(world.ledger.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_not_found_for_non_uuid_token() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let result = usecase
        .execute(signed_webhook("order-42", "txn_1", "CONFIRMED"))
        .await;
    assert!(matches!(result, Err(CvServiceError::PaymentNotFound)));
}

#[tokio::test]
async fn should_acknowledge_payment_without_linked_cv() {
    let world = World::new();
    let orphan = test_payment(world.owner.id, None);
    world.payments.lock().unwrap().push(orphan.clone());
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let outcome = usecase
        .execute(signed_webhook(&orphan.id.to_string(), "txn_2", "cancelled"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Applied);
    assert_eq!(world.stored_cv().unwrap().state, CvState::Pending);
    assert!(world.sent_emails().is_empty());
}

#[tokio::test]
async fn should_acknowledge_when_linked_cv_is_gone() {
    let world = World::new();
    world.cvs.lock().unwrap().clear();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let outcome = usecase
        .execute(signed_webhook(&world.token(), "txn_1", "cancelled"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Applied);
    assert_eq!(world.stored_payment().status, "cancelled");
    assert!(world.sent_emails().is_empty());
}

#[tokio::test]
async fn should_skip_email_when_owner_cannot_be_resolved() {
    let mut world = World::new();
    world.users.clear();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let outcome = usecase
        .execute(signed_webhook(&world.token(), "txn_1", "cancelled"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Applied);
    assert_eq!(world.stored_cv().unwrap().state, CvState::Deactive);
    assert!(world.sent_emails().is_empty());
}

#[tokio::test]
async fn should_acknowledge_even_when_email_delivery_fails() {
    let world = World::new();
    let usecase = world.webhook_usecase_with(NotifyPolicy::Cancelled, true);

    let outcome = usecase
        .execute(signed_webhook(&world.token(), "txn_1", "cancelled"))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Applied);
    assert_eq!(world.sent_emails().len(), 1);
}

// ── Signature ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_tampered_state_before_touching_store() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let mut notification = signed_webhook(&world.token(), "txn_1", "failed");
    notification.state = "CONFIRMED".into();

    let result = usecase.execute(notification).await;
    assert!(matches!(result, Err(CvServiceError::InvalidSignature)));
    assert_eq!(world.stored_payment().status, "PENDING");
    assert_eq!(world.stored_cv().unwrap().state, CvState::Pending);
}

#[tokio::test]
async fn should_reject_unsigned_webhook() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Cancelled);

    let notification = parse_webhook(
        Some(&world.token()),
        serde_json::json!({"gateway_transaction_id": "txn_1", "state": "CONFIRMED"}),
    )
    .unwrap();

    let result = usecase.execute(notification).await;
    assert!(matches!(result, Err(CvServiceError::InvalidSignature)));
}

// ── Notification policy ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_email_on_confirmation_when_policy_is_confirmed() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Confirmed);

    usecase
        .execute(signed_webhook(&world.token(), "txn_1", "CONFIRMED"))
        .await
        .unwrap();

    let sent = world.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].cv_username, "ada");
}

#[tokio::test]
async fn should_not_email_on_cancellation_when_policy_is_never() {
    let world = World::new();
    let usecase = world.webhook_usecase(NotifyPolicy::Never);

    usecase
        .execute(signed_webhook(&world.token(), "txn_1", "CANCELLED"))
        .await
        .unwrap();

    assert_eq!(world.stored_cv().unwrap().state, CvState::Deactive);
    assert!(world.sent_emails().is_empty());
}
