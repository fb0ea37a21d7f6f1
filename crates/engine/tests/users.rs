mod common;

use common::{engine_with_db, provision, register};
use engine::{Engine, EngineError, ProfileKind, RegisterUserCmd, UpdateAccountCmd, UserRole};

#[tokio::test]
async fn registration_creates_common_user_with_personal_profile() {
    let engine = engine_with_db().await;

    let user = register(&engine, "Ana", " Ana@Example.com ").await;
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.role, UserRole::Common);

    let profiles = engine.list_profiles(user.id).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name, "Personal");
    assert_eq!(profiles[0].kind, ProfileKind::Pf);
}

#[tokio::test]
async fn duplicate_email_is_rejected_ignoring_case() {
    let engine = engine_with_db().await;
    register(&engine, "Ana", "ana@example.com").await;

    let err = engine
        .register_user(RegisterUserCmd {
            name: "Other".to_string(),
            email: "ANA@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn registration_checks_password_rules() {
    let engine = engine_with_db().await;

    let short = engine
        .register_user(RegisterUserCmd {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "abc".to_string(),
            password_confirmation: "abc".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(short, EngineError::InvalidInput(_)));

    let mismatch = engine
        .register_user(RegisterUserCmd {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret2".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(mismatch, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn authenticate_accepts_only_the_right_password() {
    let engine = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;

    let logged = engine
        .authenticate("ANA@example.com", "secret1")
        .await
        .unwrap();
    assert_eq!(logged.id, user.id);

    let wrong = engine
        .authenticate("ana@example.com", "nope!!")
        .await
        .unwrap_err();
    assert!(matches!(wrong, EngineError::Unauthorized(_)));

    let unknown = engine
        .authenticate("bob@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(unknown, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn update_account_requires_current_password_and_a_change() {
    let engine = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;

    let wrong = engine
        .update_account(
            UpdateAccountCmd {
                current_password: "bad-password".to_string(),
                name: Some("Ana Maria".to_string()),
                ..Default::default()
            },
            user.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(wrong, EngineError::Unauthorized(_)));

    let unchanged = engine
        .update_account(
            UpdateAccountCmd {
                current_password: "secret1".to_string(),
                name: Some("Ana".to_string()),
                ..Default::default()
            },
            user.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(unchanged, EngineError::InvalidInput(_)));

    let updated = engine
        .update_account(
            UpdateAccountCmd {
                current_password: "secret1".to_string(),
                new_password: Some("better1".to_string()),
                new_password_confirmation: Some("better1".to_string()),
                ..Default::default()
            },
            user.id,
        )
        .await
        .unwrap();
    assert_eq!(updated.id, user.id);
    engine
        .authenticate("ana@example.com", "better1")
        .await
        .unwrap();
}

#[tokio::test]
async fn admin_operations_are_gated_and_protect_the_actor() {
    let engine = engine_with_db().await;
    let admin = provision(&engine, "Root", "root@example.com", UserRole::Admin).await;
    let user = register(&engine, "Ana", "ana@example.com").await;

    let err = engine.list_users(user.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let users = engine.list_users(admin.id).await.unwrap();
    assert_eq!(users.len(), 2);

    let promoted = engine
        .set_user_role(user.id, UserRole::Lawyer, admin.id)
        .await
        .unwrap();
    assert_eq!(promoted.role, UserRole::Lawyer);

    let demote_self = engine
        .set_user_role(admin.id, UserRole::Common, admin.id)
        .await
        .unwrap_err();
    assert!(matches!(demote_self, EngineError::Forbidden(_)));

    let delete_self = engine.delete_user(admin.id, admin.id).await.unwrap_err();
    assert!(matches!(delete_self, EngineError::Forbidden(_)));

    engine.delete_user(user.id, admin.id).await.unwrap();
    assert!(matches!(
        engine.user(user.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn provision_role_finds_users_by_email() {
    let engine = engine_with_db().await;
    register(&engine, "Ana", "ana@example.com").await;

    let admin = engine
        .provision_role("Ana@Example.com", UserRole::Admin)
        .await
        .unwrap();
    assert_eq!(admin.role, UserRole::Admin);
    assert!(engine.is_admin(admin.id).await.unwrap());
}

#[tokio::test]
async fn engine_needs_a_database() {
    let err = Engine::builder().build().await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}
