//! Integration tests for the full auth flow: register, login, resolve,
//! gate, logout, across both store implementations.

use std::sync::Arc;

use quill::prelude::*;
use quill::{
    AuthPolicy, NewIdentity, PasswordConfig, SessionConfig, SessionState, StoreError,
    StoredCredential,
};

// =========================================================================
// Helpers
// =========================================================================

fn fast_config() -> QuillConfig {
    QuillConfig {
        password: PasswordConfig::minimal(),
        ..QuillConfig::default()
    }
}

fn service() -> AuthService<MemoryCredentialStore> {
    AuthService::in_memory(fast_config()).unwrap()
}

/// Registers Alice (id 1, admin) and Bob (id 2), each on their own context.
async fn alice_and_bob(
    auth: &AuthService<MemoryCredentialStore>,
) -> (RequestContext, RequestContext) {
    let mut alice = RequestContext::anonymous();
    auth.register(&mut alice, "Alice", "a@x.com", "pw1").await.unwrap();
    let mut bob = RequestContext::anonymous();
    auth.register(&mut bob, "Bob", "b@x.com", "pw2").await.unwrap();
    (alice, bob)
}

/// A store whose backend is always down.
struct DownStore;

fn down() -> StoreError {
    StoreError::Unavailable(std::io::Error::other("connection refused"))
}

impl CredentialStore for DownStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<Identity>, StoreError> {
        Err(down())
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<Identity>, StoreError> {
        Err(down())
    }

    async fn credential_for(
        &self,
        _email: &str,
    ) -> Result<Option<StoredCredential>, StoreError> {
        Err(down())
    }

    async fn create(&self, _new: NewIdentity) -> Result<Identity, StoreError> {
        Err(down())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Err(down())
    }
}

// =========================================================================
// Registration
// =========================================================================

#[tokio::test]
async fn test_register_first_user_is_admin_and_logged_in() {
    let auth = service();
    let mut ctx = RequestContext::anonymous();

    let alice = auth.register(&mut ctx, "Alice", "a@x.com", "pw1").await.unwrap();

    assert_eq!(alice.id, UserId(1));
    assert_eq!(alice.role, Role::Admin);
    assert_eq!(auth.current_identity(&ctx).await.unwrap(), Some(alice));
}

#[tokio::test]
async fn test_register_duplicate_email_rejected_and_count_unchanged() {
    let auth = service();
    let mut first = RequestContext::anonymous();
    auth.register(&mut first, "Alice", "a@x.com", "pw1").await.unwrap();

    let mut second = RequestContext::anonymous();
    let result = auth.register(&mut second, "Mallory", "a@x.com", "other").await;

    assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    assert_eq!(auth.store().count().await.unwrap(), 1);
    assert!(second.token().is_none());

    // The original password still works; nothing was overwritten.
    let mut again = RequestContext::anonymous();
    let alice = auth.login(&mut again, "a@x.com", "pw1").await.unwrap();
    assert_eq!(alice.name, "Alice");
}

#[tokio::test]
async fn test_register_invalid_input_creates_nothing() {
    let auth = service();
    let mut ctx = RequestContext::anonymous();

    let result = auth.register(&mut ctx, "", "a@x.com", "pw1").await;

    assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    assert_eq!(auth.store().count().await.unwrap(), 0);
    assert!(ctx.token().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_register_concurrent_same_email_creates_one_identity() {
    let auth = Arc::new(service());

    let mut handles = Vec::new();
    for i in 0..8 {
        let auth = Arc::clone(&auth);
        handles.push(tokio::spawn(async move {
            let mut ctx = RequestContext::anonymous();
            auth.register(&mut ctx, &format!("Racer{i}"), "race@x.com", "pw")
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::DuplicateEmail) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(auth.store().count().await.unwrap(), 1);
}

// =========================================================================
// Login / logout
// =========================================================================

#[tokio::test]
async fn test_login_wrong_password_leaves_client_anonymous() {
    let auth = service();
    alice_and_bob(&auth).await;
    let mut ctx = RequestContext::anonymous();

    let result = auth.login(&mut ctx, "a@x.com", "nope").await;

    assert!(matches!(result, Err(AuthError::WrongPassword)));
    assert_eq!(auth.current_identity(&ctx).await.unwrap(), None);
}

#[tokio::test]
async fn test_login_unknown_email_returns_user_not_found() {
    let auth = service();
    let mut ctx = RequestContext::anonymous();

    let result = auth.login(&mut ctx, "ghost@x.com", "pw").await;

    assert!(matches!(result, Err(AuthError::UserNotFound)));
    assert_eq!(
        result.unwrap_err().user_message(),
        "User not found, please check what you wrote"
    );
}

#[tokio::test]
async fn test_login_then_logout_resolves_to_none() {
    let auth = service();
    alice_and_bob(&auth).await;
    let mut ctx = RequestContext::anonymous();

    let alice = auth.login(&mut ctx, "a@x.com", "pw1").await.unwrap();
    assert_eq!(auth.current_identity(&ctx).await.unwrap(), Some(alice));

    auth.logout(&mut ctx).await;

    assert_eq!(auth.current_identity(&ctx).await.unwrap(), None);
    assert_eq!(auth.session_state(&ctx).await, SessionState::Anonymous);
}

#[tokio::test]
async fn test_logout_replayed_token_stays_dead() {
    let auth = service();
    let (mut alice, _bob) = alice_and_bob(&auth).await;
    let stolen = alice.token().cloned().unwrap();

    auth.logout(&mut alice).await;

    let replay = RequestContext::with_token(stolen);
    assert_eq!(auth.current_identity(&replay).await.unwrap(), None);
}

#[tokio::test]
async fn test_logout_anonymous_is_noop() {
    let auth = service();
    let mut ctx = RequestContext::anonymous();

    auth.logout(&mut ctx).await;
    auth.logout(&mut ctx).await;

    assert!(ctx.token().is_none());
}

#[tokio::test]
async fn test_logout_everywhere_ends_all_devices() {
    let auth = service();
    let (laptop, _bob) = alice_and_bob(&auth).await;
    let mut phone = RequestContext::anonymous();
    auth.login(&mut phone, "a@x.com", "pw1").await.unwrap();

    let ended = auth.logout_everywhere(UserId(1)).await;

    assert_eq!(ended, 2);
    assert_eq!(auth.current_identity(&laptop).await.unwrap(), None);
    assert_eq!(auth.current_identity(&phone).await.unwrap(), None);
}

#[tokio::test]
async fn test_forged_cookie_resolves_to_none() {
    let auth = service();
    alice_and_bob(&auth).await;

    let garbage = RequestContext::from_cookie(Some("not-a-token"));
    let well_formed = RequestContext::from_cookie(Some(&"ab".repeat(32)));

    assert_eq!(auth.current_identity(&garbage).await.unwrap(), None);
    assert_eq!(auth.current_identity(&well_formed).await.unwrap(), None);
}

// =========================================================================
// Expiry
// =========================================================================

#[tokio::test]
async fn test_expired_session_resolves_to_none() {
    let config = QuillConfig {
        session: SessionConfig {
            ttl_secs: 0,
            ..SessionConfig::default()
        },
        ..fast_config()
    };
    let auth = AuthService::in_memory(config).unwrap();
    let mut ctx = RequestContext::anonymous();

    auth.register(&mut ctx, "Alice", "a@x.com", "pw1").await.unwrap();

    assert_eq!(auth.current_identity(&ctx).await.unwrap(), None);
    assert!(matches!(
        auth.require(&ctx, AuthorizationRequirement::AuthenticatedOnly).await,
        Err(AuthError::NotAuthenticated)
    ));
    assert_eq!(auth.sweep_expired_sessions().await, 1);
    assert_eq!(auth.session_count().await, 0);
}

#[tokio::test]
async fn test_sweep_keeps_live_sessions() {
    let auth = service();
    let (alice, _bob) = alice_and_bob(&auth).await;

    assert_eq!(auth.sweep_expired_sessions().await, 0);
    assert_eq!(auth.session_count().await, 2);
    assert!(auth.current_identity(&alice).await.unwrap().is_some());
}

// =========================================================================
// Gate
// =========================================================================

#[tokio::test]
async fn test_require_admin_only_policy_table() {
    let auth = service();
    let (alice, bob) = alice_and_bob(&auth).await;
    let nobody = RequestContext::anonymous();

    let admin = auth
        .require(&alice, AuthorizationRequirement::AdminOnly)
        .await
        .unwrap();
    assert_eq!(admin.map(|who| who.id), Some(UserId(1)));

    let forbidden = auth.require(&bob, AuthorizationRequirement::AdminOnly).await;
    assert!(matches!(forbidden, Err(AuthError::Forbidden)));

    let anonymous = auth.require(&nobody, AuthorizationRequirement::AdminOnly).await;
    assert!(matches!(anonymous, Err(AuthError::NotAuthenticated)));
}

#[tokio::test]
async fn test_require_public_allows_anonymous() {
    let auth = service();
    let nobody = RequestContext::anonymous();

    let who = auth
        .require(&nobody, AuthorizationRequirement::Public)
        .await
        .unwrap();

    assert_eq!(who, None);
}

#[tokio::test]
async fn test_require_denial_maps_to_rejection() {
    let auth = service();
    let (_alice, bob) = alice_and_bob(&auth).await;
    let nobody = RequestContext::anonymous();

    let redirect = auth
        .require(&nobody, AuthorizationRequirement::AuthenticatedOnly)
        .await
        .unwrap_err()
        .rejection(Some("/new-post"))
        .unwrap();
    assert_eq!(redirect.status_code(), 302);
    assert!(redirect.location().unwrap().starts_with("/login"));

    let denied = auth
        .require(&bob, AuthorizationRequirement::AdminOnly)
        .await
        .unwrap_err()
        .rejection(Some("/delete/1"))
        .unwrap();
    assert_eq!(denied, Rejection::AccessDenied);
    assert_eq!(denied.status_code(), 403);
}

// =========================================================================
// Policy
// =========================================================================

#[tokio::test]
async fn test_unified_login_errors_hide_which_emails_exist() {
    let config = QuillConfig {
        policy: AuthPolicy {
            unify_login_errors: true,
            ..AuthPolicy::default()
        },
        ..fast_config()
    };
    let auth = AuthService::in_memory(config).unwrap();
    let mut alice = RequestContext::anonymous();
    auth.register(&mut alice, "Alice", "a@x.com", "pw1").await.unwrap();
    let mut ctx = RequestContext::anonymous();

    let unknown = auth.login(&mut ctx, "ghost@x.com", "pw1").await.unwrap_err();
    let wrong = auth.login(&mut ctx, "a@x.com", "nope").await.unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown.user_message(), "Invalid email or password");
}

#[tokio::test]
async fn test_custom_admin_id_promotes_that_identity() {
    let config = QuillConfig {
        policy: AuthPolicy {
            admin_id: 2,
            ..AuthPolicy::default()
        },
        ..fast_config()
    };
    let auth = AuthService::in_memory(config).unwrap();
    let mut first = RequestContext::anonymous();
    let mut second = RequestContext::anonymous();
    auth.register(&mut first, "First", "1@x.com", "pw").await.unwrap();
    let second_id = auth.register(&mut second, "Second", "2@x.com", "pw").await.unwrap();

    assert_eq!(second_id.role, Role::Admin);
    assert!(matches!(
        auth.require(&first, AuthorizationRequirement::AdminOnly).await,
        Err(AuthError::Forbidden)
    ));
}

// =========================================================================
// Store failures and persistence
// =========================================================================

#[tokio::test]
async fn test_store_down_surfaces_store_unavailable() {
    let auth = AuthService::new(DownStore, fast_config()).unwrap();
    let mut ctx = RequestContext::anonymous();

    let register = auth.register(&mut ctx, "Alice", "a@x.com", "pw1").await;
    let login = auth.login(&mut ctx, "a@x.com", "pw1").await;

    for result in [register, login] {
        let err = result.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
        assert!(!err.is_recoverable());
    }
    assert!(ctx.token().is_none());
}

#[tokio::test]
async fn test_json_file_identities_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    {
        let auth = AuthService::open_json_file(&path, fast_config()).await.unwrap();
        let mut ctx = RequestContext::anonymous();
        auth.register(&mut ctx, "Alice", "a@x.com", "pw1").await.unwrap();
    }

    let auth = AuthService::open_json_file(&path, fast_config()).await.unwrap();
    let mut ctx = RequestContext::anonymous();

    // Sessions are in memory, so nobody is logged in after a restart.
    assert_eq!(auth.session_count().await, 0);

    let alice = auth.login(&mut ctx, "a@x.com", "pw1").await.unwrap();
    assert_eq!(alice.id, UserId(1));
    assert_eq!(alice.role, Role::Admin);

    let mut bob = RequestContext::anonymous();
    let bob_id = auth.register(&mut bob, "Bob", "b@x.com", "pw2").await.unwrap();
    assert_eq!(bob_id.id, UserId(2));
}

#[tokio::test]
async fn test_json_file_never_contains_plaintext_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let auth = AuthService::open_json_file(&path, fast_config()).await.unwrap();
    let mut ctx = RequestContext::anonymous();

    auth.register(&mut ctx, "Alice", "a@x.com", "hunter2-secret")
        .await
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("hunter2-secret"));
    assert!(text.contains("$argon2id$"));
}
