//! User and auth service unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};

use clean_api_core::domain::repository::{Comparison, FilterNode, Literal};
use clean_api_core::domain::{
    ConditionParser, Entity, Filter, Notification, PassthroughParser, Repository, SearchParams,
    SearchProps, SearchResult, UserEntity,
};
use clean_api_core::errors::{AppError, AppResult};
use clean_api_core::services::{AuthService, Authenticator, UserManager, UserService};

const USER_ID: &str = "4c3a3e58-08f3-4d39-9a3b-8a4f4c1b9f10";

mock! {
    pub UserRepo {}

    #[async_trait]
    impl Repository<UserEntity> for UserRepo {
        type Filter = Filter;

        fn notification(&self) -> &Notification;
        async fn insert(&self, entity: UserEntity) -> AppResult<UserEntity>;
        async fn update(&self, entity: UserEntity) -> AppResult<UserEntity>;
        async fn delete(&self, id: &str) -> AppResult<bool>;
        async fn find_by_id(&self, id: &str) -> AppResult<Option<UserEntity>>;
        async fn search(&self, params: SearchParams<Filter>) -> AppResult<SearchResult<UserEntity>>;
        async fn search_rows(&self, params: SearchParams<Filter>) -> AppResult<SearchResult<Value>>;
        async fn execute_sql(&self, sql: &str, params: Vec<Value>) -> AppResult<Vec<Value>>;
    }
}

fn parser() -> Arc<dyn ConditionParser<Output = Filter>> {
    Arc::new(PassthroughParser)
}

fn user_service(repo: MockUserRepo) -> UserManager<MockUserRepo> {
    UserManager::new(Arc::new(repo), parser())
}

fn auth_service(repo: MockUserRepo) -> Authenticator<MockUserRepo> {
    Authenticator::new(Arc::new(repo), parser())
}

/// A stored user whose password is the hash of `12345678`.
fn stored_user() -> UserEntity {
    let mut user = UserEntity::from_value(
        json!({
            "id": USER_ID,
            "name": "John",
            "email": "john@example.com",
            "password": "12345678",
            "createdAt": "2024-01-02T03:04:05.000Z"
        }),
        Notification::new(),
    )
    .unwrap();
    user.hash_password().unwrap();
    user
}

fn only_email_filter(params: &SearchParams<Filter>, email: &str) -> bool {
    match params.filter().map(Filter::groups) {
        Some([FilterNode::All(predicates)]) => {
            predicates.len() == 1
                && predicates[0].field == "email"
                && predicates[0].comparison == Comparison::Eq(Literal::Text(email.to_string()))
        }
        _ => false,
    }
}

// =============================================================================
// UserService
// =============================================================================

#[tokio::test]
async fn test_create_user_hashes_password_and_hides_it() {
    let mut repo = MockUserRepo::new();
    repo.expect_insert()
        .withf(|user| {
            user.password.as_deref().is_some_and(|p| p.starts_with("$argon2"))
                && user.verify_password("12345678")
        })
        .times(1)
        .returning(Ok);

    let created = user_service(repo)
        .create_user(json!({
            "name": "John",
            "email": "john@example.com",
            "password": "12345678"
        }))
        .await
        .unwrap();

    assert_eq!(created["name"], "John");
    assert_eq!(created["email"], "john@example.com");
    assert!(created.get("password").is_none());
    assert!(created.get("refreshToken").is_none());
    assert_eq!(created["id"].as_str().map(str::len), Some(36));
}

#[tokio::test]
async fn test_create_user_invalid_data_returns_422_without_insert() {
    let repo = MockUserRepo::new();

    let result = user_service(repo)
        .create_user(json!({ "email": "not-an-email", "password": "123" }))
        .await;

    let Err(AppError::Notification(error)) = result else {
        panic!("expected a notification error");
    };
    assert_eq!(error.code, 422);
    let errors = error.errors.unwrap();
    assert_eq!(
        errors.get("name").map(|e| e.messages.as_str()),
        Some("name should not be empty, name must be a string, name must be shorter than or equal to 100 characters")
    );
    assert!(errors.contains("email"));
    assert_eq!(
        errors.get("password").map(|e| e.messages.as_str()),
        Some("password must be longer than or equal to 8 characters")
    );
}

#[tokio::test]
async fn test_update_user_merges_patch() {
    let existing = stored_user();
    let existing_hash = existing.password.clone();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(existing.clone())));
    repo.expect_update()
        .withf(move |user| {
            user.id() == USER_ID
                && user.name.as_deref() == Some("Johnny")
                && user.email.as_deref() == Some("john@example.com")
                && user.password == existing_hash
                && user.created_at == "2024-01-02T03:04:05.000Z"
        })
        .times(1)
        .returning(Ok);

    let updated = user_service(repo)
        .update_user(USER_ID, json!({ "id": "other", "name": "Johnny" }))
        .await
        .unwrap();

    assert_eq!(updated["id"], USER_ID);
    assert_eq!(updated["name"], "Johnny");
    assert!(updated["updatedAt"].is_string());
}

#[tokio::test]
async fn test_update_user_rehashes_new_password() {
    let existing = stored_user();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    repo.expect_update()
        .withf(|user| user.verify_password("new-password") && !user.verify_password("12345678"))
        .times(1)
        .returning(Ok);

    let result = user_service(repo)
        .update_user(USER_ID, json!({ "password": "new-password" }))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_user_not_found() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let result = user_service(repo)
        .update_user(USER_ID, json!({ "name": "Johnny" }))
        .await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_update_user_requires_object() {
    let repo = MockUserRepo::new();

    let result = user_service(repo).update_user(USER_ID, json!(["name"])).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_find_user_strips_credentials() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .withf(|id| id == USER_ID)
        .returning(|_| Ok(Some(stored_user())));

    let user = user_service(repo).find_user(USER_ID).await.unwrap();

    assert_eq!(user["email"], "john@example.com");
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn test_delete_user_passes_through() {
    let mut repo = MockUserRepo::new();
    repo.expect_delete().times(1).returning(|_| Ok(false));

    assert!(!user_service(repo).delete_user(USER_ID).await.unwrap());
}

#[tokio::test]
async fn test_search_users_normalizes_and_strips() {
    let mut repo = MockUserRepo::new();
    repo.expect_search_rows()
        .withf(|params| {
            params.page() == Some(2)
                && params.per_page() == Some(15)
                && params.include().is_empty()
                && only_email_filter(params, "john@example.com")
        })
        .times(1)
        .returning(|params| {
            let row = json!({ "id": USER_ID, "email": "john@example.com", "password": "hash" });
            Ok(SearchResult::from_params(vec![row], 16, &params))
        });

    let props: SearchProps = serde_json::from_value(json!({
        "page": "2",
        "perPage": "abc",
        "filter": [{ "email": "john@example.com" }],
        "include": [{ "relation": "posts" }]
    }))
    .unwrap();

    let result = user_service(repo).search_users(props).await.unwrap();

    assert_eq!(result.total(), 16);
    assert_eq!(result.last_page(), 2);
    assert_eq!(result.items()[0], json!({ "id": USER_ID, "email": "john@example.com" }));
}

#[tokio::test]
async fn test_search_users_rejects_malformed_filter() {
    let repo = MockUserRepo::new();
    let props = SearchProps {
        filter: json!({ "email": "john@example.com" }),
        ..SearchProps::default()
    };

    let result = user_service(repo).search_users(props).await;
    assert!(matches!(result, Err(AppError::Filter(_))));
}

// =============================================================================
// AuthService
// =============================================================================

#[tokio::test]
async fn test_sign_up_rejects_taken_email() {
    let mut repo = MockUserRepo::new();
    repo.expect_search()
        .withf(|params| only_email_filter(params, "john@example.com"))
        .returning(|params| Ok(SearchResult::from_params(vec![stored_user()], 1, &params)));

    let result = auth_service(repo)
        .sign_up(json!({
            "name": "John",
            "email": "john@example.com",
            "password": "12345678"
        }))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_sign_up_stores_new_user() {
    let mut repo = MockUserRepo::new();
    repo.expect_search()
        .returning(|params| Ok(SearchResult::from_params(Vec::new(), 0, &params)));
    repo.expect_insert().times(1).returning(Ok);

    let user = auth_service(repo)
        .sign_up(json!({
            "name": "Maria",
            "email": "maria@example.com",
            "password": "12345678"
        }))
        .await
        .unwrap();

    assert_eq!(user["email"], "maria@example.com");
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn test_sign_in_success() {
    let mut repo = MockUserRepo::new();
    repo.expect_search()
        .returning(|params| Ok(SearchResult::from_params(vec![stored_user()], 1, &params)));

    let user = auth_service(repo)
        .sign_in(json!({ "email": "john@example.com", "password": "12345678" }))
        .await
        .unwrap();

    assert_eq!(user["id"], USER_ID);
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let mut repo = MockUserRepo::new();
    repo.expect_search()
        .returning(|params| Ok(SearchResult::from_params(vec![stored_user()], 1, &params)));

    let result = auth_service(repo)
        .sign_in(json!({ "email": "john@example.com", "password": "wrong-password" }))
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_sign_in_unknown_email() {
    let mut repo = MockUserRepo::new();
    repo.expect_search()
        .returning(|params| Ok(SearchResult::from_params(Vec::new(), 0, &params)));

    let result = auth_service(repo)
        .sign_in(json!({ "email": "nobody@example.com", "password": "12345678" }))
        .await;

    let Err(error) = result else {
        panic!("expected an error");
    };
    assert_eq!(error.to_string(), "Email not registered");
    assert_eq!(error.status(), http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_validates_credentials_first() {
    let repo = MockUserRepo::new();

    let result = auth_service(repo).sign_in(json!({ "email": "john@example.com" })).await;

    let Err(AppError::Notification(error)) = result else {
        panic!("expected a notification error");
    };
    assert_eq!(error.code, 422);
    assert!(error.errors.unwrap().contains("password"));
}
