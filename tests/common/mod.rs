#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{Method, Request, Uri, request::Parts};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use tokio::net::TcpListener;
use uuid::Uuid;
use wishlist_portal::{
    AppState,
    config::AppConfig,
    create_router,
    evidence::Claims,
    models::{AccountStatus, Role, User, Wishlist},
    repository::{RepoError, Repository, RepositoryState},
};

/// The secret spawned apps validate tokens against. Derived from the same
/// default config the scaffolding hands to `AppState`, so the two can never
/// drift apart.
pub fn test_jwt_secret() -> String {
    AppConfig::default().jwt_secret
}

// --- Mock Repository ---

/// In-memory repository standing in for Postgres. Failure flags let tests
/// drive the 500 paths of the gates.
#[derive(Default)]
pub struct MockRepo {
    pub users: Mutex<HashMap<String, User>>,
    pub wishlists: Mutex<HashMap<String, Wishlist>>,
    pub fail_user_lookup: bool,
    pub fail_wishlist_owner: bool,
}

impl MockRepo {
    pub fn with_users(users: Vec<User>) -> Self {
        MockRepo {
            users: Mutex::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
            ..Default::default()
        }
    }

    pub fn add_wishlist(&self, wishlist: Wishlist) {
        self.wishlists
            .lock()
            .unwrap()
            .insert(wishlist.id.clone(), wishlist);
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepoError> {
        if self.fail_user_lookup {
            return Err(RepoError::Unavailable("user store offline".to_string()));
        }
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    async fn set_user_role(&self, id: &str, role: Role) -> Result<Option<User>, RepoError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.get_mut(id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn set_user_status(
        &self,
        id: &str,
        status: AccountStatus,
    ) -> Result<Option<User>, RepoError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.get_mut(id).map(|user| {
            user.status = status;
            user.clone()
        }))
    }

    async fn delete_user(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self.users.lock().unwrap().remove(id).is_some())
    }

    async fn wishlists_for(&self, user_id: &str) -> Result<Vec<Wishlist>, RepoError> {
        Ok(self
            .wishlists
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_wishlist(&self, user_id: &str, title: String) -> Result<Wishlist, RepoError> {
        let wishlist = Wishlist {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title,
            created_at: Utc::now(),
        };
        self.add_wishlist(wishlist.clone());
        Ok(wishlist)
    }

    async fn get_wishlist(&self, id: &str) -> Result<Option<Wishlist>, RepoError> {
        Ok(self.wishlists.lock().unwrap().get(id).cloned())
    }

    async fn wishlist_owner(&self, id: &str) -> Result<Option<String>, RepoError> {
        if self.fail_wishlist_owner {
            return Err(RepoError::Unavailable(
                "wishlist store offline".to_string(),
            ));
        }
        Ok(self
            .wishlists
            .lock()
            .unwrap()
            .get(id)
            .map(|w| w.user_id.clone()))
    }

    async fn delete_wishlist(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self.wishlists.lock().unwrap().remove(id).is_some())
    }
}

// --- Fixtures ---

pub fn user(id: &str, role: Role, status: AccountStatus) -> User {
    User {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
        role,
        status,
        first_name: Some("Test".to_string()),
        last_name: Some(id.to_string()),
    }
}

pub fn approved(id: &str, role: Role) -> User {
    user(id, role, AccountStatus::Approved)
}

pub fn wishlist(id: &str, owner: &str) -> Wishlist {
    Wishlist {
        id: id.to_string(),
        user_id: owner.to_string(),
        title: format!("{id} title"),
        created_at: Utc::now(),
    }
}

// --- App Scaffolding ---

pub fn create_app_state(repo: MockRepo) -> AppState {
    AppState {
        repo: Arc::new(repo) as RepositoryState,
        config: AppConfig::default(),
    }
}

pub struct TestApp {
    pub address: String,
}

/// Spawns the full router on an ephemeral port: a real HTTP server so
/// gates, layers, and routing compose exactly as in production.
pub async fn spawn_app(repo: MockRepo) -> TestApp {
    let router = create_router(create_app_state(repo));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

// --- Token & Request Helpers ---

pub fn create_token(sub: Option<&str>, uid: Option<&str>, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: sub.map(|s| s.to_string()),
        uid: uid.map(|s| s.to_string()),
        iat: now,
        exp: now + 3600,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

pub fn bearer_for(user_id: &str) -> String {
    format!(
        "Bearer {}",
        create_token(Some(user_id), None, &test_jwt_secret())
    )
}

/// Builds the request `Parts` gate-level tests operate on directly.
pub fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}
