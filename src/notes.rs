// notes.rs - in-memory `notes` resource and user directory served by the binary
use std::collections::HashMap;

use async_trait::async_trait;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use rest_base::prelude::*;

/// Hex SHA-256 of a password
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub struct User {
    pub record: SecuredRecord<Uuid>,
    pub username: String,
    pub password_digest: String,
    pub authorities: Vec<String>,
}

/// Users keyed by username
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn with_admin(password: &str) -> Result<Self, ApiError> {
        let mut directory = Self {
            users: HashMap::new(),
        };
        directory.add_user(
            "admin",
            password,
            vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()],
            SecurityFlags::active(),
        )?;
        Ok(directory)
    }

    /// Register a user with the given flags; an existing username is replaced
    pub fn add_user(
        &mut self,
        username: &str,
        password: &str,
        authorities: Vec<String>,
        flags: SecurityFlags,
    ) -> Result<Uuid, ApiError> {
        let id = Uuid::new_v4();
        let user = User {
            record: SecuredRecord::new(id, flags).with_id(id)?,
            username: username.to_string(),
            password_digest: password_digest(password),
            authorities,
        };
        self.users.insert(user.username.clone(), user);
        Ok(id)
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn id_of(&self, principal: &Principal) -> Result<Uuid, ApiError> {
        self.get(&principal.subject)
            .and_then(|user| user.record.id().copied())
            .ok_or_else(|| ApiError::unauthorized(message::UNAUTHORIZED))
    }
}

#[async_trait]
impl PrincipalLoader for UserDirectory {
    async fn load_principal(&self, identity: &str) -> Result<Principal, ApiError> {
        let user = self
            .get(identity)
            .ok_or_else(|| ApiError::unauthorized(format!("User '{}' not found", identity)))?;

        let record = &user.record;
        if record.is_deleted() || record.is_locked() || record.is_expired() || !record.is_active() {
            return Err(ApiError::unauthorized(format!("User '{}' is not active", identity)));
        }

        Ok(Principal::new(&user.username, user.authorities.clone())
            .with_credentials(&user.password_digest))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct LoginState {
    pub users: std::sync::Arc<UserDirectory>,
    pub jwt: JwtService,
}

/// POST /auth/login
pub async fn login(
    State(state): State<LoginState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let username = request
        .username
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::required("username"))?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::required("password"))?;

    let user = state
        .users
        .get(&username)
        .filter(|user| user.password_digest == password_digest(&password))
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;
    state.users.load_principal(&user.username).await?;

    let token = state.jwt.generate_access_token(&user.username)?;
    tracing::info!("Issued access token for '{}'", user.username);
    Ok(ServerResponse::login("Login successful", token))
}

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    #[serde(flatten)]
    pub record: AuditableRecord<Uuid>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct NoteSummary {
    pub id: Option<Uuid>,
    pub title: String,
    pub updated_date: Option<String>,
}

impl From<&Note> for NoteSummary {
    fn from(note: &Note) -> Self {
        Self {
            id: note.record.id().copied(),
            title: note.title.clone(),
            updated_date: note.record.updated_date(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub struct NotesService {
    users: std::sync::Arc<UserDirectory>,
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl NotesService {
    pub fn new(users: std::sync::Arc<UserDirectory>) -> Self {
        Self {
            users,
            notes: RwLock::new(HashMap::new()),
        }
    }

    fn not_found(id: Uuid) -> ApiError {
        ApiError::validation(format!("Note '{}' not found", id))
    }

    async fn get(&self, id: Uuid) -> ApiResult<Note> {
        self.notes.read().await.get(&id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn ordered(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.notes.read().await.values().cloned().collect();
        notes.sort_by_key(|note| note.record.created_time());
        notes
    }
}

impl Resource for NotesService {
    type Id = Uuid;
    type Body = NoteBody;
}

#[async_trait]
impl CreateService for NotesService {
    type Created = ServerResponse;

    fn validate_create(&self, body: &NoteBody) -> ApiResult<()> {
        match body.title.as_deref() {
            Some(title) if !title.trim().is_empty() => Ok(()),
            _ => Err(self.required("title")),
        }
    }

    async fn create(&self, ctx: &RequestContext, body: NoteBody) -> ApiResult<ServerResponse> {
        let author = self.users.id_of(ctx.principal()?)?;
        let id = Uuid::new_v4();
        let note = Note {
            record: AuditableRecord::new(author).with_id(id)?,
            title: body.title.unwrap_or_default(),
            content: body.content.unwrap_or_default(),
        };

        self.notes.write().await.insert(id, note);
        Ok(ServerResponse::created(format!("Note '{}' created", id)))
    }
}

#[async_trait]
impl FindService for NotesService {
    type Record = Note;
    type Projection = NoteSummary;

    async fn find_by_id(&self, _ctx: &RequestContext, id: Uuid) -> ApiResult<Note> {
        self.get(id).await
    }

    async fn find_projection(&self, _ctx: &RequestContext, id: Uuid) -> ApiResult<NoteSummary> {
        self.get(id).await.map(|note| NoteSummary::from(&note))
    }
}

#[async_trait]
impl FindAllService for NotesService {
    type Item = Note;

    async fn find_all(&self, _ctx: &RequestContext) -> ApiResult<Vec<Note>> {
        Ok(self.ordered().await)
    }

    async fn find_page(&self, _ctx: &RequestContext, request: PageRequest) -> ApiResult<Page<Note>> {
        Ok(Page::from_items(self.ordered().await, request))
    }
}

#[async_trait]
impl UpdateService for NotesService {
    type Updated = Json<Note>;

    fn validate_update(&self, _id: &Uuid, body: &NoteBody) -> ApiResult<()> {
        if body.title.is_none() && body.content.is_none() {
            return Err(self.message("Nothing to update"));
        }
        if matches!(body.title.as_deref(), Some(title) if title.trim().is_empty()) {
            return Err(self.required("title"));
        }
        Ok(())
    }

    async fn update(&self, ctx: &RequestContext, id: Uuid, body: NoteBody) -> ApiResult<Json<Note>> {
        let editor = self.users.id_of(ctx.principal()?)?;
        let mut notes = self.notes.write().await;
        let current = notes.get(&id).cloned().ok_or_else(|| Self::not_found(id))?;

        let updated = Note {
            record: current.record.touched_by(editor),
            title: body.title.unwrap_or(current.title),
            content: body.content.unwrap_or(current.content),
        };
        notes.insert(id, updated.clone());
        Ok(Json(updated))
    }
}

#[async_trait]
impl DeleteService for NotesService {
    type Deleted = ServerResponse;

    async fn delete_by_id(&self, ctx: &RequestContext, id: Uuid) -> ApiResult<ServerResponse> {
        ctx.principal()?;
        match self.notes.write().await.remove(&id) {
            Some(_) => Ok(ServerResponse::ok(format!("Note '{}' deleted", id))),
            None => Err(Self::not_found(id)),
        }
    }
}
