//! Common Test Utilities
//!
//! In-memory store adapters, file storage and credentials with fault
//! injection, plus a harness that wires them into an [`Orchestrator`].
//!
//! Fake transactions stage their writes and apply them only on commit, so
//! rolled back or abandoned work is never visible to later reads.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use parking_lot::Mutex;

use tranquility::application::services::{
    AttachmentServiceImpl, AuthServiceImpl, GuildServiceImpl,
};
use tranquility::application::Orchestrator;
use tranquility::domain::{
    Attachment, AttachmentRepository, AuthRepository, AuthUser, Channel, CredentialService,
    FileStorage, Guild, GuildMember, GuildRepository, StoredFile, Transaction,
};
use tranquility::shared::{AppError, RequestContext};

/// Shared record of collaborator calls, in call order.
pub type Events = Arc<Mutex<Vec<&'static str>>>;

fn injected(what: &str) -> AppError {
    AppError::Internal(format!("injected {} failure", what))
}

// ============================================================================
// Transactions
// ============================================================================

/// Counters and faults shared by every transaction a store hands out.
#[derive(Default)]
pub struct TxLog {
    pub begun: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    /// Dropped without commit or rollback
    pub abandoned: AtomicUsize,
    pub fail_commit: AtomicBool,
    pub fail_rollback: AtomicBool,
}

impl TxLog {
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Every begun transaction ended in exactly one commit or rollback.
    pub fn all_finished(&self) -> bool {
        self.abandoned() == 0 && self.begun() == self.commits() + self.rollbacks()
    }
}

type Staged = Box<dyn FnOnce() + Send>;

pub struct FakeTx {
    log: Arc<TxLog>,
    events: Events,
    staged: Vec<Staged>,
    finished: bool,
}

impl FakeTx {
    fn begin(log: &Arc<TxLog>, events: &Events) -> Self {
        log.begun.fetch_add(1, Ordering::SeqCst);
        Self {
            log: Arc::clone(log),
            events: Arc::clone(events),
            staged: Vec::new(),
            finished: false,
        }
    }

    fn stage(&mut self, op: impl FnOnce() + Send + 'static) {
        self.staged.push(Box::new(op));
    }
}

#[async_trait]
impl Transaction for FakeTx {
    async fn commit(mut self) -> Result<(), AppError> {
        self.finished = true;
        self.log.commits.fetch_add(1, Ordering::SeqCst);
        self.events.lock().push("tx.commit");
        if self.log.fail_commit.load(Ordering::SeqCst) {
            return Err(injected("commit"));
        }
        for op in std::mem::take(&mut self.staged) {
            op();
        }
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), AppError> {
        self.finished = true;
        self.staged.clear();
        self.log.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.events.lock().push("tx.rollback");
        if self.log.fail_rollback.load(Ordering::SeqCst) {
            return Err(injected("rollback"));
        }
        Ok(())
    }
}

impl Drop for FakeTx {
    fn drop(&mut self) {
        if !self.finished {
            self.log.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ============================================================================
// Credential store
// ============================================================================

#[derive(Default)]
pub struct FakeAuthStore {
    users: Mutex<Vec<AuthUser>>,
    next_id: AtomicI64,
    rotations: AtomicUsize,
    pub lookups: AtomicUsize,
    pub fail_insert: AtomicBool,
    pub fail_rotate: AtomicBool,
}

impl FakeAuthStore {
    /// Insert a user directly, bypassing registration.
    pub fn seed(&self, username: &str, password_hash: &str) -> AuthUser {
        let user = AuthUser {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: username.into(),
            password: password_hash.into(),
            ..Default::default()
        };
        let user = self.rotate(user);
        self.users.lock().push(user.clone());
        user
    }

    pub fn stored(&self, username: &str) -> Option<AuthUser> {
        self.users
            .lock()
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.users.lock().len()
    }

    fn rotate(&self, mut user: AuthUser) -> AuthUser {
        let n = self.rotations.fetch_add(1, Ordering::SeqCst);
        user.refresh_token = format!("rt-{}-{}", user.id, n);
        user
    }

    fn update(&self, pick: impl Fn(&AuthUser) -> bool) -> Option<AuthUser> {
        let mut users = self.users.lock();
        let slot = users.iter_mut().find(|u| pick(u))?;
        *slot = self.rotate(slot.clone());
        Some(slot.clone())
    }
}

#[async_trait]
impl AuthRepository for FakeAuthStore {
    async fn fetch_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<AuthUser, AppError> {
        ctx.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.stored(username)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))
    }

    async fn rotate_refresh_token(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<String, AppError> {
        ctx.check()?;
        if self.fail_rotate.load(Ordering::SeqCst) {
            return Err(injected("refresh token rotation"));
        }
        self.update(|u| u.id == id)
            .map(|u| u.refresh_token)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn insert(&self, ctx: &RequestContext, user: &AuthUser) -> Result<AuthUser, AppError> {
        ctx.check()?;
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(injected("insert"));
        }

        let mut users = self.users.lock();
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(
                "User with this username already exists".into(),
            ));
        }

        let mut created = user.clone();
        created.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        created.confirm_password.clear();
        let mut created = self.rotate(created);
        users.push(created.clone());

        // The hash is not part of what an insert hands back
        created.password.clear();
        Ok(created)
    }

    async fn fetch_by_refresh_token(
        &self,
        ctx: &RequestContext,
        id: i64,
        refresh_token: &str,
    ) -> Result<AuthUser, AppError> {
        ctx.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.update(|u| u.id == id && u.refresh_token == refresh_token)
            .ok_or_else(|| AppError::NotFound(format!("No session for user {}", id)))
    }
}

/// Deterministic credentials: `hashed:<password>` hashes, readable tokens.
#[derive(Default)]
pub struct FakeCredentials;

#[async_trait]
impl CredentialService for FakeCredentials {
    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        Ok(format!("hashed:{}", password))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        match hash.strip_prefix("hashed:") {
            Some(expected) => Ok(expected == password),
            None => Err(AppError::Internal("malformed hash".into())),
        }
    }

    async fn issue_token(&self, user: &AuthUser) -> Result<String, AppError> {
        Ok(format!("token:{}:{}", user.id, user.username))
    }
}

mock! {
    pub Credentials {}

    #[async_trait]
    impl CredentialService for Credentials {
        async fn hash_password(&self, password: &str) -> Result<String, AppError>;
        async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError>;
        async fn issue_token(&self, user: &AuthUser) -> Result<String, AppError>;
    }
}

// ============================================================================
// Attachment store and file storage
// ============================================================================

pub struct FakeAttachmentStore {
    rows: Arc<Mutex<Vec<Attachment>>>,
    next_id: AtomicI64,
    pub tx: Arc<TxLog>,
    pub fail_insert: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Inserts persist the row, then take this long to acknowledge
    pub ack_delay: Mutex<Option<Duration>>,
    events: Events,
}

impl FakeAttachmentStore {
    pub fn new(events: &Events) -> Self {
        Self {
            rows: Arc::default(),
            next_id: AtomicI64::new(0),
            tx: Arc::default(),
            fail_insert: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            ack_delay: Mutex::new(None),
            events: Arc::clone(events),
        }
    }

    pub fn rows(&self) -> Vec<Attachment> {
        self.rows.lock().clone()
    }

    pub fn find(&self, id: i64) -> Option<Attachment> {
        self.rows.lock().iter().find(|a| a.id == id).cloned()
    }
}

#[async_trait]
impl AttachmentRepository for FakeAttachmentStore {
    type Tx = FakeTx;

    async fn insert(
        &self,
        ctx: &RequestContext,
        attachment: &Attachment,
    ) -> Result<Attachment, AppError> {
        ctx.check()?;
        self.events.lock().push("attachments.insert");
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(injected("attachment insert"));
        }

        let mut created = attachment.clone();
        created.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        created.created_at = Some(chrono::Utc::now());
        self.rows.lock().push(created.clone());

        let delay = *self.ack_delay.lock();
        if let Some(delay) = delay {
            ctx.run(async {
                tokio::time::sleep(delay).await;
                Ok(())
            })
            .await?;
        }
        Ok(created)
    }

    async fn delete_scoped(
        &self,
        ctx: &RequestContext,
        file_id: i64,
        user_id: i64,
    ) -> Result<(FakeTx, String), AppError> {
        ctx.check()?;
        self.events.lock().push("attachments.delete_scoped");
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("attachment delete"));
        }

        let mut tx = FakeTx::begin(&self.tx, &self.events);
        let file_name = self
            .rows
            .lock()
            .iter()
            .find(|a| a.id == file_id && a.user_id == user_id)
            .map(|a| a.file_name.clone())
            .unwrap_or_default();

        if !file_name.is_empty() {
            let rows = Arc::clone(&self.rows);
            tx.stage(move || rows.lock().retain(|a| a.id != file_id));
        }
        Ok((tx, file_name))
    }
}

/// In-memory blob store.
pub struct FakeFileStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    counter: AtomicUsize,
    pub fail_store: AtomicBool,
    pub fail_delete: AtomicBool,
    events: Events,
}

impl FakeFileStorage {
    pub fn new(events: &Events) -> Self {
        Self {
            blobs: Mutex::default(),
            counter: AtomicUsize::new(0),
            fail_store: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            events: Arc::clone(events),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blobs.lock().contains_key(name)
    }

    pub fn blob(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }
}

#[async_trait]
impl FileStorage for FakeFileStorage {
    async fn store(&self, blob: &[u8], requested_name: &str) -> Result<StoredFile, AppError> {
        self.events.lock().push("storage.store");
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(injected("store"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let name = format!("{}-{}", n, requested_name);
        self.blobs.lock().insert(name.clone(), blob.to_vec());
        Ok(StoredFile {
            path: format!("/blobs/{}", name),
            name,
        })
    }

    async fn delete(&self, stored_name: &str) -> Result<(), AppError> {
        self.events.lock().push("storage.delete");
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("file delete"));
        }
        self.blobs
            .lock()
            .remove(stored_name)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", stored_name)))
    }
}

/// Storage whose calls never complete.
pub struct StallingStorage;

#[async_trait]
impl FileStorage for StallingStorage {
    async fn store(&self, _blob: &[u8], _requested_name: &str) -> Result<StoredFile, AppError> {
        std::future::pending().await
    }

    async fn delete(&self, _stored_name: &str) -> Result<(), AppError> {
        std::future::pending().await
    }
}

mock! {
    pub Storage {}

    #[async_trait]
    impl FileStorage for Storage {
        async fn store(&self, blob: &[u8], requested_name: &str) -> Result<StoredFile, AppError>;
        async fn delete(&self, stored_name: &str) -> Result<(), AppError>;
    }
}

// ============================================================================
// Guild store
// ============================================================================

#[derive(Default)]
struct GuildState {
    guilds: Vec<Guild>,
    members: Vec<GuildMember>,
    channels: Vec<Channel>,
}

pub struct FakeGuildStore {
    state: Arc<Mutex<GuildState>>,
    next_id: AtomicI64,
    pub tx: Arc<TxLog>,
    pub fail_insert: AtomicBool,
    pub fail_add_member: AtomicBool,
    /// Channel reads for this guild ID fail
    pub fail_channels_for: AtomicI64,
    events: Events,
}

impl FakeGuildStore {
    pub fn new(events: &Events) -> Self {
        Self {
            state: Arc::default(),
            next_id: AtomicI64::new(0),
            tx: Arc::default(),
            fail_insert: AtomicBool::new(false),
            fail_add_member: AtomicBool::new(false),
            fail_channels_for: AtomicI64::new(0),
            events: Arc::clone(events),
        }
    }

    pub fn add_channel(&self, guild_id: i64, name: &str) -> Channel {
        let mut state = self.state.lock();
        let channel = Channel::new(state.channels.len() as i64 + 1, guild_id, name);
        state.channels.push(channel.clone());
        channel
    }

    /// Add a membership directly, bypassing guild creation.
    pub fn join(&self, guild_id: i64, user_id: i64) {
        self.state
            .lock()
            .members
            .push(GuildMember::new(guild_id, user_id));
    }

    pub fn guild_count(&self) -> usize {
        self.state.lock().guilds.len()
    }

    pub fn member_count(&self) -> usize {
        self.state.lock().members.len()
    }

    pub fn is_member(&self, guild_id: i64, user_id: i64) -> bool {
        self.state
            .lock()
            .members
            .iter()
            .any(|m| m.guild_id == guild_id && m.user_id == user_id)
    }
}

#[async_trait]
impl GuildRepository for FakeGuildStore {
    type Tx = FakeTx;

    async fn insert(
        &self,
        ctx: &RequestContext,
        guild: &Guild,
    ) -> Result<(FakeTx, Guild), AppError> {
        ctx.check()?;
        self.events.lock().push("guilds.insert");
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(injected("guild insert"));
        }

        let mut tx = FakeTx::begin(&self.tx, &self.events);
        let mut created = guild.clone();
        created.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        created.created_at = Some(chrono::Utc::now());

        let state = Arc::clone(&self.state);
        let row = created.clone();
        tx.stage(move || state.lock().guilds.push(row));

        Ok((tx, created))
    }

    async fn add_member(
        &self,
        ctx: &RequestContext,
        guild_id: i64,
        user_id: i64,
        tx: &mut FakeTx,
    ) -> Result<(), AppError> {
        ctx.check()?;
        self.events.lock().push("guilds.add_member");
        if self.fail_add_member.load(Ordering::SeqCst) {
            return Err(injected("add member"));
        }
        if self.is_member(guild_id, user_id) {
            return Err(AppError::Conflict("Member already exists".into()));
        }

        let state = Arc::clone(&self.state);
        tx.stage(move || {
            state
                .lock()
                .members
                .push(GuildMember::new(guild_id, user_id))
        });
        Ok(())
    }

    async fn fetch_joined(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<Guild>, AppError> {
        ctx.check()?;
        let state = self.state.lock();
        let mut joined: Vec<Guild> = state
            .guilds
            .iter()
            .filter(|g| {
                state
                    .members
                    .iter()
                    .any(|m| m.guild_id == g.id && m.user_id == user_id)
            })
            .cloned()
            .collect();
        joined.sort_by_key(|g| g.id);
        Ok(joined)
    }

    async fn fetch_channels(
        &self,
        ctx: &RequestContext,
        guild_id: i64,
        user_id: i64,
    ) -> Result<Vec<Channel>, AppError> {
        ctx.check()?;
        if self.fail_channels_for.load(Ordering::SeqCst) == guild_id {
            return Err(injected("channel fetch"));
        }

        let state = self.state.lock();
        let is_member = state
            .members
            .iter()
            .any(|m| m.guild_id == guild_id && m.user_id == user_id);
        if !is_member {
            return Ok(Vec::new());
        }
        Ok(state
            .channels
            .iter()
            .filter(|c| c.guild_id == guild_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Orchestrator wired to in-memory collaborators.
pub struct Harness {
    pub events: Events,
    pub auth: Arc<FakeAuthStore>,
    pub attachments: Arc<FakeAttachmentStore>,
    pub storage: Arc<FakeFileStorage>,
    pub guilds: Arc<FakeGuildStore>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_compensation(true)
    }

    pub fn with_compensation(enabled: bool) -> Self {
        let events: Events = Arc::default();
        let auth = Arc::new(FakeAuthStore::default());
        let attachments = Arc::new(FakeAttachmentStore::new(&events));
        let storage = Arc::new(FakeFileStorage::new(&events));
        let guilds = Arc::new(FakeGuildStore::new(&events));

        let orchestrator = Orchestrator::new(
            Arc::new(AuthServiceImpl::new(
                Arc::clone(&auth),
                Arc::new(FakeCredentials),
            )),
            Arc::new(
                AttachmentServiceImpl::new(Arc::clone(&attachments), Arc::clone(&storage))
                    .with_compensation(enabled),
            ),
            Arc::new(GuildServiceImpl::new(Arc::clone(&guilds))),
        );

        Self {
            events,
            auth,
            attachments,
            storage,
            guilds,
            orchestrator,
        }
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }
}

/// A context with a fresh request ID and no limits.
pub fn ctx() -> RequestContext {
    RequestContext::new()
}

/// A context that is already cancelled.
pub fn cancelled_ctx() -> RequestContext {
    let (ctx, handle) = RequestContext::new().cancellable();
    handle.cancel();
    ctx
}
