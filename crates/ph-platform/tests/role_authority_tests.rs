//! RoleAuthority behaviour against an instrumented user store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use ph_platform::{
    CallerContext, InMemoryUserStore, PlatformError, ProfileUpdate, RoleAuthority,
    RoleChangeCommand, RoleCondition, UseCaseError, User, UserId, UserRole, UserStore,
};

/// Wraps the in-memory store and counts reads and writes.
struct CountingStore {
    inner: InMemoryUserStore,
    lookups: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStore {
    fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            inner: InMemoryUserStore::with_users(users),
            lookups: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn find_by_id(&self, id: &UserId) -> ph_platform::Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> ph_platform::Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_email(email).await
    }

    async fn find_all(&self) -> ph_platform::Result<Vec<User>> {
        self.inner.find_all().await
    }

    async fn insert(&self, user: &User) -> ph_platform::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(user).await
    }

    async fn update_role_if(
        &self,
        id: &UserId,
        condition: RoleCondition,
        role: UserRole,
    ) -> ph_platform::Result<Option<User>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_role_if(id, condition, role).await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> ph_platform::Result<Option<User>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_profile(id, update).await
    }

    async fn ping(&self) -> ph_platform::Result<()> {
        Ok(())
    }
}

/// The first read returns a snapshot, then the live record changes (or
/// disappears) before the conditional write arrives.
struct RacingStore {
    inner: InMemoryUserStore,
    snapshot: User,
    role_after_read: Option<UserRole>,
    reads: AtomicUsize,
    deleted: AtomicBool,
}

impl RacingStore {
    fn new(snapshot: User, role_after_read: Option<UserRole>) -> Self {
        Self {
            inner: InMemoryUserStore::with_users([snapshot.clone()]),
            snapshot,
            role_after_read,
            reads: AtomicUsize::new(0),
            deleted: AtomicBool::new(false),
        }
    }

    fn is_deleted(&self, id: &UserId) -> bool {
        *id == self.snapshot.id && self.deleted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for RacingStore {
    async fn find_by_id(&self, id: &UserId) -> ph_platform::Result<Option<User>> {
        if self.reads.fetch_add(1, Ordering::SeqCst) > 0 {
            if self.is_deleted(id) {
                return Ok(None);
            }
            return self.inner.find_by_id(id).await;
        }
        match self.role_after_read {
            Some(role) => {
                self.inner.update_role_if(id, RoleCondition::Any, role).await?;
            }
            None => self.deleted.store(true, Ordering::SeqCst),
        }
        Ok(Some(self.snapshot.clone()))
    }

    async fn find_by_email(&self, email: &str) -> ph_platform::Result<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn find_all(&self) -> ph_platform::Result<Vec<User>> {
        self.inner.find_all().await
    }

    async fn insert(&self, user: &User) -> ph_platform::Result<()> {
        self.inner.insert(user).await
    }

    async fn update_role_if(
        &self,
        id: &UserId,
        condition: RoleCondition,
        role: UserRole,
    ) -> ph_platform::Result<Option<User>> {
        if self.is_deleted(id) {
            return Ok(None);
        }
        self.inner.update_role_if(id, condition, role).await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> ph_platform::Result<Option<User>> {
        if self.is_deleted(id) {
            return Ok(None);
        }
        self.inner.update_profile(id, update).await
    }

    async fn ping(&self) -> ph_platform::Result<()> {
        Ok(())
    }
}

/// Every call fails as if the database were unreachable.
struct FailingStore;

#[async_trait]
impl UserStore for FailingStore {
    async fn find_by_id(&self, _id: &UserId) -> ph_platform::Result<Option<User>> {
        Err(PlatformError::internal("connection refused"))
    }

    async fn find_by_email(&self, _email: &str) -> ph_platform::Result<Option<User>> {
        Err(PlatformError::internal("connection refused"))
    }

    async fn find_all(&self) -> ph_platform::Result<Vec<User>> {
        Err(PlatformError::internal("connection refused"))
    }

    async fn insert(&self, _user: &User) -> ph_platform::Result<()> {
        Err(PlatformError::internal("connection refused"))
    }

    async fn update_role_if(
        &self,
        _id: &UserId,
        _condition: RoleCondition,
        _role: UserRole,
    ) -> ph_platform::Result<Option<User>> {
        Err(PlatformError::internal("connection refused"))
    }

    async fn update_profile(
        &self,
        _id: &UserId,
        _update: &ProfileUpdate,
    ) -> ph_platform::Result<Option<User>> {
        Err(PlatformError::internal("connection refused"))
    }

    async fn ping(&self) -> ph_platform::Result<()> {
        Err(PlatformError::internal("connection refused"))
    }
}

#[derive(Clone, Copy, Debug)]
enum Op {
    PromoteToAdmin,
    PromoteToManager,
    DemoteAdminToUser,
}

const ALL_OPS: [Op; 3] = [Op::PromoteToAdmin, Op::PromoteToManager, Op::DemoteAdminToUser];

async fn run(
    authority: &RoleAuthority,
    op: Op,
    caller: &CallerContext,
    user_id: &str,
) -> Result<User, UseCaseError> {
    let cmd = RoleChangeCommand::new(user_id);
    let result = match op {
        Op::PromoteToAdmin => authority.promote_to_admin(caller, &cmd).await,
        Op::PromoteToManager => authority.promote_to_manager(caller, &cmd).await,
        Op::DemoteAdminToUser => authority.demote_admin_to_user(caller, &cmd).await,
    };
    result.into_result()
}

fn super_admin() -> CallerContext {
    CallerContext::authenticated("owner@pizzahub.test").with_super_admin(true)
}

fn admin() -> CallerContext {
    CallerContext::authenticated("admin@pizzahub.test").with_admin(true)
}

fn both() -> CallerContext {
    CallerContext::authenticated("root@pizzahub.test")
        .with_admin(true)
        .with_super_admin(true)
}

fn setup(role: UserRole) -> (Arc<CountingStore>, RoleAuthority, UserId) {
    let target = User::new("target@pizzahub.test", "Target").with_role(role);
    let id = target.id;
    let store = Arc::new(CountingStore::with_users([target]));
    let authority = RoleAuthority::new(store.clone());
    (store, authority, id)
}

async fn stored_role(store: &CountingStore, id: &UserId) -> UserRole {
    store.inner.find_by_id(id).await.unwrap().unwrap().role
}

fn assert_kind(err: &UseCaseError, status: u16) {
    assert_eq!(err.http_status_code(), status, "unexpected error: {}", err);
}

#[tokio::test]
async fn non_super_admin_cannot_promote_or_demote_admins() {
    let callers = [
        CallerContext::authenticated("plain@pizzahub.test"),
        admin(),
    ];

    for role in UserRole::ALL {
        for caller in &callers {
            for op in [Op::PromoteToAdmin, Op::DemoteAdminToUser] {
                let (store, authority, id) = setup(role);
                let err = run(&authority, op, caller, &id.to_hex()).await.unwrap_err();

                assert!(matches!(err, UseCaseError::Unauthorized { .. }), "{:?}", op);
                assert_eq!(stored_role(&store, &id).await, role);
                assert_eq!(store.lookups(), 0, "capability is checked before lookup");
                assert_eq!(store.writes(), 0);
            }
        }
    }
}

#[tokio::test]
async fn non_admin_cannot_promote_to_manager() {
    for caller in [CallerContext::authenticated("plain@pizzahub.test"), super_admin()] {
        let (store, authority, id) = setup(UserRole::Courier);
        let err = run(&authority, Op::PromoteToManager, &caller, &id.to_hex())
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Unauthorized { .. }));
        assert_eq!(stored_role(&store, &id).await, UserRole::Courier);
        assert_eq!(store.lookups(), 0);
        assert_eq!(store.writes(), 0);
    }
}

#[tokio::test]
async fn missing_email_is_unauthorized_even_with_flags() {
    let caller = CallerContext {
        email: None,
        is_admin: true,
        is_super_admin: true,
    };

    for op in ALL_OPS {
        let (store, authority, id) = setup(UserRole::Admin);
        let err = run(&authority, op, &caller, &id.to_hex()).await.unwrap_err();
        assert_kind(&err, 401);
        assert_eq!(store.lookups(), 0);
        assert_eq!(store.writes(), 0);
    }
}

#[tokio::test]
async fn unknown_target_is_not_found_for_every_operation() {
    let missing = UserId::new().to_hex();

    for op in ALL_OPS {
        let (store, authority, _) = setup(UserRole::Admin);
        let err = run(&authority, op, &both(), &missing).await.unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound { .. }), "{:?}", op);
        assert_eq!(store.writes(), 0);
    }
}

#[tokio::test]
async fn promote_to_admin_rejects_existing_admin_without_writing() {
    let (store, authority, id) = setup(UserRole::Admin);
    let err = run(&authority, Op::PromoteToAdmin, &super_admin(), &id.to_hex())
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::Conflict { .. }));
    assert_eq!(err.message(), "User is already an admin");
    assert_eq!(store.writes(), 0);
    assert_eq!(stored_role(&store, &id).await, UserRole::Admin);
}

#[tokio::test]
async fn demote_rejects_non_admins_without_writing() {
    for role in [UserRole::User, UserRole::Courier, UserRole::Manager] {
        let (store, authority, id) = setup(role);
        let err = run(&authority, Op::DemoteAdminToUser, &super_admin(), &id.to_hex())
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Conflict { .. }));
        assert_eq!(err.message(), "User is not an admin");
        assert_eq!(store.writes(), 0);
        assert_eq!(stored_role(&store, &id).await, role);
    }
}

#[tokio::test]
async fn promote_to_manager_is_idempotent() {
    let (store, authority, id) = setup(UserRole::Manager);
    let user = run(&authority, Op::PromoteToManager, &admin(), &id.to_hex())
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Manager);
    assert_eq!(store.writes(), 1, "re-persists the same role");
}

#[tokio::test]
async fn promote_to_manager_from_any_role() {
    for role in UserRole::ALL {
        let (store, authority, id) = setup(role);
        let user = run(&authority, Op::PromoteToManager, &admin(), &id.to_hex())
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Manager);
        assert_eq!(stored_role(&store, &id).await, UserRole::Manager);
        assert_eq!(store.writes(), 1);
    }
}

#[tokio::test]
async fn super_admin_promotes_manager_to_admin() {
    let (store, authority, id) = setup(UserRole::Manager);
    let user = run(&authority, Op::PromoteToAdmin, &super_admin(), &id.to_hex())
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Admin);
    assert_eq!(user.id, id);
    assert_eq!(stored_role(&store, &id).await, UserRole::Admin);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn admin_cannot_promote_user_to_admin() {
    let (store, authority, id) = setup(UserRole::User);
    let err = run(&authority, Op::PromoteToAdmin, &admin(), &id.to_hex())
        .await
        .unwrap_err();

    assert_kind(&err, 401);
    assert_eq!(stored_role(&store, &id).await, UserRole::User);
}

#[tokio::test]
async fn super_admin_cannot_demote_courier() {
    let (store, authority, id) = setup(UserRole::Courier);
    let err = run(&authority, Op::DemoteAdminToUser, &super_admin(), &id.to_hex())
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::Conflict { .. }));
    assert_eq!(stored_role(&store, &id).await, UserRole::Courier);
}

#[tokio::test]
async fn demote_resets_admin_to_user() {
    let (store, authority, id) = setup(UserRole::Admin);
    let user = run(&authority, Op::DemoteAdminToUser, &super_admin(), &id.to_hex())
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::User);
    assert_eq!(stored_role(&store, &id).await, UserRole::User);
}

#[tokio::test]
async fn malformed_id_is_rejected_before_lookup() {
    let malformed = ["", "   ", "123", "not-a-valid-object-id!!", "zzzzzzzzzzzzzzzzzzzzzzzz"];

    for op in ALL_OPS {
        for bad in malformed {
            let (store, authority, _) = setup(UserRole::Admin);
            let err = run(&authority, op, &both(), bad).await.unwrap_err();

            assert!(matches!(err, UseCaseError::InvalidArgument { .. }), "{:?} {:?}", op, bad);
            assert_eq!(store.lookups(), 0);
            assert_eq!(store.writes(), 0);
        }
    }
}

#[tokio::test]
async fn concurrent_role_change_is_reported_as_conflict() {
    // Read sees `manager`, but the record becomes `admin` before the write
    let target = User::new("race@pizzahub.test", "Race").with_role(UserRole::Manager);
    let id = target.id;
    let store = Arc::new(RacingStore::new(target, Some(UserRole::Admin)));
    let authority = RoleAuthority::new(store);

    let err = run(&authority, Op::PromoteToAdmin, &super_admin(), &id.to_hex())
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::Conflict { .. }));
    assert_eq!(err.message(), "User is already an admin");
}

#[tokio::test]
async fn concurrent_deletion_is_reported_as_not_found() {
    let target = User::new("gone@pizzahub.test", "Gone").with_role(UserRole::Admin);
    let id = target.id;
    let store = Arc::new(RacingStore::new(target, None));
    let authority = RoleAuthority::new(store);

    let err = run(&authority, Op::DemoteAdminToUser, &super_admin(), &id.to_hex())
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::NotFound { .. }));
}

#[tokio::test]
async fn store_failure_is_reported_as_store_failure() {
    let authority = RoleAuthority::new(Arc::new(FailingStore));
    let err = run(&authority, Op::PromoteToManager, &admin(), &UserId::new().to_hex())
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::StoreFailure { .. }));
    assert_kind(&err, 500);
}
