//! "Mes supports" view controller.
//!
//! Mounting serves the session-cached snapshot right away when there is one
//! and refreshes it in the background. A fetch that lands after unmount, or
//! after a newer fetch was issued, is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use locapub_net::Gateway;
use locapub_shared::constants::SUPPORTS_CACHE_KEY;
use locapub_shared::protocol::{DeleteSupportRequest, ModifySupportRequest};
use locapub_shared::{Field, Session, Support, SupportId, ValidationError};
use locapub_store::CacheStore;

use crate::lifetime::Lifetime;
use crate::navigator::OpenOutcome;
use crate::notice::{Action, ActionError, FormMessage};
use crate::shell::Tab;

pub const MODIFIED_MESSAGE: &str = "Support modifié avec succès !";
pub const DELETED_MESSAGE: &str = "Support supprimé avec succès !";

/// Title edit of one support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub support: Support,
    pub draft_title: String,
    pub saving: bool,
    pub message: Option<FormMessage>,
}

impl EditSession {
    fn new(support: Support) -> Self {
        Self {
            draft_title: support.title.clone(),
            support,
            saving: false,
            message: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportsView {
    pub items: Vec<Support>,
    /// A blocking fetch is running.
    pub loading: bool,
    /// A background refresh of a cached snapshot is running.
    pub revalidating: bool,
    pub error: Option<ActionError>,
    pub edit: Option<EditSession>,
    /// Support waiting for delete confirmation.
    pub pending_delete: Option<SupportId>,
    /// Outcome of the last delete.
    pub message: Option<FormMessage>,
    /// Open request waiting for the background refresh.
    pub pending_open: Option<SupportId>,
}

impl SupportsView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && !self.loading && self.error.is_none()
    }

    /// Where the empty-state hint sends the user.
    pub fn empty_state_target(&self) -> Option<Tab> {
        self.is_empty().then_some(Tab::CreateSupport)
    }

    pub fn find(&self, id: &SupportId) -> Option<&Support> {
        self.items.iter().find(|s| &s.id == id)
    }
}

/// How [`SupportsController::mount`] got its first data.
#[derive(Debug)]
pub enum Mount {
    /// Served from the cache; the handle is the background refresh.
    FromCache(JoinHandle<()>),
    /// Fetched before returning.
    Fetched,
}

impl Mount {
    /// Wait for the background refresh, if any.
    pub async fn settled(self) {
        if let Mount::FromCache(handle) = self {
            if let Err(e) = handle.await {
                warn!(error = %e, "Supports revalidation task failed");
            }
        }
    }
}

enum CacheRead {
    Hit(Vec<Support>),
    Corrupt,
    Miss,
}

struct Inner {
    gateway: Arc<dyn Gateway>,
    cache: Arc<dyn CacheStore>,
    session: Session,
    lifetime: Lifetime,
    state: Mutex<SupportsView>,
    /// Generation of the latest issued fetch.
    fetches: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SupportsView> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to the view unless the controller is unmounted.
    fn update(&self, f: impl FnOnce(&mut SupportsView)) -> bool {
        if !self.lifetime.is_alive() {
            return false;
        }
        f(&mut self.lock());
        true
    }

    fn read_cache(&self) -> CacheRead {
        match self.cache.get(SUPPORTS_CACHE_KEY) {
            Ok(None) => CacheRead::Miss,
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Support>>(&raw) {
                Ok(items) => CacheRead::Hit(items),
                Err(e) => {
                    warn!(error = %e, "Cached supports snapshot is corrupt");
                    CacheRead::Corrupt
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read supports cache");
                CacheRead::Miss
            }
        }
    }

    fn write_cache(&self, items: &[Support]) {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize supports snapshot");
                return;
            }
        };
        if let Err(e) = self.cache.set(SUPPORTS_CACHE_KEY, &raw) {
            if e.is_quota_exceeded() {
                warn!(error = %e, "Supports snapshot not cached: quota exceeded");
            } else {
                warn!(error = %e, "Failed to write supports cache");
            }
        }
    }

    /// Fetch the collection and replace the view with it.
    ///
    /// A background fetch keeps the items on screen while it runs and on
    /// failure. Only the latest issued fetch is applied.
    async fn fetch(&self, background: bool) {
        let generation = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let started = self.update(|view| {
            if background {
                view.revalidating = true;
            } else {
                view.loading = true;
                view.error = None;
            }
        });
        if !started {
            return;
        }

        let Some(result) = self
            .lifetime
            .guard(self.gateway.list_supports(&self.session))
            .await
        else {
            debug!("Supports fetch dropped after unmount");
            return;
        };

        let mut view = self.lock();
        if !self.lifetime.is_alive() {
            return;
        }
        if self.fetches.load(Ordering::SeqCst) != generation {
            debug!(generation, background, "Superseded supports fetch dropped");
            return;
        }
        view.loading = false;
        view.revalidating = false;

        match result {
            Ok(items) => {
                debug!(count = items.len(), background, "Supports fetched");
                self.write_cache(&items);
                view.items = items;
                view.error = None;
                if let Some(id) = view.pending_open.take() {
                    if !open_in(&mut view, &id) {
                        debug!(support = %id, "Open request for unknown support dropped");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, background, "Failed to fetch supports");
                view.error = Some(ActionError::gateway(Action::LoadSupports, &e));
                if let Some(id) = view.pending_open.take() {
                    debug!(support = %id, "Open request dropped with the failed fetch");
                }
            }
        }
    }

    /// Make every fetch in flight stale.
    fn supersede_fetches(&self, view: &mut SupportsView) {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        view.loading = false;
        view.revalidating = false;
        view.pending_open = None;
    }
}

/// Start an edit session on `id` if it is loaded.
fn open_in(view: &mut SupportsView, id: &SupportId) -> bool {
    match view.find(id).cloned() {
        Some(support) => {
            view.edit = Some(EditSession::new(support));
            true
        }
        None => false,
    }
}

/// Controller behind the supports list. Dropping it unmounts it.
pub struct SupportsController {
    inner: Arc<Inner>,
}

impl SupportsController {
    pub fn new(gateway: Arc<dyn Gateway>, cache: Arc<dyn CacheStore>, session: Session) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                cache,
                session,
                lifetime: Lifetime::new(),
                state: Mutex::new(SupportsView::default()),
                fetches: AtomicU64::new(0),
            }),
        }
    }

    /// Load the collection: cached snapshot plus background refresh, or a
    /// blocking fetch when there is no usable snapshot.
    pub async fn mount(&self) -> Mount {
        match self.inner.read_cache() {
            CacheRead::Hit(items) => {
                debug!(count = items.len(), "Serving supports from cache");
                self.inner.update(|view| {
                    view.items = items;
                    view.loading = false;
                    view.revalidating = true;
                });
                let inner = Arc::clone(&self.inner);
                Mount::FromCache(tokio::spawn(async move { inner.fetch(true).await }))
            }
            CacheRead::Corrupt => {
                if let Err(e) = self.inner.cache.invalidate(SUPPORTS_CACHE_KEY) {
                    warn!(error = %e, "Failed to drop corrupt supports cache");
                }
                self.inner.fetch(false).await;
                Mount::Fetched
            }
            CacheRead::Miss => {
                self.inner.fetch(false).await;
                Mount::Fetched
            }
        }
    }

    /// Fetch again, blocking, keeping the current items on screen.
    pub async fn refresh(&self) {
        self.inner.fetch(false).await;
    }

    pub fn unmount(&self) {
        self.inner.lifetime.end();
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.lifetime.is_alive()
    }

    pub fn view(&self) -> SupportsView {
        self.inner.lock().clone()
    }

    /// Handle a cross-view open request taken after the collection loaded.
    ///
    /// An item missing from a cached snapshot is looked up again once the
    /// background refresh lands.
    pub fn apply_open_request(&self, request: Option<SupportId>) -> OpenOutcome {
        let Some(id) = request else {
            return OpenOutcome::NoRequest;
        };
        let mut view = self.inner.lock();
        if open_in(&mut view, &id) {
            OpenOutcome::Opened
        } else if view.revalidating {
            debug!(support = %id, "Open request waits for the supports refresh");
            view.pending_open = Some(id);
            OpenOutcome::Deferred
        } else {
            debug!(support = %id, "Open request for unknown support dropped");
            OpenOutcome::NotFound
        }
    }

    /// Start editing `id`.
    pub fn open(&self, id: &SupportId) -> OpenOutcome {
        if open_in(&mut self.inner.lock(), id) {
            OpenOutcome::Opened
        } else {
            debug!(support = %id, "Open request for unknown support dropped");
            OpenOutcome::NotFound
        }
    }

    pub fn close_edit(&self) {
        self.inner.lock().edit = None;
    }

    pub fn set_draft_title(&self, title: impl Into<String>) {
        if let Some(edit) = self.inner.lock().edit.as_mut() {
            edit.draft_title = title.into();
            edit.message = None;
        }
    }

    /// Save the draft title of the open edit session.
    ///
    /// Only the matching item is updated in place; the cached snapshot is
    /// left as is. Does nothing without an edit session.
    pub async fn save_edit(&self) -> Result<(), ActionError> {
        let request = {
            let mut view = self.inner.lock();
            let Some(edit) = view.edit.as_mut() else {
                return Ok(());
            };
            let title = edit.draft_title.trim().to_string();
            let refusal = if edit.saving {
                Some(ValidationError::Busy)
            } else if title.is_empty() {
                Some(ValidationError::Incomplete {
                    missing: vec![Field::Title],
                })
            } else if title == edit.support.title {
                Some(ValidationError::NoChange)
            } else {
                None
            };
            if let Some(refusal) = refusal {
                let err = ActionError::validation(Action::ModifySupport, &refusal);
                edit.message = Some(FormMessage::Error(err.clone()));
                return Err(err);
            }
            edit.saving = true;
            edit.message = None;
            ModifySupportRequest {
                id: edit.support.id.clone(),
                title,
            }
        };

        let Some(result) = self
            .inner
            .lifetime
            .guard(self.inner.gateway.modify_support(&request))
            .await
        else {
            return Ok(());
        };

        match result {
            Ok(()) => {
                info!(support = %request.id, "Support renamed");
                self.inner.update(|view| {
                    self.inner.supersede_fetches(view);
                    if let Some(item) = view.items.iter_mut().find(|s| s.id == request.id) {
                        item.title = request.title.clone();
                    }
                    if let Some(edit) = view.edit.as_mut() {
                        edit.support.title = request.title.clone();
                        edit.saving = false;
                        edit.message = Some(FormMessage::Success(MODIFIED_MESSAGE.to_string()));
                    }
                });
                Ok(())
            }
            Err(e) => {
                warn!(support = %request.id, error = %e, "Failed to modify support");
                let err = ActionError::gateway(Action::ModifySupport, &e);
                self.inner.update(|view| {
                    if let Some(edit) = view.edit.as_mut() {
                        edit.saving = false;
                        edit.message = Some(FormMessage::Error(err.clone()));
                    }
                });
                Err(err)
            }
        }
    }

    /// Ask for confirmation before deleting `id`. Returns false if unknown.
    pub fn request_delete(&self, id: &SupportId) -> bool {
        let mut view = self.inner.lock();
        if view.find(id).is_none() {
            return false;
        }
        view.pending_delete = Some(id.clone());
        view.message = None;
        true
    }

    pub fn cancel_delete(&self) {
        self.inner.lock().pending_delete = None;
    }

    /// Delete the support awaiting confirmation, then reload the whole list.
    pub async fn confirm_delete(&self) -> Result<(), ActionError> {
        let Some(id) = self.inner.lock().pending_delete.take() else {
            return Ok(());
        };
        let request = DeleteSupportRequest { id };

        let Some(result) = self
            .inner
            .lifetime
            .guard(self.inner.gateway.delete_support(&request))
            .await
        else {
            return Ok(());
        };

        match result {
            Ok(()) => {
                info!(support = %request.id, "Support deleted");
                self.inner.update(|view| {
                    if view.edit.as_ref().is_some_and(|e| e.support.id == request.id) {
                        view.edit = None;
                    }
                    view.message = Some(FormMessage::Success(DELETED_MESSAGE.to_string()));
                });
                self.inner.fetch(false).await;
                Ok(())
            }
            Err(e) => {
                warn!(support = %request.id, error = %e, "Failed to delete support");
                let err = ActionError::gateway(Action::DeleteSupport, &e);
                self.inner.update(|view| {
                    view.message = Some(FormMessage::Error(err.clone()));
                });
                Err(err)
            }
        }
    }
}

impl Drop for SupportsController {
    fn drop(&mut self) {
        self.inner.lifetime.end();
    }
}
