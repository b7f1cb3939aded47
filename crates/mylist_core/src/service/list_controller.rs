//! Shopping list controller.
//!
//! # Responsibility
//! - Mirror the item store into an in-memory, observable list view.
//! - Accept add/toggle/rename/delete intents without blocking the caller.
//! - Track the item currently selected for editing.
//!
//! # Invariants
//! - One owner task applies every intent, in submission order; the view is
//!   never mutated from anywhere else.
//! - Store calls run on the blocking pool, never on the owner task itself.
//! - `add` reloads the whole view; toggle/rename patch the entry by id;
//!   delete removes entries by id.
//! - The view keeps store order (`id DESC`).
//! - A failed intent leaves the view untouched and the task keeps running.

use crate::model::shopping_item::ShoppingItem;
use crate::repo::item_repo::{ItemRepository, RepoError, RepoResult, WriteOutcome};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Failure reported back to the issuer of an intent.
#[derive(Debug)]
pub enum ControllerError {
    /// Store rejected or failed the operation.
    Repo(RepoError),
    /// Background store step panicked or was cancelled.
    Background(String),
    /// Owner task is gone; the intent was not applied.
    Stopped,
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Background(message) => write!(f, "background store task failed: {message}"),
            Self::Stopped => write!(f, "list controller is no longer running"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Background(_) | Self::Stopped => None,
        }
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Observable state published to presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    /// Cached list view, newest id first. Not authoritative.
    pub items: Vec<ShoppingItem>,
    /// Item selected for renaming, if any.
    pub editing: Option<ShoppingItem>,
}

impl ListState {
    /// Swaps the view entry and the edit selection that share `updated.id`.
    fn replace_by_id(&mut self, updated: &ShoppingItem) {
        if let Some(slot) = self.items.iter_mut().find(|item| item.id == updated.id) {
            *slot = updated.clone();
        }
        if let Some(editing) = self.editing.as_mut().filter(|editing| editing.id == updated.id) {
            *editing = updated.clone();
        }
    }

    /// Latest known shape of the selected item: the view entry when present,
    /// else the snapshot taken at selection time.
    fn current_selection(&self) -> Option<ShoppingItem> {
        let selected = self.editing.as_ref()?;
        let current = self
            .items
            .iter()
            .find(|item| item.id == selected.id)
            .unwrap_or(selected);
        Some(current.clone())
    }
}

#[derive(Debug)]
enum Intent {
    Reload,
    Add { name: String },
    Toggle { item: ShoppingItem },
    Delete { item: ShoppingItem },
    Rename { item: ShoppingItem, new_name: String },
    BeginEdit { item: ShoppingItem },
    CancelEdit,
    ConfirmEdit { new_name: String },
}

impl Intent {
    fn label(&self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::Add { .. } => "add",
            Self::Toggle { .. } => "toggle",
            Self::Delete { .. } => "delete",
            Self::Rename { .. } => "rename",
            Self::BeginEdit { .. } => "begin_edit",
            Self::CancelEdit => "cancel_edit",
            Self::ConfirmEdit { .. } => "confirm_edit",
        }
    }
}

struct Command {
    intent: Intent,
    reply: oneshot::Sender<ControllerResult<WriteOutcome>>,
}

/// Completion handle for a submitted intent.
///
/// The intent runs whether or not this handle is awaited or dropped.
#[must_use = "await `wait()` to observe the outcome, or drop to fire and forget"]
pub struct PendingIntent {
    reply: oneshot::Receiver<ControllerResult<WriteOutcome>>,
}

impl PendingIntent {
    /// Waits until the store call finished and the view was updated.
    ///
    /// Returns `WriteOutcome::Missing` when the targeted id no longer exists.
    pub async fn wait(self) -> ControllerResult<WriteOutcome> {
        self.reply.await.unwrap_or(Err(ControllerError::Stopped))
    }
}

/// Handle to the list controller owner task.
///
/// Cloning is cheap; all clones feed the same task and observe the same state.
#[derive(Clone)]
pub struct ListController {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ListState>,
}

impl ListController {
    /// Starts the owner task on the current tokio runtime and queues the
    /// initial reload.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime context.
    pub fn spawn<R>(repo: R) -> Self
    where
        R: ItemRepository + Send + Sync + 'static,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (publisher, state) = watch::channel(ListState::default());
        tokio::spawn(run(Arc::new(repo), receiver, publisher));
        info!("event=controller_start module=controller status=ok");

        let controller = Self { commands, state };
        drop(controller.reload());
        controller
    }

    /// Returns a snapshot of the cached list view.
    pub fn items_view(&self) -> Vec<ShoppingItem> {
        self.state.borrow().items.clone()
    }

    /// Returns the item currently selected for editing.
    pub fn editing(&self) -> Option<ShoppingItem> {
        self.state.borrow().editing.clone()
    }

    /// Returns a snapshot of the full observable state.
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.clone()
    }

    /// Replaces the view with the store contents.
    pub fn reload(&self) -> PendingIntent {
        self.submit(Intent::Reload)
    }

    /// Inserts a new, not-bought item and reloads the view.
    ///
    /// Blank names fail validation without touching the store.
    pub fn add_item(&self, name: impl Into<String>) -> PendingIntent {
        self.submit(Intent::Add { name: name.into() })
    }

    /// Flips `is_bought` of `item` in the store and patches the view entry.
    pub fn toggle_bought(&self, item: &ShoppingItem) -> PendingIntent {
        self.submit(Intent::Toggle { item: item.clone() })
    }

    /// Deletes `item` from the store and drops it from the view.
    pub fn delete_item(&self, item: &ShoppingItem) -> PendingIntent {
        self.submit(Intent::Delete { item: item.clone() })
    }

    /// Renames `item` in the store and patches the view entry.
    pub fn update_item_name(&self, item: &ShoppingItem, new_name: impl Into<String>) -> PendingIntent {
        self.submit(Intent::Rename {
            item: item.clone(),
            new_name: new_name.into(),
        })
    }

    /// Selects `item` for editing.
    pub fn begin_edit(&self, item: &ShoppingItem) -> PendingIntent {
        self.submit(Intent::BeginEdit { item: item.clone() })
    }

    /// Clears the edit selection without touching the store.
    pub fn cancel_edit(&self) -> PendingIntent {
        self.submit(Intent::CancelEdit)
    }

    /// Renames the selected item and clears the selection.
    ///
    /// Resolves to `WriteOutcome::Missing` when nothing is selected.
    pub fn confirm_edit(&self, new_name: impl Into<String>) -> PendingIntent {
        self.submit(Intent::ConfirmEdit {
            new_name: new_name.into(),
        })
    }

    fn submit(&self, intent: Intent) -> PendingIntent {
        let (reply, receiver) = oneshot::channel();
        if self.commands.send(Command { intent, reply }).is_err() {
            warn!("event=intent_submit module=controller status=error error_code=controller_stopped");
        }
        PendingIntent { reply: receiver }
    }
}

async fn run<R>(
    repo: Arc<R>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ListState>,
) where
    R: ItemRepository + Send + Sync + 'static,
{
    while let Some(Command { intent, reply }) = commands.recv().await {
        let label = intent.label();
        let result = apply(&repo, &state, intent).await;
        match &result {
            Ok(outcome) => debug!(
                "event=intent_apply module=controller status=ok intent={label} outcome={outcome:?} view_len={}",
                state.borrow().items.len()
            ),
            Err(err) => warn!(
                "event=intent_apply module=controller status=error intent={label} error={err}"
            ),
        }
        // Issuer may have dropped its handle.
        let _ = reply.send(result);
    }
    info!("event=controller_stop module=controller status=ok");
}

async fn apply<R>(
    repo: &Arc<R>,
    state: &watch::Sender<ListState>,
    intent: Intent,
) -> ControllerResult<WriteOutcome>
where
    R: ItemRepository + Send + Sync + 'static,
{
    match intent {
        Intent::Reload => reload(repo, state).await,
        Intent::Add { name } => {
            let item = ShoppingItem::new(name);
            item.validate().map_err(RepoError::from)?;
            on_store(repo, move |repo| repo.insert_item(&item)).await?;
            reload(repo, state).await
        }
        Intent::Toggle { item } => patch(repo, state, item.toggled()).await,
        Intent::Rename { item, new_name } => patch(repo, state, item.renamed(new_name)).await,
        Intent::Delete { item } => {
            let id = item.id;
            let outcome = on_store(repo, move |repo| repo.delete_item(&item)).await?;
            state.send_modify(|view| {
                view.items.retain(|entry| entry.id != id);
                if view.editing.as_ref().is_some_and(|editing| editing.id == id) {
                    view.editing = None;
                }
            });
            Ok(outcome)
        }
        Intent::BeginEdit { item } => {
            state.send_modify(|view| view.editing = Some(item));
            Ok(WriteOutcome::Applied)
        }
        Intent::CancelEdit => {
            state.send_modify(|view| view.editing = None);
            Ok(WriteOutcome::Applied)
        }
        Intent::ConfirmEdit { new_name } => {
            let selected = state.borrow().current_selection();
            let Some(item) = selected else {
                return Ok(WriteOutcome::Missing);
            };
            let outcome = patch(repo, state, item.renamed(new_name)).await?;
            state.send_modify(|view| view.editing = None);
            Ok(outcome)
        }
    }
}

async fn reload<R>(repo: &Arc<R>, state: &watch::Sender<ListState>) -> ControllerResult<WriteOutcome>
where
    R: ItemRepository + Send + Sync + 'static,
{
    let items = on_store(repo, |repo| repo.get_all_items()).await?;
    state.send_modify(|view| view.items = items);
    Ok(WriteOutcome::Applied)
}

/// Writes `updated` as a whole record, then swaps the view entry with the
/// same id. Entries already gone from the view stay gone.
async fn patch<R>(
    repo: &Arc<R>,
    state: &watch::Sender<ListState>,
    updated: ShoppingItem,
) -> ControllerResult<WriteOutcome>
where
    R: ItemRepository + Send + Sync + 'static,
{
    let written = updated.clone();
    let outcome = on_store(repo, move |repo| repo.update_item(&written)).await?;
    state.send_modify(|view| view.replace_by_id(&updated));
    Ok(outcome)
}

async fn on_store<R, T, F>(repo: &Arc<R>, op: F) -> ControllerResult<T>
where
    R: ItemRepository + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&R) -> RepoResult<T> + Send + 'static,
{
    let repo = Arc::clone(repo);
    match tokio::task::spawn_blocking(move || op(&repo)).await {
        Ok(result) => result.map_err(ControllerError::from),
        Err(err) => Err(ControllerError::Background(err.to_string())),
    }
}
