//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose shopping list intents and view snapshots to Dart via FRB.
//! - Own the process-wide store, controller and tokio runtime.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - `init_store` must succeed before any `shopping_*` call.
//! - Blank names are rejected here, before the controller sees them.

use log::{info, warn};
use mylist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, is_blank_item_name,
    ping as ping_inner, ControllerResult, ItemStore, ListController, PendingIntent, ShoppingItem,
    WriteOutcome,
};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::path::PathBuf;
use tokio::runtime::{Builder, Handle, Runtime};

const DB_FILE_NAME: &str = "mylist_shopping.sqlite3";
const DB_PATH_ENV: &str = "MYLIST_DB_PATH";

static RUNTIME: OnceCell<Runtime> = OnceCell::new();
static SESSION: OnceCell<ShoppingSession> = OnceCell::new();

struct ShoppingSession {
    db_path: PathBuf,
    controller: ListController,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Shopping item as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItemView {
    pub id: i64,
    pub name: String,
    pub is_bought: bool,
}

impl From<ShoppingItem> for ShoppingItemView {
    fn from(item: ShoppingItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            is_bought: item.is_bought,
        }
    }
}

impl From<ShoppingItemView> for ShoppingItem {
    fn from(view: ShoppingItemView) -> Self {
        ShoppingItem::with_id(view.id, view.name, view.is_bought)
    }
}

/// Result envelope for shopping intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingActionResponse {
    /// Whether the intent was accepted and completed.
    pub ok: bool,
    /// `false` when the targeted item no longer existed (no-op).
    pub applied: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ShoppingActionResponse {
    fn completed(action: &str, outcome: WriteOutcome) -> Self {
        let message = match outcome {
            WriteOutcome::Applied => format!("{action} done."),
            WriteOutcome::Missing => format!("{action} skipped: item not found."),
        };
        Self {
            ok: true,
            applied: outcome.is_applied(),
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            message: message.into(),
        }
    }
}

/// Opens the shopping database and starts the list controller.
///
/// Path resolution: `db_path` argument, else `MYLIST_DB_PATH`, else
/// `<temp>/mylist_shopping.sqlite3`.
///
/// # FFI contract
/// - Blocking call; run once at app startup.
/// - Idempotent for the same path; a different path is rejected.
/// - Returns empty string on success and error message on failure.
pub fn init_store(db_path: Option<String>) -> String {
    match init_session(db_path) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Returns the cached list view, newest item first.
///
/// Returns an empty list when the store is not initialized.
#[flutter_rust_bridge::frb(sync)]
pub fn shopping_items() -> Vec<ShoppingItemView> {
    SESSION
        .get()
        .map(|session| {
            session
                .controller
                .items_view()
                .into_iter()
                .map(ShoppingItemView::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the item currently selected for editing.
#[flutter_rust_bridge::frb(sync)]
pub fn shopping_editing() -> Option<ShoppingItemView> {
    SESSION
        .get()
        .and_then(|session| session.controller.editing())
        .map(ShoppingItemView::from)
}

/// Adds a new item. Blank names are rejected without touching the store.
pub fn shopping_add(name: String) -> ShoppingActionResponse {
    if is_blank_item_name(&name) {
        return ShoppingActionResponse::failure("Item name is empty.");
    }
    run_intent("Add", |controller| controller.add_item(name))
}

/// Flips the bought flag of `item`.
pub fn shopping_toggle(item: ShoppingItemView) -> ShoppingActionResponse {
    let item = ShoppingItem::from(item);
    run_intent("Toggle", |controller| controller.toggle_bought(&item))
}

/// Deletes `item`.
pub fn shopping_delete(item: ShoppingItemView) -> ShoppingActionResponse {
    let item = ShoppingItem::from(item);
    run_intent("Delete", |controller| controller.delete_item(&item))
}

/// Renames `item` to `new_name`.
pub fn shopping_rename(item: ShoppingItemView, new_name: String) -> ShoppingActionResponse {
    if is_blank_item_name(&new_name) {
        return ShoppingActionResponse::failure("Item name is empty.");
    }
    let item = ShoppingItem::from(item);
    run_intent("Rename", |controller| {
        controller.update_item_name(&item, new_name)
    })
}

/// Selects `item` for editing.
pub fn shopping_begin_edit(item: ShoppingItemView) -> ShoppingActionResponse {
    let item = ShoppingItem::from(item);
    run_intent("Edit", |controller| controller.begin_edit(&item))
}

/// Drops the edit selection.
pub fn shopping_cancel_edit() -> ShoppingActionResponse {
    run_intent("Cancel edit", ListController::cancel_edit)
}

/// Renames the selected item and clears the selection.
pub fn shopping_confirm_edit(new_name: String) -> ShoppingActionResponse {
    if is_blank_item_name(&new_name) {
        return ShoppingActionResponse::failure("Item name is empty.");
    }
    run_intent("Save", |controller| controller.confirm_edit(new_name))
}

fn init_session(db_path: Option<String>) -> Result<(), String> {
    let db_path = resolve_db_path(db_path);
    let session = SESSION.get_or_try_init(|| open_session(db_path.clone()))?;
    if session.db_path != db_path {
        return Err(format!(
            "store already initialized at `{}`; refusing to switch to `{}`",
            session.db_path.display(),
            db_path.display()
        ));
    }
    Ok(())
}

fn open_session(db_path: PathBuf) -> Result<ShoppingSession, String> {
    let runtime = runtime()?;
    ensure_outside_runtime()?;
    let store = ItemStore::open(&db_path)
        .map_err(|err| format!("store open failed at `{}`: {err}", db_path.display()))?;
    let controller = {
        let _guard = runtime.enter();
        ListController::spawn(store)
    };
    block_on(controller.reload().wait())?
        .map_err(|err| format!("initial load failed: {err}"))?;
    info!(
        "event=store_init module=ffi status=ok items={}",
        controller.items_view().len()
    );
    Ok(ShoppingSession {
        db_path,
        controller,
    })
}

/// Blocks the calling thread on the controller runtime.
///
/// Fails instead of panicking when the caller already runs inside a tokio
/// context, where nested `block_on` is not allowed.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = runtime()?;
    ensure_outside_runtime()?;
    Ok(runtime.block_on(future))
}

fn ensure_outside_runtime() -> Result<(), String> {
    if Handle::try_current().is_ok() {
        return Err("called from inside an async runtime; use a plain thread".to_string());
    }
    Ok(())
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mylist-controller")
            .enable_all()
            .build()
            .map_err(|err| format!("runtime start failed: {err}"))
    })
}

fn resolve_db_path(db_path: Option<String>) -> PathBuf {
    let from_env = || {
        std::env::var(DB_PATH_ENV)
            .ok()
            .filter(|raw| !raw.trim().is_empty())
    };
    match db_path.filter(|raw| !raw.trim().is_empty()).or_else(from_env) {
        Some(raw) => PathBuf::from(raw.trim()),
        None => std::env::temp_dir().join(DB_FILE_NAME),
    }
}

fn run_intent(
    action: &str,
    submit: impl FnOnce(&ListController) -> PendingIntent,
) -> ShoppingActionResponse {
    let Some(session) = SESSION.get() else {
        return ShoppingActionResponse::failure("Store not initialized; call init_store first.");
    };
    // Checked before submitting so a rejected call never reaches the store.
    if let Err(err) = ensure_outside_runtime() {
        warn!("event=intent_ffi module=ffi status=error action={action} error_code=nested_runtime");
        return ShoppingActionResponse::failure(format!("{action} rejected: {err}"));
    }
    let result: ControllerResult<WriteOutcome> =
        match block_on(submit(&session.controller).wait()) {
            Ok(result) => result,
            Err(err) => return ShoppingActionResponse::failure(format!("{action} failed: {err}")),
        };
    match result {
        Ok(outcome) => ShoppingActionResponse::completed(action, outcome),
        Err(err) => {
            warn!("event=intent_ffi module=ffi status=error action={action} error={err}");
            ShoppingActionResponse::failure(format!("{action} failed: {err}"))
        }
    }
}
