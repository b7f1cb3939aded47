use mylist_core::{
    ControllerError, ItemId, ItemRepository, ItemStore, ItemValidationError, ListController,
    RepoError, RepoResult, ShoppingItem, WriteOutcome,
};

fn spawn_with_store() -> (ListController, ItemStore) {
    let store = ItemStore::open_in_memory().unwrap();
    let controller = ListController::spawn(store.clone());
    (controller, store)
}

fn find(controller: &ListController, id: ItemId) -> Option<ShoppingItem> {
    controller
        .items_view()
        .into_iter()
        .find(|item| item.id == id)
}

#[tokio::test]
async fn milk_and_eggs_walkthrough() {
    let (controller, store) = spawn_with_store();

    controller.add_item("milk").wait().await.unwrap();
    controller.add_item("eggs").wait().await.unwrap();
    assert_eq!(
        controller.items_view(),
        vec![
            ShoppingItem::with_id(2, "eggs", false),
            ShoppingItem::with_id(1, "milk", false),
        ]
    );

    let milk = find(&controller, 1).unwrap();
    let outcome = controller.toggle_bought(&milk).wait().await.unwrap();
    assert_eq!(outcome, WriteOutcome::Applied);
    assert!(find(&controller, 1).unwrap().is_bought);
    assert!(!find(&controller, 2).unwrap().is_bought);

    let eggs = find(&controller, 2).unwrap();
    controller.delete_item(&eggs).wait().await.unwrap();
    assert_eq!(
        controller.items_view(),
        vec![ShoppingItem::with_id(1, "milk", true)]
    );

    let milk = find(&controller, 1).unwrap();
    controller
        .update_item_name(&milk, "whole milk")
        .wait()
        .await
        .unwrap();
    let expected = vec![ShoppingItem::with_id(1, "whole milk", true)];
    assert_eq!(controller.items_view(), expected);
    assert_eq!(store.get_all_items().unwrap(), expected);
}

#[tokio::test]
async fn spawn_loads_existing_items() {
    let store = ItemStore::open_in_memory().unwrap();
    store.insert_item(&ShoppingItem::new("bread")).unwrap();
    store.insert_item(&ShoppingItem::new("butter")).unwrap();

    let controller = ListController::spawn(store);
    // Intents are applied in order, so the initial reload is done after this.
    controller.cancel_edit().wait().await.unwrap();

    let names = controller
        .items_view()
        .into_iter()
        .map(|item| item.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["butter", "bread"]);
}

#[tokio::test]
async fn toggling_twice_restores_flag_and_keeps_name() {
    let (controller, store) = spawn_with_store();
    controller.add_item("tea").wait().await.unwrap();
    let original = controller.items_view()[0].clone();

    controller.toggle_bought(&original).wait().await.unwrap();
    let toggled = find(&controller, original.id).unwrap();
    controller.toggle_bought(&toggled).wait().await.unwrap();

    assert_eq!(find(&controller, original.id).unwrap(), original);
    assert_eq!(store.get_all_items().unwrap(), vec![original]);
}

#[tokio::test]
async fn rename_changes_only_the_name() {
    let (controller, _store) = spawn_with_store();
    controller.add_item("milk").wait().await.unwrap();
    let milk = controller.items_view()[0].clone();
    controller.toggle_bought(&milk).wait().await.unwrap();
    let bought = find(&controller, milk.id).unwrap();

    controller
        .update_item_name(&bought, "oat milk")
        .wait()
        .await
        .unwrap();

    let renamed = find(&controller, milk.id).unwrap();
    assert_eq!(renamed.id, milk.id);
    assert_eq!(renamed.name, "oat milk");
    assert!(renamed.is_bought);
}

#[tokio::test]
async fn blank_add_is_rejected_before_the_store() {
    let (controller, store) = spawn_with_store();

    let err = controller.add_item("   ").wait().await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Repo(RepoError::Validation(ItemValidationError::EmptyName))
    ));
    assert!(controller.items_view().is_empty());
    assert!(store.get_all_items().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_missing_id_leaves_view_and_store_unchanged() {
    let (controller, store) = spawn_with_store();
    controller.add_item("milk").wait().await.unwrap();
    let before = controller.items_view();

    let outcome = controller
        .delete_item(&ShoppingItem::with_id(42, "ghost", false))
        .wait()
        .await
        .unwrap();

    assert_eq!(outcome, WriteOutcome::Missing);
    assert_eq!(controller.items_view(), before);
    assert_eq!(store.get_all_items().unwrap(), before);
}

#[tokio::test]
async fn toggle_of_item_missing_from_view_only_touches_store() {
    let (controller, store) = spawn_with_store();
    controller.add_item("milk").wait().await.unwrap();
    let hidden_id = store.insert_item(&ShoppingItem::new("jam")).unwrap();
    let hidden = ShoppingItem::with_id(hidden_id, "jam", false);

    let outcome = controller.toggle_bought(&hidden).wait().await.unwrap();

    assert_eq!(outcome, WriteOutcome::Applied);
    assert!(find(&controller, hidden_id).is_none());
    assert_eq!(controller.items_view().len(), 1);
    assert!(store.get_all_items().unwrap()[0].is_bought);

    controller.reload().wait().await.unwrap();
    assert!(find(&controller, hidden_id).unwrap().is_bought);
}

#[tokio::test]
async fn rapid_adds_are_applied_in_submission_order() {
    let (controller, _store) = spawn_with_store();
    let names = (0..20).map(|index| format!("item {index}")).collect::<Vec<_>>();

    let pending = names
        .iter()
        .map(|name| controller.add_item(name.as_str()))
        .collect::<Vec<_>>();
    for intent in pending {
        intent.wait().await.unwrap();
    }

    let mut expected = names.clone();
    expected.reverse();
    let listed = controller
        .items_view()
        .into_iter()
        .map(|item| item.name)
        .collect::<Vec<_>>();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn edit_selection_flow() {
    let (controller, _store) = spawn_with_store();
    controller.add_item("milk").wait().await.unwrap();
    let milk = controller.items_view()[0].clone();

    let nothing_selected = controller.confirm_edit("skim milk").wait().await.unwrap();
    assert_eq!(nothing_selected, WriteOutcome::Missing);

    controller.begin_edit(&milk).wait().await.unwrap();
    assert_eq!(controller.editing(), Some(milk.clone()));

    controller.cancel_edit().wait().await.unwrap();
    assert_eq!(controller.editing(), None);
    assert_eq!(controller.items_view()[0].name, "milk");

    controller.begin_edit(&milk).wait().await.unwrap();
    let outcome = controller.confirm_edit("skim milk").wait().await.unwrap();
    assert_eq!(outcome, WriteOutcome::Applied);
    assert_eq!(controller.editing(), None);
    assert_eq!(controller.items_view()[0].name, "skim milk");
}

#[tokio::test]
async fn confirm_edit_keeps_toggle_made_while_editing() {
    let (controller, store) = spawn_with_store();
    controller.add_item("milk").wait().await.unwrap();
    let milk = controller.items_view()[0].clone();

    controller.begin_edit(&milk).wait().await.unwrap();
    controller.toggle_bought(&milk).wait().await.unwrap();
    assert_eq!(controller.editing().map(|item| item.is_bought), Some(true));

    controller.confirm_edit("skim milk").wait().await.unwrap();

    let expected = vec![ShoppingItem::with_id(milk.id, "skim milk", true)];
    assert_eq!(controller.items_view(), expected);
    assert_eq!(store.get_all_items().unwrap(), expected);
}

#[tokio::test]
async fn deleting_selected_item_clears_selection() {
    let (controller, _store) = spawn_with_store();
    controller.add_item("milk").wait().await.unwrap();
    let milk = controller.items_view()[0].clone();

    controller.begin_edit(&milk).wait().await.unwrap();
    controller.delete_item(&milk).wait().await.unwrap();

    let state = controller.state();
    assert!(state.items.is_empty());
    assert!(state.editing.is_none());
}

#[tokio::test]
async fn subscribers_are_notified_of_view_changes() {
    let (controller, _store) = spawn_with_store();
    controller.reload().wait().await.unwrap();
    let mut updates = controller.subscribe();
    updates.borrow_and_update();

    controller.add_item("coffee").wait().await.unwrap();

    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().items[0].name, "coffee");
}

struct UnavailableRepo;

impl ItemRepository for UnavailableRepo {
    fn get_all_items(&self) -> RepoResult<Vec<ShoppingItem>> {
        Err(RepoError::StoreUnavailable("disk detached".to_string()))
    }

    fn insert_item(&self, _item: &ShoppingItem) -> RepoResult<ItemId> {
        Err(RepoError::StoreUnavailable("disk detached".to_string()))
    }

    fn update_item(&self, _item: &ShoppingItem) -> RepoResult<WriteOutcome> {
        Err(RepoError::StoreUnavailable("disk detached".to_string()))
    }

    fn delete_item(&self, _item: &ShoppingItem) -> RepoResult<WriteOutcome> {
        Err(RepoError::StoreUnavailable("disk detached".to_string()))
    }
}

#[tokio::test]
async fn store_faults_are_reported_and_controller_keeps_serving() {
    let controller = ListController::spawn(UnavailableRepo);

    let add_err = controller.add_item("milk").wait().await.unwrap_err();
    assert!(matches!(
        add_err,
        ControllerError::Repo(RepoError::StoreUnavailable(_))
    ));

    let toggle_err = controller
        .toggle_bought(&ShoppingItem::with_id(1, "milk", false))
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(toggle_err, ControllerError::Repo(_)));
    assert!(controller.items_view().is_empty());

    controller.cancel_edit().wait().await.unwrap();
}

#[test]
fn intents_after_runtime_shutdown_report_stopped() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let controller = {
        let _guard = runtime.enter();
        ListController::spawn(ItemStore::open_in_memory().unwrap())
    };
    drop(runtime);

    let waiter = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let err = waiter
        .block_on(controller.add_item("milk").wait())
        .unwrap_err();
    assert!(matches!(err, ControllerError::Stopped));
}
