//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mylist_core` wiring end to end without the Flutter runtime.
//! - Keep output deterministic: always runs against a fresh in-memory store.

use mylist_core::{ItemStore, ListController};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("mylist_core ping={}", mylist_core::ping());
    println!("mylist_core version={}", mylist_core::core_version());

    let controller = ListController::spawn(ItemStore::open_in_memory()?);
    controller.add_item("milk").wait().await?;
    controller.add_item("eggs").wait().await?;

    if let Some(milk) = controller
        .items_view()
        .into_iter()
        .find(|item| item.name == "milk")
    {
        controller.toggle_bought(&milk).wait().await?;
    }

    for item in controller.items_view() {
        let mark = if item.is_bought { 'x' } else { ' ' };
        println!("[{mark}] #{} {}", item.id, item.name);
    }
    Ok(())
}
