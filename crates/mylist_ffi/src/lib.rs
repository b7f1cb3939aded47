//! Flutter bridge for the MyList shopping list core.

pub mod api;
