#[path = "core/document.rs"]
mod document;
#[path = "core/history.rs"]
mod history;
#[path = "core/routing.rs"]
mod routing;
#[path = "core/snap.rs"]
mod snap;
#[path = "core/viewport.rs"]
mod viewport;
