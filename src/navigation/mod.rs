pub mod controller;
pub mod loop_worker;
pub mod tracker;

pub use controller::{NavigationWatcher, WatcherHandle};
pub use loop_worker::NavigationCallback;
pub use tracker::{NavigationEvent, WatcherSnapshot};
