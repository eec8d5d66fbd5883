mod ask_controller;
mod backends_controller;
mod remote_controller;

pub use ask_controller::{format_results, AskController};
pub use backends_controller::{format_backends, BackendsController};
pub use remote_controller::RemoteController;
