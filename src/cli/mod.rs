// Terminal front-end for the reset flow
// Prompts instead of form fields, a spinner for the simulated network
// latency, and a confirmation question before backward navigation.

mod reset;
mod status;
pub mod utils;

pub use reset::run_reset;
pub use status::{clear_state, show_status};
