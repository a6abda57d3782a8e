mod command_overlay;
mod input;
mod log_panel;

pub use command_overlay::draw_command_overlay;
pub use input::{InputResult, TextInput};
pub use log_panel::draw_log_panel;
