mod central_panel;
mod nav_panel;
mod tank_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use nav_panel::nav_panel;
pub use tank_panel::tank_panel;
pub use tools_panel::tools_panel;
