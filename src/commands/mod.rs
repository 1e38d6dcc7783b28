pub mod clone;
pub mod delete;
pub mod init;
pub mod list;
pub mod refresh;
pub mod revert;
pub mod switch;
pub mod update;

pub use clone::execute_clone;
pub use delete::execute_delete;
pub use list::execute_list;
pub use refresh::execute_refresh;
pub use revert::execute_revert;
pub use switch::execute_switch;
pub use update::execute_update;
