mod info;
mod scripts;

pub use info::cmd_info;
pub use scripts::cmd_scripts;
pub use test::{MergeArg, TestArgs, cmd_test};
