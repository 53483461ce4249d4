/*!
 * Shell Module
 * Console front end: command parsing and the interactive session
 */

mod command;
mod console;

pub use command::Command;
pub use console::{Console, Reply, Screen};
