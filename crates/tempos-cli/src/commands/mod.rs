// Each subcommand has its own module; all of them take the shared service.

pub mod add;
pub mod admin;
pub mod ask;
pub mod list;
