pub mod shell_commands;
pub mod terminal_view;
