use std::io::{self, BufRead};
use std::str::FromStr;
use std::thread;

use crate::error::AppError;
use crate::state::Browser;
use crate::ui::queue::UiHandle;

pub const HELP: &str = "\
commands:
  volumes                 list mounted volumes
  cd <path>               browse to a directory
  open <name>             open a folder of the current directory
  up                      go to the parent directory
  view <name>             preview a file of the current directory
  clear                   close the current directory
  focus | blur            simulate the window gaining or losing focus
  status                  print the status line
  rename <name> <new>     rename an item
  copy <name>             copy an item to the clipboard
  cut <name>              cut an item to the clipboard
  paste                   paste the clipboard into the current directory
  delete <name>           permanently delete an item
  help                    show this help
  quit                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Volumes,
    Browse(String),
    Open(String),
    Up,
    View(String),
    Clear,
    Focus,
    Blur,
    Status,
    Rename { name: String, new_name: String },
    Copy(String),
    Cut(String),
    Paste,
    Delete(String),
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(line)?;
        let Some((verb, args)) = tokens.split_first() else {
            return Err(AppError::General("empty command".to_string()));
        };

        let command = match (verb.to_ascii_lowercase().as_str(), args) {
            ("volumes", []) => Self::Volumes,
            ("cd", [path]) => Self::Browse(path.clone()),
            ("open", [name]) => Self::Open(name.clone()),
            ("up", []) => Self::Up,
            ("view", [name]) => Self::View(name.clone()),
            ("clear", []) => Self::Clear,
            ("focus", []) => Self::Focus,
            ("blur", []) => Self::Blur,
            ("status", []) => Self::Status,
            ("rename", [name, new_name]) => Self::Rename {
                name: name.clone(),
                new_name: new_name.clone(),
            },
            ("copy", [name]) => Self::Copy(name.clone()),
            ("cut", [name]) => Self::Cut(name.clone()),
            ("paste", []) => Self::Paste,
            ("delete" | "rm", [name]) => Self::Delete(name.clone()),
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (verb, _) => {
                return Err(AppError::General(format!(
                    "unknown command or wrong arguments: {verb} (try `help`)"
                )))
            }
        };
        Ok(command)
    }
}

/// Splits on whitespace; double quotes group a token and `\` escapes the
/// next character.
fn tokenize(line: &str) -> Result<Vec<String>, AppError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| AppError::General("dangling escape".to_string()))?;
                current.push(escaped);
                in_token = true;
            }
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(AppError::General("unterminated quote".to_string()));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn dispatch(browser: &mut Browser, command: ShellCommand) -> Result<(), AppError> {
    match command {
        ShellCommand::Volumes => browser.show_volumes(),
        ShellCommand::Browse(path) => browser.browse_to(&path)?,
        ShellCommand::Open(name) => browser.open_subdir(&name)?,
        ShellCommand::Up => browser.open_parent()?,
        ShellCommand::View(name) => {
            browser.select_file(&name)?;
        }
        ShellCommand::Clear => browser.clear(),
        ShellCommand::Focus => browser.focus_gained(),
        ShellCommand::Blur => browser.focus_lost(),
        ShellCommand::Status => println!("{}", browser.status_line()),
        ShellCommand::Rename { name, new_name } => browser.rename_selected(&name, &new_name)?,
        ShellCommand::Copy(name) => browser.copy_selected(&name)?,
        ShellCommand::Cut(name) => browser.cut_selected(&name)?,
        ShellCommand::Paste => browser.paste()?,
        ShellCommand::Delete(name) => browser.delete_selected(&name)?,
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => browser.close(),
    }
    Ok(())
}

/// Runs one line of user input on the UI context.
pub fn handle_line(browser: &mut Browser, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    let result = line
        .parse::<ShellCommand>()
        .and_then(|command| dispatch(browser, command));
    if let Err(e) = result {
        browser.report_error(e.title(), &e);
    }
}

/// Reads commands from stdin on a dedicated thread and posts each line to
/// the UI queue. End of input closes the browser.
pub fn spawn_stdin_reader(ui: UiHandle<Browser>) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("failed to read stdin: {e}");
                        break;
                    }
                };
                if !ui.post(move |browser: &mut Browser| handle_line(browser, &line)) {
                    return;
                }
            }
            ui.post(Browser::close);
        })?;
    Ok(())
}
