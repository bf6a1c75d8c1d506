//! Named commands and extensions
//!
//! A [`CommandRegistry`] maps string ids to handlers that operate on an
//! [`EditorSession`]. Front ends (key bindings, a command palette, the CLI)
//! and [`Extension`]s add commands without the core knowing about them.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::error::EditError;
use crate::search::{self, SearchError, SearchQuery};
use crate::session::EditorSession;
use crate::text::Position;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command '{0}' is already registered")]
    Duplicate(String),

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("command failed: {0}")]
    Failed(String),
}

impl From<EditError> for CommandError {
    fn from(err: EditError) -> Self {
        CommandError::Failed(err.to_string())
    }
}

impl From<SearchError> for CommandError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Edit(e) => e.into(),
            other => CommandError::InvalidArguments(other.to_string()),
        }
    }
}

/// What a command did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Ran successfully but nothing changed (e.g. undo with empty history)
    NoChange,
    Message(String),
}

pub type CommandResult = Result<CommandOutcome, CommandError>;

pub type CommandHandler = Box<dyn Fn(&mut EditorSession, &[String]) -> CommandResult + Send + Sync>;

struct RegisteredCommand {
    description: String,
    handler: CommandHandler,
}

/// Something that contributes commands to a registry
pub trait Extension {
    fn name(&self) -> &str;

    fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError>;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the core commands
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (id, description, handler) in builtins() {
            let registered = registry.register(id, description, handler);
            debug_assert!(registered.is_ok(), "duplicate builtin command '{}'", id);
        }
        registry
    }

    pub fn register(
        &mut self,
        id: &str,
        description: &str,
        handler: CommandHandler,
    ) -> Result<(), CommandError> {
        if self.commands.contains_key(id) {
            return Err(CommandError::Duplicate(id.to_string()));
        }
        tracing::debug!("Registered command '{}'", id);
        self.commands.insert(
            id.to_string(),
            RegisteredCommand {
                description: description.to_string(),
                handler,
            },
        );
        Ok(())
    }

    /// Register everything an extension provides, or nothing if any of its
    /// ids collide with an existing command
    pub fn load_extension(&mut self, extension: &dyn Extension) -> Result<(), CommandError> {
        let mut staged = CommandRegistry::new();
        extension.register(&mut staged)?;
        if let Some(id) = staged.commands.keys().find(|id| self.contains(id)) {
            tracing::warn!(
                "Extension '{}' not loaded: command '{}' already exists",
                extension.name(),
                id
            );
            return Err(CommandError::Duplicate(id.clone()));
        }
        tracing::info!(
            "Loaded extension '{}' ({} commands)",
            extension.name(),
            staged.commands.len()
        );
        self.commands.append(&mut staged.commands);
        Ok(())
    }

    pub fn execute(
        &self,
        id: &str,
        session: &mut EditorSession,
        args: &[String],
    ) -> Result<CommandOutcome, CommandError> {
        let command = self
            .commands
            .get(id)
            .ok_or_else(|| CommandError::Unknown(id.to_string()))?;
        tracing::debug!("Executing command '{}' {:?}", id, args);
        let result = (command.handler)(session, args);
        if let Err(e) = &result {
            tracing::warn!("Command '{}' failed: {}", id, e);
        }
        result
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    pub fn description(&self, id: &str) -> Option<&str> {
        self.commands.get(id).map(|c| c.description.as_str())
    }

    /// (id, description) pairs sorted by id
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands
            .iter()
            .map(|(id, c)| (id.as_str(), c.description.as_str()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Built-in commands
// ============================================================================

fn builtins() -> [(&'static str, &'static str, CommandHandler); 5] {
    [
        ("undo", "Undo the last edit", Box::new(undo)),
        ("redo", "Redo the last undone edit", Box::new(redo)),
        (
            "save-boundary",
            "End the current typing group",
            Box::new(save_boundary),
        ),
        (
            "replace-all",
            "Replace every match: PATTERN REPLACEMENT [regex] [ignore-case]",
            Box::new(replace_all),
        ),
        (
            "insert-text",
            "Insert text: LINE COLUMN TEXT",
            Box::new(insert_text),
        ),
    ]
}

fn no_args(args: &[String]) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::InvalidArguments(format!(
            "expected no arguments, got {}",
            args.len()
        )))
    }
}

fn changed(applied: bool) -> CommandOutcome {
    if applied {
        CommandOutcome::Applied
    } else {
        CommandOutcome::NoChange
    }
}

fn undo(session: &mut EditorSession, args: &[String]) -> Result<CommandOutcome, CommandError> {
    no_args(args)?;
    Ok(changed(session.undo()))
}

fn redo(session: &mut EditorSession, args: &[String]) -> Result<CommandOutcome, CommandError> {
    no_args(args)?;
    Ok(changed(session.redo()))
}

fn save_boundary(
    session: &mut EditorSession,
    args: &[String],
) -> Result<CommandOutcome, CommandError> {
    no_args(args)?;
    session.commit_boundary();
    Ok(CommandOutcome::Applied)
}

fn replace_all(
    session: &mut EditorSession,
    args: &[String],
) -> Result<CommandOutcome, CommandError> {
    let [pattern, replacement, flags @ ..] = args else {
        return Err(CommandError::InvalidArguments(
            "expected PATTERN REPLACEMENT".to_string(),
        ));
    };
    let mut regex = false;
    let mut case_sensitive = true;
    for flag in flags {
        match flag.as_str() {
            "regex" => regex = true,
            "ignore-case" => case_sensitive = false,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown flag '{}'",
                    other
                )))
            }
        }
    }
    let query = SearchQuery::new(pattern, case_sensitive, regex)?;
    let count = search::replace_all(session, &query, replacement)?;
    Ok(CommandOutcome::Message(format!("{} replacements", count)))
}

fn parse_index(value: &str, what: &str) -> Result<usize, CommandError> {
    value
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("{what} '{value}' is not a number")))
}

fn insert_text(
    session: &mut EditorSession,
    args: &[String],
) -> Result<CommandOutcome, CommandError> {
    let [line, column, text] = args else {
        return Err(CommandError::InvalidArguments(
            "expected LINE COLUMN TEXT".to_string(),
        ));
    };
    let at = Position::new(parse_index(line, "line")?, parse_index(column, "column")?);
    session.insert(at, text)?;
    Ok(CommandOutcome::Applied)
}
