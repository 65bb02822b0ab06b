//! TOML edit scripts
//!
//! A script is a list of `[[edits]]` tables applied in file order:
//!
//! ```toml
//! [[edits]]
//! action = "set"
//! section = 0
//! item = 2
//! field = "price:1"
//! value = "45"
//!
//! [[edits]]
//! action = "add"
//! section = 1
//!
//! [[edits]]
//! action = "toggle"
//! section = 0
//! item = 3
//! ```

use crate::edit_model::{EditCommand, EditError, FieldRef};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when reading an edit script
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Edit #{index} ({action}) is missing '{field}'")]
    MissingField {
        index: usize,
        action: &'static str,
        field: &'static str,
    },

    #[error("Edit #{index}: {source}")]
    InvalidField {
        index: usize,
        #[source]
        source: EditError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Set,
    Add,
    Toggle,
}

impl EditAction {
    fn name(self) -> &'static str {
        match self {
            EditAction::Set => "set",
            EditAction::Add => "add",
            EditAction::Toggle => "toggle",
        }
    }
}

/// One `[[edits]]` table
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEntry {
    pub action: EditAction,
    pub section: usize,
    pub item: Option<usize>,
    pub field: Option<String>,
    pub value: Option<String>,
}

/// A parsed edit script
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditScript {
    #[serde(default)]
    pub edits: Vec<ScriptEntry>,
}

impl EditScript {
    /// Load a script file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ScriptError::IoError(path.to_path_buf(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(content)?)
    }

    /// Translate every entry into a command, in file order
    ///
    /// # Returns
    /// * `Ok(Vec<EditCommand>)` - One command per entry
    /// * `Err(ScriptError)` - The first entry lacking a field its action needs
    pub fn commands(&self) -> Result<Vec<EditCommand>, ScriptError> {
        self.edits
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.command(index + 1))
            .collect()
    }
}

impl ScriptEntry {
    fn command(&self, index: usize) -> Result<EditCommand, ScriptError> {
        let missing = |field| ScriptError::MissingField {
            index,
            action: self.action.name(),
            field,
        };

        match self.action {
            EditAction::Add => Ok(EditCommand::AddItem {
                section: self.section,
            }),
            EditAction::Toggle => Ok(EditCommand::ToggleRemoved {
                section: self.section,
                item: self.item.ok_or_else(|| missing("item"))?,
            }),
            EditAction::Set => {
                let field: FieldRef = self
                    .field
                    .as_deref()
                    .ok_or_else(|| missing("field"))?
                    .parse()
                    .map_err(|source| ScriptError::InvalidField { index, source })?;
                Ok(EditCommand::SetField {
                    section: self.section,
                    item: self.item.ok_or_else(|| missing("item"))?,
                    field,
                    value: self.value.clone().ok_or_else(|| missing("value"))?,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_translates_in_order() {
        // Arrange
        let script = EditScript::from_toml(
            r#"
[[edits]]
action = "add"
section = 1

[[edits]]
action = "set"
section = 1
item = 4
field = "price:1"
value = "45"

[[edits]]
action = "toggle"
section = 0
item = 2
"#,
        )
        .unwrap();

        // Act
        let commands = script.commands().unwrap();

        // Assert
        assert_eq!(
            commands,
            vec![
                EditCommand::AddItem { section: 1 },
                EditCommand::SetField {
                    section: 1,
                    item: 4,
                    field: FieldRef::Price(1),
                    value: "45".to_string(),
                },
                EditCommand::ToggleRemoved { section: 0, item: 2 },
            ]
        );
    }

    #[test]
    fn test_missing_value_is_reported() {
        let script = EditScript::from_toml(
            r#"
[[edits]]
action = "set"
section = 0
item = 0
field = "name"
"#,
        )
        .unwrap();

        let err = script.commands().unwrap_err();
        assert!(matches!(
            err,
            ScriptError::MissingField { index: 1, field: "value", .. }
        ));
    }

    #[test]
    fn test_bad_field_is_reported() {
        let script = EditScript::from_toml(
            r#"
[[edits]]
action = "set"
section = 0
item = 0
field = "colour"
value = "red"
"#,
        )
        .unwrap();

        assert!(matches!(
            script.commands(),
            Err(ScriptError::InvalidField { index: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_action_fails_to_parse() {
        let result = EditScript::from_toml("[[edits]]\naction = \"move\"\nsection = 0\n");
        assert!(matches!(result, Err(ScriptError::ParseError(_))));
    }

    #[test]
    fn test_empty_script_has_no_commands() {
        let script = EditScript::from_toml("").unwrap();
        assert!(script.commands().unwrap().is_empty());
    }
}
