//! Parsing of edit flags given on the command line

use crate::edit_model::{EditCommand, FieldRef};
use crate::offers::{OffersEditModel, OffersError};
use anyhow::{Context, Result};

/// Parse `SECTION:ITEM:FIELD=VALUE`
///
/// FIELD may be `price:N`; everything after the first `=` is the value.
pub fn parse_set(arg: &str) -> Result<EditCommand> {
    let (target, value) = arg.split_once('=').context("expected S:I:FIELD=VALUE")?;
    let mut parts = target.splitn(3, ':');
    let (Some(section), Some(item), Some(field)) = (parts.next(), parts.next(), parts.next())
    else {
        anyhow::bail!("expected S:I:FIELD=VALUE");
    };

    Ok(EditCommand::SetField {
        section: parse_index(section)?,
        item: parse_index(item)?,
        field: field.parse::<FieldRef>()?,
        value: value.to_string(),
    })
}

/// Parse `SECTION:ITEM`
pub fn parse_toggle(arg: &str) -> Result<EditCommand> {
    let (section, item) = arg.split_once(':').context("expected SECTION:ITEM")?;
    Ok(EditCommand::ToggleRemoved {
        section: parse_index(section)?,
        item: parse_index(item)?,
    })
}

fn parse_index(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .with_context(|| format!("'{}' is not an index", text))
}

/// One change to the offers document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffersEdit {
    SetTitle { day: String, text: String },
    AddLine { day: String, text: String },
    SetLine { day: String, line: usize, text: String },
    DeleteLine { day: String, line: usize },
}

impl OffersEdit {
    pub fn apply(&self, offers: &mut OffersEditModel) -> Result<(), OffersError> {
        match self {
            OffersEdit::SetTitle { day, text } => offers.set_title(day, text),
            OffersEdit::AddLine { day, text } => offers.add_line(day, text).map(|_| ()),
            OffersEdit::SetLine { day, line, text } => offers.set_line(day, *line, text),
            OffersEdit::DeleteLine { day, line } => offers.delete_line(day, *line).map(|_| ()),
        }
    }
}

/// Collect offers edits: titles, added lines, replaced lines, then deletions
///
/// Deletions run from the highest index down, so every index given refers
/// to the lines as they were before any deletion.
pub fn collect_offers_edits(
    titles: &[String],
    add_lines: &[String],
    set_lines: &[String],
    delete_lines: &[String],
) -> Result<Vec<OffersEdit>> {
    let mut edits = Vec::new();

    for arg in titles {
        let (day, text) = split_day_text(arg, "--title")?;
        edits.push(OffersEdit::SetTitle { day, text });
    }
    for arg in add_lines {
        let (day, text) = split_day_text(arg, "--add-line")?;
        edits.push(OffersEdit::AddLine { day, text });
    }
    for arg in set_lines {
        let (target, text) = split_day_text(arg, "--set-line")?;
        let (day, line) = split_day_line(&target, "--set-line")?;
        edits.push(OffersEdit::SetLine { day, line, text });
    }

    let mut deletions = delete_lines
        .iter()
        .map(|arg| split_day_line(arg, "--delete-line"))
        .collect::<Result<Vec<_>>>()?;
    deletions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    deletions.dedup();
    edits.extend(
        deletions
            .into_iter()
            .map(|(day, line)| OffersEdit::DeleteLine { day, line }),
    );

    Ok(edits)
}

fn split_day_text(arg: &str, flag: &str) -> Result<(String, String)> {
    let (day, text) = arg
        .split_once('=')
        .with_context(|| format!("Invalid {} '{}', expected DAY=TEXT", flag, arg))?;
    Ok((day.trim().to_string(), text.to_string()))
}

fn split_day_line(arg: &str, flag: &str) -> Result<(String, usize)> {
    let (day, line) = arg
        .split_once(':')
        .with_context(|| format!("Invalid {} '{}', expected DAY:INDEX", flag, arg))?;
    Ok((day.trim().to_string(), parse_index(line)?))
}
