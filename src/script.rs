//! Session scripts
//!
//! A script is a JSON array of commands replayed against a [`WizardSession`]
//! in order, the way a front end would send them. List items are addressed by
//! their position in the current step. Rejected commands are recorded and the
//! replay carries on, so one script can exercise both failures and the
//! eventual submission.

use crate::error::WizardError;
use crate::state::forms::{FieldErrors, ItemId, Record, StepInput};
use crate::state::{WizardPhase, WizardSession};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ScriptCommand {
    /// Merge fields into the draft of a single-record step
    UpdateDraft { patch: Record },
    /// Append a fresh item to the current list step
    AddItem,
    UpdateItem { item: usize, patch: Record },
    RemoveItem { item: usize },
    /// Submit whatever the current step holds
    Submit,
    /// Replace the draft(s) and submit; `step` guards against stale submits
    SubmitStep {
        #[serde(default)]
        step: Option<String>,
        draft: StepInput,
    },
}

impl ScriptCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptCommand::UpdateDraft { .. } => "update_draft",
            ScriptCommand::AddItem => "add_item",
            ScriptCommand::UpdateItem { .. } => "update_item",
            ScriptCommand::RemoveItem { .. } => "remove_item",
            ScriptCommand::Submit => "submit",
            ScriptCommand::SubmitStep { .. } => "submit_step",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("no item at position {0}")]
    NoItemAt(usize),
}

/// A command the session refused
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Zero-based position in the script
    pub index: usize,
    pub command: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<Rejection>,
    pub phase: WizardPhase,
}

/// Parse a script from JSON text
pub fn parse(json: &str) -> Result<Vec<ScriptCommand>> {
    let commands = serde_json::from_str(json).context("Failed to parse session script")?;
    Ok(commands)
}

/// Read and parse a script file
pub async fn load(path: &Path) -> Result<Vec<ScriptCommand>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse(&content)
}

fn item(session: &WizardSession, index: usize) -> Result<ItemId, ReplayError> {
    session.item_id(index).ok_or(ReplayError::NoItemAt(index))
}

/// Apply a single command
pub fn apply(session: &mut WizardSession, command: ScriptCommand) -> Result<(), ReplayError> {
    match command {
        ScriptCommand::UpdateDraft { patch } => session.update_draft(patch)?,
        ScriptCommand::AddItem => {
            session.add_item()?;
        }
        ScriptCommand::UpdateItem { item: index, patch } => {
            let id = item(session, index)?;
            session.update_item(id, patch)?;
        }
        ScriptCommand::RemoveItem { item: index } => {
            let id = item(session, index)?;
            session.remove_item(id)?;
        }
        ScriptCommand::Submit => {
            session.submit_current()?;
        }
        ScriptCommand::SubmitStep { step: Some(step), draft } => {
            session.submit_named(&step, draft)?;
        }
        ScriptCommand::SubmitStep { step: None, draft } => {
            session.submit_step(draft)?;
        }
    }
    Ok(())
}

/// Replay every command, collecting rejections instead of stopping at them
pub fn replay(session: &mut WizardSession, commands: Vec<ScriptCommand>) -> ReplayReport {
    let mut applied = 0;
    let mut rejected = Vec::new();

    for (index, command) in commands.into_iter().enumerate() {
        let name = command.name();
        match apply(session, command) {
            Ok(()) => applied += 1,
            Err(err) => {
                let errors = match &err {
                    ReplayError::Wizard(e) => e.field_errors().cloned().unwrap_or_default(),
                    ReplayError::NoItemAt(_) => FieldErrors::default(),
                };
                tracing::info!(index, command = name, error = %err, "script command rejected");
                rejected.push(Rejection {
                    index,
                    command: name,
                    message: err.to_string(),
                    errors,
                });
            }
        }
    }

    ReplayReport {
        applied,
        rejected,
        phase: session.phase(),
    }
}
