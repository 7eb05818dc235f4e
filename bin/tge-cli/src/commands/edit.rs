// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tge edit` command: apply one JSON edit request to a model file.
//!
//! The file I/O here is the persistence collaborator's seat — the editor
//! core itself never touches the file system.

use edit_engine::{EditRequest, ModelEditor};
use std::path::PathBuf;

pub fn execute(
    model: PathBuf,
    request: PathBuf,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(&model)
        .map_err(|e| anyhow::anyhow!("cannot read '{}': {e}", model.display()))?;
    let json = std::fs::read_to_string(&request)
        .map_err(|e| anyhow::anyhow!("cannot read '{}': {e}", request.display()))?;

    let req = EditRequest::from_json(&json)?;
    let mut editor = ModelEditor::from_bytes(&bytes)?;
    tracing::info!("loaded {}", editor.store().summary());

    let after = editor.perform_edit(&req)?;

    let target = output.unwrap_or(model);
    std::fs::write(&target, after.as_bytes())
        .map_err(|e| anyhow::anyhow!("cannot write '{}': {e}", target.display()))?;

    println!(
        "Applied '{}' edit: {} → {} bytes, written to '{}'",
        req.kind(),
        bytes.len(),
        after.len(),
        target.display(),
    );
    Ok(())
}
