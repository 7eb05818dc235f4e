// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tge custom-options` command: decode a custom operator's payload.

use edit_engine::ModelEditor;
use std::path::PathBuf;

pub fn execute(model: PathBuf, subgraph: usize, operator: usize) -> anyhow::Result<()> {
    let bytes = std::fs::read(&model)
        .map_err(|e| anyhow::anyhow!("cannot read '{}': {e}", model.display()))?;
    let editor = ModelEditor::from_bytes(&bytes)?;

    let map = editor.custom_options(subgraph, operator)?;
    if map.is_empty() {
        println!("operator {subgraph}:{operator} carries no custom attributes");
        return Ok(());
    }

    println!("Custom attributes of operator {subgraph}:{operator}:");
    for (key, value) in map.iter() {
        println!("  {key} = {value}");
    }
    Ok(())
}
