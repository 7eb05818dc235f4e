// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tge inspect` command: display model structure.
//!
//! Decodes the model file and prints a breakdown of operator codes,
//! tensors, and operators per subgraph.

use model_store::GraphStore;
use schema_core::opcode;
use std::path::PathBuf;

pub fn execute(model: PathBuf) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               tge · Model Inspector                  ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let bytes = std::fs::read(&model)
        .map_err(|e| anyhow::anyhow!("cannot read '{}': {e}", model.display()))?;
    let store = GraphStore::from_bytes(&bytes)
        .map_err(|e| anyhow::anyhow!("failed to decode '{}': {e}", model.display()))?;

    // ── Summary ────────────────────────────────────────────────
    println!("  {}", store.summary());
    println!("  File size: {:.1} KB", bytes.len() as f64 / 1024.0);
    println!();

    // ── Operator codes ─────────────────────────────────────────
    println!("  Operator codes:");
    for (i, oc) in store.model().operator_codes.iter().enumerate() {
        let name = oc
            .custom_code
            .as_deref()
            .or_else(|| opcode::by_code(oc.builtin_code).map(|s| s.name))
            .unwrap_or("<unknown>");
        println!("   [{i}] code {:>4}  {name}", oc.builtin_code);
    }
    println!();

    // ── Per-subgraph detail ────────────────────────────────────
    for (si, sg) in store.model().subgraphs.iter().enumerate() {
        println!(
            "  Subgraph {si}{}:",
            sg.name.as_deref().map(|n| format!(" ('{n}')")).unwrap_or_default(),
        );

        println!(
            "   {:<4} {:<28} {:<10} {:<14} {:>6} {:>4}",
            "Idx", "Tensor", "Type", "Shape", "Buf", "Var",
        );
        println!("   {}", "-".repeat(72));
        for (ti, t) in sg.tensors.iter().enumerate() {
            println!(
                "   {:<4} {:<28} {:<10} {:<14} {:>6} {:>4}",
                ti,
                super::truncate(&t.name, 28),
                t.dtype.as_str(),
                t.shape.to_string(),
                t.buffer,
                if t.is_variable { "yes" } else { "" },
            );
        }
        println!();

        println!(
            "   {:<4} {:<22} {:<18} {:<14} {}",
            "Idx", "Operator", "Options", "Inputs", "Outputs",
        );
        println!("   {}", "-".repeat(72));
        for (oi, op) in sg.operators.iter().enumerate() {
            let name = store
                .operator_code(op.opcode_index as usize)
                .ok()
                .map(|oc| {
                    oc.custom_code
                        .as_deref()
                        .or_else(|| opcode::by_code(oc.builtin_code).map(|s| s.name))
                        .unwrap_or("<unknown>")
                        .to_string()
                })
                .unwrap_or_else(|| "<bad opcode index>".into());
            let options = if op.custom_options.is_empty() {
                op.options_tag.as_str().to_string()
            } else {
                format!("custom ({} B)", op.custom_options.len())
            };
            println!(
                "   {:<4} {:<22} {:<18} {:<14} {:?}",
                oi,
                super::truncate(&name, 22),
                options,
                format!("{:?}", op.inputs),
                op.outputs,
            );
        }
        println!();
    }

    Ok(())
}
