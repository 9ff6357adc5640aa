// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! DOT rendering of a pipeline.

use std::{
    fmt::Write,
    io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{Client, NodeKind};

/// Environment variable naming the directory DOT files are written into.
pub const DOT_DIR_ENV: &str = "ROUTING_DEBUG_DUMP_DOT_DIR";

/// Render the nodes of `client` and their subscriptions as a DOT graph.
#[must_use]
pub fn dot(client: &Client) -> String {
    let mut out = String::from("digraph pipeline {\n  rankdir=LR;\n  node [fontsize=10];\n");

    let nodes = client.nodes();
    for node in &nodes {
        let shape = match node.kind() {
            NodeKind::Input => "invhouse",
            NodeKind::Processor => "box",
            NodeKind::Output => "house",
            NodeKind::Duplex => "diamond",
        };
        _ = writeln!(
            out,
            "  \"{id}\" [shape={shape}, label=\"{id}\\n{type_name}\\n{streams} stream(s)\"];",
            id = escape(node.id().as_str()),
            type_name = node.type_name(),
            streams = node.announced().len(),
        );
    }

    for node in &nodes {
        for subscription in node.subscriptions() {
            _ = writeln!(
                out,
                "  \"{source}\" -> \"{target}\" [label=\"{selector}\"];",
                source = escape(subscription.source_id().as_str()),
                target = escape(node.id().as_str()),
                selector = escape(&subscription.selector().name()),
            );
        }
    }

    out.push_str("}\n");
    out
}

/// Write a DOT file of the pipeline with a counting index.
///
/// Does nothing unless [`DOT_DIR_ENV`] is set.
pub fn dot_file(client: &Client, filename_without_extension: &str) {
    let Ok(path) = std::env::var(DOT_DIR_ENV) else {
        return;
    };

    if let Err(e) = write_dot(client, Path::new(&path), filename_without_extension) {
        error!("Generation of dot file failed: {e:?}");
    }
}

/// Write `<index>-<name>.dot` into `dir`, creating it if needed.
///
/// # Errors
///
/// Fails if the directory or the file cannot be written.
pub fn write_dot(
    client: &Client,
    dir: &Path,
    filename_without_extension: &str,
) -> io::Result<PathBuf> {
    static COUNT: AtomicUsize = AtomicUsize::new(0);

    std::fs::create_dir_all(dir)?;

    let n = COUNT.fetch_add(1, Ordering::SeqCst);
    let file = dir.join(format!("{n}-{filename_without_extension}.dot"));

    info!("GENERATING DOT FILE: '{}'", file.display());
    std::fs::write(&file, dot(client))?;

    Ok(file)
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
