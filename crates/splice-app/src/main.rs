//! Splice - group hierarchy inspector
//!
//! Loads a persisted group hierarchy (or builds a small demo one) and prints
//! every tree as an indented outline.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use splice_core::ItemId;
use splice_timeline::{GroupController, GroupForest, GroupsFile};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::args().nth(1).map(PathBuf::from);

    let forest = match path {
        Some(path) => {
            info!("Loading groups from {:?}", path);
            let data =
                std::fs::read(&path).with_context(|| format!("failed to read {:?}", path))?;
            GroupsFile::from_json(&data)?.into_forest()?
        }
        None => {
            info!("No groups file given, using demo timeline");
            demo_forest()?
        }
    };

    info!(
        items = forest.len(),
        trees = forest.roots().len(),
        "group hierarchy ready"
    );
    print!("{}", render(&forest)?);
    Ok(())
}

/// Two clips grouped, then grouped again with a third clip; a fourth clip
/// stays on its own.
fn demo_forest() -> Result<GroupForest> {
    let controller = GroupController::new();
    for id in [10, 11, 12, 13] {
        controller.register_item(ItemId(id))?;
    }
    controller.group_selection(&[ItemId(10), ItemId(11)], ItemId(100))?;
    controller.group_selection(&[ItemId(11), ItemId(12)], ItemId(200))?;
    Ok(controller.snapshot())
}

fn render(forest: &GroupForest) -> Result<String> {
    let mut out = String::new();
    for root in forest.roots() {
        let mut pending = vec![(root, 0usize)];
        while let Some((node, depth)) = pending.pop() {
            let kind = if forest.is_leaf(node)? { "clip" } else { "group" };
            writeln!(out, "{:indent$}{} ({})", "", node, kind, indent = depth * 2)?;
            for child in forest.get_direct_children(node)?.into_iter().rev() {
                pending.push((child, depth + 1));
            }
        }
    }
    Ok(out)
}
