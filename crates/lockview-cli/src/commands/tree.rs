//! `lockview tree` command implementation.

use lockview_core::error::LockviewResult;
use lockview_core::types::TreeNode;
use lockview_resolver::{installed_tree, TreeOptions};

use super::CommandContext;
use crate::output::colors::ColorSupport;

/// Installed dependency forest of the enclosing project
pub async fn collect(depth: Option<usize>, ctx: &CommandContext) -> Vec<TreeNode> {
    let options = TreeOptions { max_depth: depth };
    installed_tree(&ctx.project_dir(), options).await
}

/// Draw the forest with box-drawing guides
pub fn render_forest(forest: &[TreeNode], colors: &ColorSupport) -> String {
    let mut lines = Vec::new();
    for (i, node) in forest.iter().enumerate() {
        render_node(node, "", i + 1 == forest.len(), colors, &mut lines);
    }
    lines.join("\n")
}

fn render_node(node: &TreeNode, prefix: &str, last: bool, colors: &ColorSupport, lines: &mut Vec<String>) {
    let branch = if last { "└── " } else { "├── " };
    lines.push(format!(
        "{}{}{}{}",
        colors.dim(prefix),
        colors.dim(branch),
        node.name,
        colors.dim(&format!("@{}", node.version))
    ));

    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
    for (i, child) in node.children.iter().enumerate() {
        render_node(child, &child_prefix, i + 1 == node.children.len(), colors, lines);
    }
}

/// Execute the `lockview tree` command
pub async fn execute(depth: Option<usize>, ctx: &CommandContext) -> LockviewResult<()> {
    let forest = collect(depth, ctx).await;

    if ctx.json {
        return ctx.output.json(&forest);
    }

    if forest.is_empty() {
        ctx.output.info("No installed dependencies (run npm install first)");
        return Ok(());
    }

    ctx.output.line(&render_forest(&forest, ctx.output.colors()));
    Ok(())
}
