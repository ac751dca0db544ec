//! Text rendering of resolved dependency trees

use sprig_core::types::{DependencyMap, DependencyNode};

use super::colors::ColorSupport;

/// Render `root` and its dependencies as an indented tree.
///
/// Each dependency is shown as `name@version (range)`, children in name order.
pub fn render_tree(root: &str, dependencies: &DependencyMap, colors: &ColorSupport) -> String {
    let mut output = colors.bold(root);
    output.push('\n');

    if dependencies.is_empty() {
        output.push_str(&colors.dim("(no dependencies)"));
        output.push('\n');
        return output;
    }

    render_children(dependencies, "", colors, &mut output);
    output
}

fn render_children(dependencies: &DependencyMap, prefix: &str, colors: &ColorSupport, output: &mut String) {
    let last_index = dependencies.len().saturating_sub(1);
    for (index, node) in dependencies.values().enumerate() {
        let last = index == last_index;
        output.push_str(prefix);
        output.push_str(if last { "└── " } else { "├── " });
        output.push_str(&node_label(node, colors));
        output.push('\n');

        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        render_children(node.dependencies(), &child_prefix, colors, output);
    }
}

fn node_label(node: &DependencyNode, colors: &ColorSupport) -> String {
    format!(
        "{}@{} {}",
        node.name(),
        colors.green(node.version()),
        colors.dim(&format!("({})", node.range()))
    )
}
