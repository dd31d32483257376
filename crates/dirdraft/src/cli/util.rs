//! Shared utilities for CLI commands

use std::io::{self, Write};

use dirdraft_core::tree::Template;

/// Render a template as an indented tree. Folders carry a trailing slash;
/// tags other than the kind tag are shown in brackets.
pub fn render_tree(template: &Template) -> String {
    let mut out = String::new();
    template.visit(|node, depth| {
        let indent = "  ".repeat(depth);
        let suffix = if node.kind().is_folder() { "/" } else { "" };
        let extra: Vec<&str> = node
            .tags()
            .iter()
            .map(String::as_str)
            .filter(|t| *t != node.kind().tag())
            .collect();
        if extra.is_empty() {
            out.push_str(&format!("{indent}{}{suffix}\n", node.name()));
        } else {
            out.push_str(&format!(
                "{indent}{}{suffix} [{}]\n",
                node.name(),
                extra.join(", ")
            ));
        }
    });
    out
}

/// Ask the user a yes/no question. Anything other than `y`/`yes` is a no.
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirdraft_core::node::{Node, NodeKind};

    #[test]
    fn test_render_tree_marks_folders_and_tags() {
        let mut template = Template::new("proj").unwrap();
        let src = template
            .add_node(
                template.root(),
                Node::new("src", "", NodeKind::Folder).unwrap(),
            )
            .unwrap();
        template
            .add_node(
                src,
                Node::new("main.rs", "", NodeKind::File)
                    .unwrap()
                    .with_tags(["entrypoint"]),
            )
            .unwrap();

        let rendered = render_tree(&template);
        assert_eq!(rendered, "proj/\n  src/\n    main.rs [entrypoint]\n");
    }
}
