//! Tree rendering for expression explain output.

use std::fmt;

use crate::truncate_label;

/// A node that can be rendered as part of a display tree.
pub trait TreeNode {
    /// Label printed for this node.
    fn label(&self) -> String;

    /// Child nodes, in display order.
    fn children(&self) -> Vec<&dyn TreeNode>;

    /// Additional details printed in parentheses after the label.
    fn details(&self) -> Option<String> {
        None
    }
}

/// Renders a [`TreeNode`] with box-drawing connectors.
pub struct DisplayTree<'a> {
    root: &'a dyn TreeNode,
    max_label: Option<usize>,
}

impl<'a> DisplayTree<'a> {
    /// Create a new display tree.
    pub fn new(root: &'a dyn TreeNode) -> Self {
        Self {
            root,
            max_label: None,
        }
    }

    /// Truncate labels longer than `max_chars`.
    #[must_use]
    pub fn with_max_label(mut self, max_chars: usize) -> Self {
        self.max_label = Some(max_chars);
        self
    }

    fn line(&self, node: &dyn TreeNode) -> String {
        let mut line = node.label();
        if let Some(details) = node.details() {
            line = format!("{line} ({details})");
        }
        match self.max_label {
            Some(max) => truncate_label(&line, max),
            None => line,
        }
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &dyn TreeNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└─ " } else { "├─ " };
        writeln!(f, "{prefix}{connector}{}", self.line(node))?;

        let children = node.children();
        let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
        for (i, child) in children.iter().enumerate() {
            self.fmt_node(f, *child, &child_prefix, i + 1 == children.len())?;
        }

        Ok(())
    }
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.line(self.root))?;

        let children = self.root.children();
        for (i, child) in children.iter().enumerate() {
            self.fmt_node(f, *child, "", i + 1 == children.len())?;
        }

        Ok(())
    }
}
