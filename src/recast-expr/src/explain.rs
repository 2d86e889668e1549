//! Explain rendering for expression trees.

use common_display::{DisplayTree, TreeNode};

use crate::expr::Expr;

impl TreeNode for Expr {
    fn label(&self) -> String {
        match self {
            Self::Constant(v) => format!("Constant {v}"),
            Self::Parameter(p) => format!("Parameter {}", p.name()),
            Self::Member { member, .. } => format!("Member .{member}"),
            Self::Binary { op, .. } => format!("Binary {op}"),
            Self::Unary { op, .. } => format!("Unary {op}"),
            Self::Call(call) => format!("Call {}", call.method()),
            Self::Lambda(lambda) => {
                let names = lambda
                    .params()
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Lambda ({names})")
            }
            Self::Source(source) => format!("Source {}", source.name()),
        }
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        Expr::children(self)
            .into_iter()
            .map(|child| child as &dyn TreeNode)
            .collect()
    }

    fn details(&self) -> Option<String> {
        self.data_type().ok().map(|t| t.to_string())
    }
}

impl Expr {
    /// Render this tree as an indented explain listing.
    pub fn explain(&self) -> String {
        DisplayTree::new(self).to_string()
    }

    /// Render with labels cut to `max_chars`.
    pub fn explain_truncated(&self, max_chars: usize) -> String {
        DisplayTree::new(self).with_max_label(max_chars).to_string()
    }
}

#[cfg(test)]
mod tests {
    use recast_core::{DataType, Field, RecordType};

    use crate::{Expr, Method, lit, param};

    #[test]
    fn test_explain_where() {
        let thing = DataType::Record(RecordType::new(
            "Thing",
            vec![Field::new("name", DataType::String)],
        ));
        let item = param("item", thing.clone());
        let predicate = Expr::lambda(
            vec![item.as_parameter().unwrap().clone()],
            item.member("name").unwrap().eq(lit("x")),
        );
        let query = Expr::call(
            Method::Where,
            vec![Expr::source("things", thing), predicate],
        )
        .unwrap();

        let explained = query.explain();
        let lines: Vec<&str> = explained.lines().collect();
        assert_eq!(lines[0], "Call Where (Sequence<Thing>)");
        assert_eq!(lines[1], "├─ Source things (Sequence<Thing>)");
        assert_eq!(lines[2], "└─ Lambda (item) (Fn(Thing) -> Bool)");
        assert_eq!(lines[3], "   └─ Binary == (Bool)");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_explain_truncated() {
        let expr = lit("a very long string constant");
        let explained = expr.explain_truncated(12);
        assert_eq!(explained.trim_end(), "Constant ...");
    }
}
