use std::ops::{Deref, DerefMut};
use tracing::trace;

use crate::query::compiler::QueryModelCompiler;

/// Clauses of one `SELECT` statement, already rendered.
///
/// `limit` and `offset` are the only values written inline as decimal
/// literals; every other value reaches the text as a parameter token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementFrame {
    pub distinct: bool,
    pub select: String,
    pub from: String,
    pub joins: Vec<String>,
    pub where_parts: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<String>,
    pub limit: Option<String>,
    pub offset: Option<u64>,
}

impl StatementFrame {
    pub fn render(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.select);
        sql.push_str(" FROM ");
        sql.push_str(&self.from);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        match self.where_parts.as_slice() {
            [] => {}
            [only] => {
                sql.push_str(" WHERE ");
                sql.push_str(only);
            }
            parts => {
                let joined = parts.iter().map(|p| format!("({})", p)).collect::<Vec<_>>().join(" AND ");
                sql.push_str(" WHERE ");
                sql.push_str(&joined);
            }
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(limit) = &self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(limit);
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }
}

/// Stack of statements being built. The bottom frame is the outer query,
/// each open sub-query adds one on top.
#[derive(Debug, Clone, Default)]
pub struct QueryParts {
    frames: Vec<StatementFrame>,
}

impl QueryParts {
    pub fn open(&mut self) -> usize {
        self.frames.push(StatementFrame::default());
        self.frames.len()
    }

    pub fn close(&mut self) -> Option<StatementFrame> {
        self.frames.pop()
    }

    pub fn current_mut(&mut self) -> Option<&mut StatementFrame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// An open statement scope on a [`QueryModelCompiler`]. The frame is popped
/// when the guard is finished or dropped, whichever comes first, so a failed
/// nested compilation never leaves it on the stack.
pub struct SubQueryScope<'c, 'a> {
    compiler: &'c mut QueryModelCompiler<'a>,
    depth: usize,
    closed: bool,
}

impl<'c, 'a> SubQueryScope<'c, 'a> {
    pub(crate) fn new(compiler: &'c mut QueryModelCompiler<'a>) -> Self {
        let depth = compiler.parts_mut().open();
        trace!(depth, "opened statement scope");
        Self { compiler, depth, closed: false }
    }

    /// Close the scope and render its statement.
    pub fn finish(mut self) -> String {
        self.closed = true;
        let frame = self.pop();
        frame.map(|f| f.render()).unwrap_or_default()
    }

    fn pop(&mut self) -> Option<StatementFrame> {
        let parts = self.compiler.parts_mut();
        let mut frame = None;
        while parts.depth() >= self.depth {
            frame = parts.close();
        }
        trace!(depth = self.depth, "closed statement scope");
        frame
    }
}

impl<'a> Deref for SubQueryScope<'_, 'a> {
    type Target = QueryModelCompiler<'a>;

    fn deref(&self) -> &Self::Target {
        self.compiler
    }
}

impl<'a> DerefMut for SubQueryScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.compiler
    }
}

impl Drop for SubQueryScope<'_, '_> {
    fn drop(&mut self) {
        if !self.closed {
            self.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_clauses_in_order() {
        let frame = StatementFrame {
            distinct: true,
            select: "\"t\".\"a\"".into(),
            from: "\"t\"".into(),
            joins: vec!["INNER JOIN \"u\" ON \"t\".\"id\" = \"u\".\"t_id\"".into()],
            where_parts: vec!["x".into(), "y".into()],
            group_by: vec!["\"t\".\"a\"".into()],
            order_by: vec!["\"t\".\"a\" DESC".into()],
            limit: Some("ALL".into()),
            offset: Some(5),
        };
        assert_eq!(
            frame.render(),
            "SELECT DISTINCT \"t\".\"a\" FROM \"t\" INNER JOIN \"u\" ON \"t\".\"id\" = \"u\".\"t_id\" \
             WHERE (x) AND (y) GROUP BY \"t\".\"a\" ORDER BY \"t\".\"a\" DESC LIMIT ALL OFFSET 5"
        );
    }

    #[test]
    fn single_where_part_is_not_parenthesized() {
        let frame = StatementFrame {
            select: "COUNT(*)".into(),
            from: "\"t\"".into(),
            where_parts: vec!["a = b".into()],
            ..Default::default()
        };
        assert_eq!(frame.render(), "SELECT COUNT(*) FROM \"t\" WHERE a = b");
    }

    #[test]
    fn frames_form_a_stack() {
        let mut parts = QueryParts::default();
        assert_eq!(parts.open(), 1);
        assert_eq!(parts.open(), 2);
        if let Some(frame) = parts.current_mut() {
            frame.select = "inner".into();
        }
        assert_eq!(parts.close().map(|f| f.select), Some("inner".to_string()));
        assert_eq!(parts.depth(), 1);
    }
}
