use std::fmt;

use crate::query::filters::PgSqlCommand;

/// Row count for a `LIMIT` clause. Zero stands for no limit and renders `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitClauseNumber {
    pub number: u64,
}

impl LimitClauseNumber {
    pub fn new(number: u64) -> Self {
        Self { number }
    }

    pub fn get_sql_command(&self) -> PgSqlCommand {
        PgSqlCommand::new(&self.to_string())
    }
}

impl fmt::Display for LimitClauseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            0 => f.write_str("ALL"),
            n => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_means_all() {
        assert_eq!(LimitClauseNumber::new(0).get_sql_command().command, "ALL");
        assert_eq!(LimitClauseNumber::new(25).get_sql_command().command, "25");
        assert!(LimitClauseNumber::new(25).get_sql_command().parameters.is_empty());
    }
}
