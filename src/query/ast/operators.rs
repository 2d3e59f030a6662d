use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,

    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    And,
    Or,
    ExclusiveOr,
    LeftShift,
    RightShift,

    AndAlso,
    OrElse,
}

impl BinaryOp {
    /// SQL token, padded with the surrounding spaces.
    pub fn token(&self) -> &'static str {
        match self {
            BinaryOp::Equal => " = ",
            BinaryOp::NotEqual => " != ",
            BinaryOp::GreaterThan => " > ",
            BinaryOp::GreaterThanOrEqual => " >= ",
            BinaryOp::LessThan => " < ",
            BinaryOp::LessThanOrEqual => " <= ",

            BinaryOp::Add => " + ",
            BinaryOp::Subtract => " - ",
            BinaryOp::Multiply => " * ",
            BinaryOp::Divide => " / ",
            BinaryOp::Modulo => " % ",

            BinaryOp::And => " & ",
            BinaryOp::Or => " | ",
            BinaryOp::ExclusiveOr => " # ",
            BinaryOp::LeftShift => " << ",
            BinaryOp::RightShift => " >> ",

            BinaryOp::AndAlso => " AND ",
            BinaryOp::OrElse => " OR ",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::AndAlso | BinaryOp::OrElse)
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::ExclusiveOr | BinaryOp::LeftShift | BinaryOp::RightShift)
    }

    /// PostgreSQL binding strength, higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::OrElse => 1,
            BinaryOp::AndAlso => 2,
            op if op.is_comparison() => 4,
            // `&`, `|`, `#`, `<<`, `>>` (and `||`) share the "any other operator" level
            op if op.is_bitwise() => 5,
            BinaryOp::Add | BinaryOp::Subtract => 6,
            _ => 7,
        }
    }

    /// Whether `a op (b op c)` may be written without parentheses.
    pub fn is_associative(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Multiply | BinaryOp::And | BinaryOp::Or | BinaryOp::ExclusiveOr | BinaryOp::AndAlso | BinaryOp::OrElse
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().trim())
    }
}

impl fmt::Debug for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryOp({})", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    /// Type conversion inserted by the query-building layer
    Convert,
    /// Reference cast (`x as T`)
    TypeAs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_binds_looser_than_comparison_and_arithmetic() {
        assert!(BinaryOp::OrElse.precedence() < BinaryOp::AndAlso.precedence());
        assert!(BinaryOp::AndAlso.precedence() < BinaryOp::Equal.precedence());
        assert!(BinaryOp::Equal.precedence() < BinaryOp::And.precedence());
        assert!(BinaryOp::Add.precedence() < BinaryOp::Multiply.precedence());
        assert_eq!(BinaryOp::Modulo.precedence(), BinaryOp::Divide.precedence());
    }

    #[test]
    fn display_trims_tokens() {
        assert_eq!(BinaryOp::AndAlso.to_string(), "AND");
        assert_eq!(BinaryOp::ExclusiveOr.to_string(), "#");
        assert_eq!(format!("{:?}", BinaryOp::NotEqual), "BinaryOp(!=)");
    }
}
