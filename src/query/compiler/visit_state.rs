/// Mode flags of one step of the expression walk. Passed by value, so a
/// flag set for a subtree is gone once the walk returns from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisitState {
    /// The node is the root of a member access; sources render only their table.
    pub triggered_by_member_visit: bool,
    /// The node sits inside a `CASE` arm.
    pub inside_conditional: bool,
    /// Members get an `AS "<name>"` alias (projection lists).
    pub renaming_columns: bool,
}

impl VisitState {
    pub fn for_member_root(self) -> Self {
        Self { triggered_by_member_visit: true, renaming_columns: false, ..self }
    }

    pub fn in_conditional(self) -> Self {
        Self { inside_conditional: true, renaming_columns: false, triggered_by_member_visit: false }
    }

    pub fn renaming(self) -> Self {
        Self { renaming_columns: true, ..self }
    }

    /// State for an operand: every flag but `inside_conditional` is cleared.
    pub fn operand(self) -> Self {
        Self { inside_conditional: self.inside_conditional, ..Default::default() }
    }
}
