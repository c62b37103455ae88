//! Change-set diff rows.
use crate::api::ResourceChange;
use std::fmt;

/// How a planned change is shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayAction {
    Add,
    Modify,
    /// Replacement depends on values only known at execution time.
    MaybeReplace,
    Replace,
    Delete,
    /// Action/replacement pair with no display mapping, shown verbatim.
    Unmapped(String),
}

impl DisplayAction {
    pub fn of(change: &ResourceChange) -> Self {
        match change.action.as_str() {
            "Add" => Self::Add,
            "Delete" => Self::Delete,
            "Modify" => match change.replacement.as_deref() {
                Some("True" | "Always") => Self::Replace,
                Some("False" | "Never") => Self::Modify,
                Some("Conditional") => Self::MaybeReplace,
                other => Self::Unmapped(format!("Modify/{}", other.unwrap_or_default())),
            },
            other => Self::Unmapped(other.to_string()),
        }
    }

    /// Position in the diff; unmapped actions sort last.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Add => 0,
            Self::Modify => 1,
            Self::MaybeReplace => 2,
            Self::Replace => 3,
            Self::Delete => 4,
            Self::Unmapped(_) => 5,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Add => "Add",
            Self::Modify => "Modify",
            Self::MaybeReplace => "Replace?",
            Self::Replace => "Replace!",
            Self::Delete => "Delete",
            Self::Unmapped(raw) => raw,
        }
    }
}

impl fmt::Display for DisplayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Changes in display order: by action rank, then logical resource id.
pub fn sorted_changes(changes: &[ResourceChange]) -> Vec<(DisplayAction, &ResourceChange)> {
    let mut rows: Vec<_> = changes
        .iter()
        .map(|change| (DisplayAction::of(change), change))
        .collect();
    rows.sort_by(|(left, l), (right, r)| {
        left.rank()
            .cmp(&right.rank())
            .then_with(|| l.logical_resource_id.cmp(&r.logical_resource_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(id: &str, action: &str, replacement: Option<&str>) -> ResourceChange {
        ResourceChange {
            logical_resource_id: id.to_string(),
            resource_type: "AWS::SQS::Queue".to_string(),
            action: action.to_string(),
            replacement: replacement.map(str::to_string),
            scope: vec!["Properties".to_string()],
        }
    }

    #[test]
    fn modify_maps_by_replacement() {
        let label =
            |replacement| DisplayAction::of(&change("q", "Modify", replacement)).to_string();
        assert_eq!(label(Some("True")), "Replace!");
        assert_eq!(label(Some("Always")), "Replace!");
        assert_eq!(label(Some("False")), "Modify");
        assert_eq!(label(Some("Never")), "Modify");
        assert_eq!(label(Some("Conditional")), "Replace?");
        assert_eq!(label(Some("Sometimes")), "Modify/Sometimes");
        assert_eq!(label(None), "Modify/");
    }

    #[test]
    fn other_actions_pass_through() {
        assert_eq!(DisplayAction::of(&change("q", "Add", None)), DisplayAction::Add);
        assert_eq!(DisplayAction::of(&change("q", "Delete", None)), DisplayAction::Delete);
        assert_eq!(
            DisplayAction::of(&change("q", "Import", None)),
            DisplayAction::Unmapped("Import".to_string())
        );
    }

    #[test]
    fn rows_sort_by_rank_then_resource_id() {
        let changes = vec![
            change("zeta", "Delete", None),
            change("beta", "Modify", Some("True")),
            change("alpha", "Modify", Some("Conditional")),
            change("delta", "Import", None),
            change("gamma", "Modify", Some("False")),
            change("omega", "Add", None),
            change("alpha2", "Add", None),
        ];
        let order: Vec<(String, &str)> = sorted_changes(&changes)
            .into_iter()
            .map(|(action, change)| (action.to_string(), change.logical_resource_id.as_str()))
            .collect();
        assert_eq!(
            order,
            [
                ("Add".to_string(), "alpha2"),
                ("Add".to_string(), "omega"),
                ("Modify".to_string(), "gamma"),
                ("Replace?".to_string(), "alpha"),
                ("Replace!".to_string(), "beta"),
                ("Delete".to_string(), "zeta"),
                ("Import".to_string(), "delta"),
            ]
        );
    }
}
