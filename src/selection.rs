use crate::data::SurveyTable;
use thiserror::Error;

/// Rejected column-role choices, worded for the operator
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please select different columns for age, question, and answer.")]
    Duplicate,
    #[error("Please select columns for age, question, and answer.")]
    Unselected,
    #[error("Column '{0}' not found")]
    Missing(String),
}

/// The three column roles the chart pipeline needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub age_group: String,
    pub question: String,
    pub answer: String,
}

impl ColumnRoles {
    pub fn new(
        age_group: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            age_group: age_group.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Check the roles before the pipeline runs: distinct first, then
    /// selected, then present in the table.
    pub fn validate(&self, table: &SurveyTable) -> Result<(), SelectionError> {
        if self.age_group == self.question
            || self.age_group == self.answer
            || self.question == self.answer
        {
            return Err(SelectionError::Duplicate);
        }

        if self.as_array().iter().any(|c| c.is_empty()) {
            return Err(SelectionError::Unselected);
        }

        for col in self.as_array() {
            if !table.has_column(col) {
                return Err(SelectionError::Missing(col.to_string()));
            }
        }

        Ok(())
    }

    fn as_array(&self) -> [&str; 3] {
        [&self.age_group, &self.question, &self.answer]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SurveyTable {
        SurveyTable::from_strs(&["age", "q", "a"], &[])
    }

    #[test]
    fn test_valid_roles() {
        assert_eq!(ColumnRoles::new("age", "q", "a").validate(&table()), Ok(()));
    }

    #[test]
    fn test_duplicate_roles() {
        let err = ColumnRoles::new("age", "age", "a").validate(&table()).unwrap_err();
        assert_eq!(err, SelectionError::Duplicate);
        assert_eq!(
            err.to_string(),
            "Please select different columns for age, question, and answer."
        );
    }

    #[test]
    fn test_duplicate_checked_before_unselected() {
        let err = ColumnRoles::new("", "", "a").validate(&table()).unwrap_err();
        assert_eq!(err, SelectionError::Duplicate);
    }

    #[test]
    fn test_unselected_role() {
        let err = ColumnRoles::new("age", "", "a").validate(&table()).unwrap_err();
        assert_eq!(err, SelectionError::Unselected);
    }

    #[test]
    fn test_missing_column() {
        let err = ColumnRoles::new("age", "q", "answer").validate(&table()).unwrap_err();
        assert_eq!(err, SelectionError::Missing("answer".to_string()));
    }
}
