//! Quiz questions. Only a fixed in-process list exists until the service
//! grows a questions endpoint.

use crate::types::Question;

/// Source of the ordered question list for a quiz.
pub trait QuestionSource {
    fn questions(&self) -> Vec<Question>;
}

/// Built-in question list.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockQuestionSource;

impl QuestionSource for MockQuestionSource {
    fn questions(&self) -> Vec<Question> {
        vec![
            Question::new(
                "q1",
                "jackets",
                "What kind of weather do you usually head out in?",
            ),
            Question::new("q2", "boots", "What terrain do you spend the most time on?"),
            Question::new("q3", "backpacks", "How long are your typical trips?"),
            Question::new("q4", "accessories", "What would round off your kit?"),
        ]
    }
}

/// Questions from the built-in list.
pub fn fetch_questions() -> Vec<Question> {
    MockQuestionSource.questions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn questions_are_stable_and_ordered() {
        let first = fetch_questions();
        let second = fetch_questions();
        assert_eq!(first, second);
        assert_eq!(first[0].category, "jackets");
    }

    #[test]
    fn question_ids_are_unique() {
        let questions = fetch_questions();
        let ids: HashSet<_> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), questions.len());
    }
}
