//! Answer synthesizer: formatted query results → natural language.
//!
//! One completion call; its output is the complex path's final answer
//! verbatim, with no further post-processing.

use tabqa_core::Result;
use tabqa_llm::CompletionProvider;

pub fn synthesize(
    provider: &dyn CompletionProvider,
    question: &str,
    statement: &str,
    formatted_result: &str,
) -> Result<String> {
    let prompt = format!(
        "A user asked a question about tabular data. The question was \
         answered by running a SQL statement; explain the result in natural \
         language, directly and concisely, in the user's language.\n\n\
         Question: {question}\n\
         Statement: {statement}\n\
         Result:\n{formatted_result}\n\n\
         Answer:"
    );
    provider.complete(&prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabqa_llm::ScriptedProvider;

    #[test]
    fn prompt_carries_question_statement_and_result() {
        let provider = ScriptedProvider::new(["There are 2 rows."]);
        let answer = synthesize(
            &provider,
            "how many rows are there",
            "SELECT COUNT(*) AS count FROM table_f1",
            "Result: 2",
        )
        .unwrap();
        assert_eq!(answer, "There are 2 rows.");

        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("how many rows are there"));
        assert!(prompt.contains("SELECT COUNT(*) AS count FROM table_f1"));
        assert!(prompt.contains("Result: 2"));
    }
}
