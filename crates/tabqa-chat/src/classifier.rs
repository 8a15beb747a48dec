//! Question classifier: one completion call deciding simple vs complex.
//!
//! The decision is total: the model's free-text reply is scanned for the
//! canonical "complex" keywords in the two supported response languages,
//! and anything else — including an ambiguous reply — defaults to
//! [`Classification::Simple`], the cheaper path. A failed completion call
//! propagates as a provider error; there is no local fallback.

use tabqa_core::{Classification, Result};
use tabqa_llm::CompletionProvider;

const CLASSIFY_PROMPT: &str = "\
You are a query router for a knowledge-base assistant. Classify the user's \
question into exactly one category and reply with a single word.

SIMPLE: the answer can be looked up directly in document text.
Examples: \"What does the contract say about delivery?\", \
\"Who is the supplier for glass reactors?\", \"总结一下这份文档\".

COMPLEX: the answer requires counting, aggregation, filtering, sorting, or \
any calculation over tabular data.
Examples: \"How many rows are there?\", \"What is the average price?\", \
\"列出数量大于10的产品\", \"Which product has the highest total?\".

Reply with exactly one word: SIMPLE or COMPLEX.

Question: ";

/// Classify a question. Never returns an "undefined" category.
pub fn classify(provider: &dyn CompletionProvider, question: &str) -> Result<Classification> {
    let reply = provider.complete(&format!("{CLASSIFY_PROMPT}{question}"))?;
    Ok(parse_reply(&reply))
}

fn parse_reply(reply: &str) -> Classification {
    if reply.to_uppercase().contains("COMPLEX") || reply.contains("复杂") {
        Classification::Complex
    } else {
        Classification::Simple
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabqa_core::TabqaError;
    use tabqa_llm::ScriptedProvider;

    #[test]
    fn complex_keyword_in_either_language_routes_complex() {
        assert_eq!(parse_reply("COMPLEX"), Classification::Complex);
        assert_eq!(parse_reply("complex — needs aggregation"), Classification::Complex);
        assert_eq!(parse_reply("这是复杂查询"), Classification::Complex);
    }

    #[test]
    fn anything_else_defaults_to_simple() {
        assert_eq!(parse_reply("SIMPLE"), Classification::Simple);
        assert_eq!(parse_reply("I am not sure"), Classification::Simple);
        assert_eq!(parse_reply(""), Classification::Simple);
    }

    #[test]
    fn classify_sends_question_in_prompt() {
        let provider = ScriptedProvider::new(["SIMPLE"]);
        let decision = classify(&provider, "what is the delivery date?").unwrap();
        assert_eq!(decision, Classification::Simple);
        assert!(provider.prompts()[0].contains("what is the delivery date?"));
    }

    #[test]
    fn provider_failure_propagates() {
        let provider = ScriptedProvider::new(Vec::<String>::new());
        let err = classify(&provider, "q").unwrap_err();
        assert!(matches!(err, TabqaError::Provider(_)));
    }
}
