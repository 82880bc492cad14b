/// Wrap a question in the framing sent to the gateway.
///
/// A topic asks for a beginner-friendly explanation from an expert in that
/// topic; without one the question goes to a generalist.
pub fn build_prompt(question: &str, topic: Option<&str>) -> String {
    match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => format!(
            "Acting as a friendly and approachable expert in {}, please explain the following question: \"{}\" in a way that is easy for someone new to the topic to understand.",
            topic, question
        ),
        None => format!(
            "As an expert with knowledge on all topics, answer the following question: {} in a clean, well-detailed, and concise format.",
            question
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_framing() {
        let prompt = build_prompt("What is ownership?", Some("Rust"));
        assert!(prompt.contains("expert in Rust"));
        assert!(prompt.contains("\"What is ownership?\""));
    }

    #[test]
    fn test_generic_framing() {
        let prompt = build_prompt("Why is the sky blue?", None);
        assert!(prompt.contains("knowledge on all topics"));
        assert!(prompt.contains("Why is the sky blue?"));
    }

    #[test]
    fn test_blank_topic_is_generic() {
        assert_eq!(build_prompt("q", Some("  ")), build_prompt("q", None));
    }
}
