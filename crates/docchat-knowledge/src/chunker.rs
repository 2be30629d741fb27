//! Word-bounded document chunking.

use docchat_core::error::{DocChatError, Result};

/// Split `text` into chunks of at most `max_words` whitespace-separated
/// words, preserving word order. The final chunk may be shorter; no chunk
/// is ever empty. Empty or whitespace-only input yields no chunks.
///
/// Purely word-count bounded — no sentence or token awareness.
pub fn chunk_words(text: &str, max_words: usize) -> Result<Vec<String>> {
    if max_words == 0 {
        return Err(DocChatError::Config(
            "chunk word limit must be at least 1".into(),
        ));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let chunks = words
        .chunks(max_words)
        .map(|window| window.join(" "))
        .collect();
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_words("", 30).unwrap().is_empty());
        assert!(chunk_words("   \n\t  ", 30).unwrap().is_empty());
    }

    #[test]
    fn zero_limit_is_a_config_error() {
        assert!(matches!(
            chunk_words("a b c", 0),
            Err(DocChatError::Config(_))
        ));
    }

    #[test]
    fn words_survive_chunking_in_order() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let chunks = chunk_words(text, 5).unwrap();

        let rejoined: Vec<&str> = chunks
            .iter()
            .flat_map(|c| c.split_whitespace())
            .collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn only_the_last_chunk_may_be_short() {
        let text = (0..47).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = chunk_words(&text, 10).unwrap();
        assert_eq!(chunks.len(), 5);
        for chunk in &chunks[..4] {
            assert_eq!(chunk.split_whitespace().count(), 10);
        }
        assert_eq!(chunks[4].split_whitespace().count(), 7);
    }

    #[test]
    fn exact_multiple_has_no_partial_chunk() {
        let text = (0..90).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = chunk_words(&text, 30).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.split_whitespace().count() == 30));
    }

    #[test]
    fn runs_of_whitespace_collapse() {
        let chunks = chunk_words("alpha   beta\n\ngamma", 2).unwrap();
        assert_eq!(chunks, vec!["alpha beta", "gamma"]);
    }
}
