/// Word-count bounds an exchange must satisfy, per side, to enter the
/// corpus. Overlong exchanges destabilize training on such a small model.
pub const MIN_WORDS: usize = 1;
pub const MAX_WORDS: usize = 6;

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The sole gate controlling what enters the training data: both sides
/// must independently hold 1..=6 whitespace-delimited words and the reply
/// must be non-blank.
pub fn accepts(utterance: &str, reply: &str) -> bool {
    let user_words = word_count(utterance);
    let reply_words = word_count(reply);
    (MIN_WORDS..=MAX_WORDS).contains(&user_words)
        && (MIN_WORDS..=MAX_WORDS).contains(&reply_words)
        && !reply.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_pair_accepted() {
        assert!(accepts("hola", "hola como estas"));
    }

    #[test]
    fn test_overlong_reply_rejected() {
        assert!(!accepts(
            "hola",
            "una respuesta demasiado larga con muchas palabras aqui"
        ));
    }

    #[test]
    fn test_overlong_utterance_rejected() {
        assert!(!accepts(
            "esta es una frase con demasiadas palabras dentro",
            "bien"
        ));
    }

    #[test]
    fn test_blank_sides_rejected() {
        assert!(!accepts("", "bien"));
        assert!(!accepts("hola", ""));
        assert!(!accepts("hola", "   "));
    }

    #[test]
    fn test_six_word_boundary() {
        assert!(accepts("uno dos tres cuatro cinco seis", "bien"));
        assert!(!accepts("uno dos tres cuatro cinco seis siete", "bien"));
    }
}
