// Input gate in front of the models
use crate::types::{word_count, ValidationWarning};

pub const DEFAULT_MIN_WORDS: usize = 50;

/// `Ok(words)` when the text may go to the models, otherwise the warning to show.
pub fn validate(text: &str, min_words: usize) -> Result<usize, ValidationWarning> {
    if text.trim().is_empty() {
        return Err(ValidationWarning::Empty);
    }
    let words = word_count(text);
    if words < min_words {
        return Err(ValidationWarning::TooShort { words, required: min_words });
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn words(n: usize) -> String {
        vec!["lorem"; n].join(" ")
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t  \r\n")]
    fn blank_input_is_empty(#[case] text: &str) {
        assert_eq!(validate(text, DEFAULT_MIN_WORDS), Err(ValidationWarning::Empty));
    }

    #[test]
    fn forty_nine_words_is_too_short() {
        assert_eq!(
            validate(&words(49), DEFAULT_MIN_WORDS),
            Err(ValidationWarning::TooShort { words: 49, required: 50 })
        );
    }

    #[test]
    fn fifty_words_passes() {
        assert_eq!(validate(&words(50), DEFAULT_MIN_WORDS), Ok(50));
    }

    #[test]
    fn any_whitespace_separates_words() {
        let text = words(25) + "\n\n" + &words(25).replace(' ', "\t");
        assert_eq!(validate(&text, DEFAULT_MIN_WORDS), Ok(50));
    }
}
