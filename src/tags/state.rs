//! States and transitions of the tag parser.
//!
//! For `` `validate:"required,oneof=red green blue" json:"name"` ``:
//! - `Begin` sits between tag pairs (right after the opening backquote, or after a closing quote)
//! - `TagKey` accumulates `validate` / `json`
//! - `TagSeparator` is the colon after the key
//! - `TagValue` is inside the quotes of a skipped tag, or just inside the quotes of `validate`
//! - `PairKey` accumulates a directive name (`required`, `oneof`)
//! - `PairKeyValueSeparator` is the `=` after a directive name
//! - `PairValue` accumulates a directive argument (`red green blue`)
//! - `PairSeparator` is the `,` between directives
//! - `End` is the closing backquote
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseState {
    Begin,
    TagKey,
    TagSeparator,
    TagValue,
    PairKey,
    PairKeyValueSeparator,
    PairValue,
    PairSeparator,
    End,
}

/// Characters the grammar gives meaning to; everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    RawQuote,
    Space,
    Colon,
    Quote,
    Comma,
    Equals,
    Other,
}

impl CharClass {
    pub fn of(c: char) -> Self {
        match c {
            '`' => CharClass::RawQuote,
            ' ' => CharClass::Space,
            ':' => CharClass::Colon,
            '"' => CharClass::Quote,
            ',' => CharClass::Comma,
            '=' => CharClass::Equals,
            _ => CharClass::Other,
        }
    }
}

/// What the parser does with the buffer when taking a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Character carries no data.
    Ignore,
    /// Append the character to the buffer.
    Push,
    /// Buffer holds a complete tag key; decides whether the tag is skipped.
    CloseTagKey,
    /// Buffer holds a complete directive name.
    CloseKey,
    /// Buffer holds a complete directive argument.
    CloseValue,
}

/// What the parser wanted to see when it rejected a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    OpeningRawQuote,
    ClosingRawQuote,
    TagKey,
    TagKeyWithoutSpace,
    Colon,
    QuotedValidateValue,
    QuoteAfterSeparator,
    ClosingQuote,
    DirectiveName,
    DirectiveNameWithoutSpace,
    DirectiveArgument,
    ArgumentWithoutEquals,
    NothingAfterEnd,
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseState::Begin => "begin",
            ParseState::TagKey => "tagKey",
            ParseState::TagSeparator => "tagSeparator",
            ParseState::TagValue => "tagValue",
            ParseState::PairKey => "pairKey",
            ParseState::PairKeyValueSeparator => "pairKeyValueSeparator",
            ParseState::PairValue => "pairValue",
            ParseState::PairSeparator => "pairSeparator",
            ParseState::End => "end",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Expected::OpeningRawQuote => "opening raw quote '`'",
            Expected::ClosingRawQuote => "closing raw quote '`'",
            Expected::TagKey => "a tag key",
            Expected::TagKeyWithoutSpace => "a tag key without spaces",
            Expected::Colon => "':' after the tag key",
            Expected::QuotedValidateValue => "'\"' opening the 'validate' value",
            Expected::QuoteAfterSeparator => "'\"' right after ':' (no space allowed)",
            Expected::ClosingQuote => "'\"' closing the tag value",
            Expected::DirectiveName => "a directive name",
            Expected::DirectiveNameWithoutSpace => "a directive name without spaces",
            Expected::DirectiveArgument => "a directive argument after '='",
            Expected::ArgumentWithoutEquals => "a directive argument without '='",
            Expected::NothingAfterEnd => "nothing after the closing raw quote",
        };
        f.write_str(text)
    }
}

/// The transition table.
///
/// `skip` is true while inside a tag whose key is not `validate`; only
/// `TagSeparator` and `TagValue` look at it.
pub fn transition(
    at: ParseState,
    class: CharClass,
    skip: bool,
) -> Result<(ParseState, Action), Expected> {
    use Action::*;
    use CharClass::*;
    use ParseState::*;

    match (at, class) {
        // between pairs
        (Begin, Space) => Ok((Begin, Ignore)),
        (Begin, RawQuote) => Ok((End, Ignore)),
        (Begin, Other) => Ok((TagKey, Push)),
        (Begin, _) => Err(Expected::TagKey),

        (TagKey, Other) => Ok((TagKey, Push)),
        (TagKey, Colon) => Ok((TagSeparator, CloseTagKey)),
        (TagKey, Space) => Err(Expected::TagKeyWithoutSpace),
        (TagKey, _) => Err(Expected::Colon),

        (TagSeparator, Quote) => Ok((TagValue, Ignore)),
        (TagSeparator, Space) => Err(Expected::QuoteAfterSeparator),
        (TagSeparator, _) if !skip => Err(Expected::QuotedValidateValue),
        // skipped tags tolerate a missing opening quote
        (TagSeparator, RawQuote) => Ok((End, Ignore)),
        (TagSeparator, _) => Ok((TagValue, Ignore)),

        (TagValue, RawQuote) => Err(Expected::ClosingQuote),
        (TagValue, Quote) => Ok((Begin, Ignore)),
        (TagValue, _) if skip => Ok((TagValue, Ignore)),
        (TagValue, Other | Colon) => Ok((PairKey, Push)),
        (TagValue, Space) => Err(Expected::DirectiveNameWithoutSpace),
        (TagValue, _) => Err(Expected::DirectiveName),

        (PairKey, Other | Colon) => Ok((PairKey, Push)),
        (PairKey, Equals) => Ok((PairKeyValueSeparator, CloseKey)),
        (PairKey, Comma) => Ok((PairSeparator, CloseKey)),
        (PairKey, Quote) => Ok((Begin, CloseKey)),
        (PairKey, Space) => Err(Expected::DirectiveNameWithoutSpace),
        (PairKey, RawQuote) => Err(Expected::ClosingQuote),

        (PairKeyValueSeparator, Other | Colon | Space) => Ok((PairValue, Push)),
        (PairKeyValueSeparator, RawQuote) => Err(Expected::ClosingQuote),
        (PairKeyValueSeparator, _) => Err(Expected::DirectiveArgument),

        (PairValue, Other | Colon | Space) => Ok((PairValue, Push)),
        (PairValue, Comma) => Ok((PairSeparator, CloseValue)),
        (PairValue, Quote) => Ok((Begin, CloseValue)),
        (PairValue, Equals) => Err(Expected::ArgumentWithoutEquals),
        (PairValue, RawQuote) => Err(Expected::ClosingQuote),

        (PairSeparator, Other | Colon) => Ok((PairKey, Push)),
        (PairSeparator, Space) => Err(Expected::DirectiveNameWithoutSpace),
        (PairSeparator, RawQuote) => Err(Expected::ClosingQuote),
        (PairSeparator, _) => Err(Expected::DirectiveName),

        (End, _) => Err(Expected::NothingAfterEnd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [ParseState; 9] = [
        ParseState::Begin,
        ParseState::TagKey,
        ParseState::TagSeparator,
        ParseState::TagValue,
        ParseState::PairKey,
        ParseState::PairKeyValueSeparator,
        ParseState::PairValue,
        ParseState::PairSeparator,
        ParseState::End,
    ];

    const CLASSES: [CharClass; 7] = [
        CharClass::RawQuote,
        CharClass::Space,
        CharClass::Colon,
        CharClass::Quote,
        CharClass::Comma,
        CharClass::Equals,
        CharClass::Other,
    ];

    #[test]
    fn equals_only_accepted_after_a_directive_name() {
        for at in STATES {
            for skip in [false, true] {
                let accepted = transition(at, CharClass::Equals, skip).is_ok();
                let expected = at == ParseState::PairKey || (at == ParseState::TagValue && skip)
                    || (at == ParseState::TagSeparator && skip);
                assert_eq!(accepted, expected, "state {at}, skip {skip}");
            }
        }
    }

    #[test]
    fn end_rejects_everything() {
        for class in CLASSES {
            assert_eq!(
                transition(ParseState::End, class, false),
                Err(Expected::NothingAfterEnd)
            );
        }
    }

    #[test]
    fn pair_states_never_depend_on_skip() {
        let pair_states = [
            ParseState::PairKey,
            ParseState::PairKeyValueSeparator,
            ParseState::PairValue,
            ParseState::PairSeparator,
        ];
        for at in pair_states {
            for class in CLASSES {
                assert_eq!(transition(at, class, false), transition(at, class, true));
            }
        }
    }

    #[test]
    fn space_after_separator_is_rejected_even_for_skipped_tags() {
        for skip in [false, true] {
            assert_eq!(
                transition(ParseState::TagSeparator, CharClass::Space, skip),
                Err(Expected::QuoteAfterSeparator)
            );
        }
    }
}
