//! Parameter-list tokenizer.
//!
//! One state machine (between parameters / quoted / unquoted) drives every
//! read-only query over a parameter list. The lexer yields a lazy stream of
//! [`Token`]s that already carry *decoded* text, so counting, measuring and
//! extracting are thin consumers that can never disagree about where a
//! parameter starts or ends.
//!
//! Decoding rules, applied per token:
//!
//! - bare parameters are copied verbatim, leading spaces skipped and trailing
//!   spaces kept;
//! - quoted parameters lose their surrounding quotes, and `\"` decodes to `"`
//!   at top level;
//! - inside an array, quotes and `\"` escapes are kept verbatim so that the
//!   array text can be parsed again as a parameter list of its own. Spaces
//!   between array elements are dropped.

use crate::error::{SyntaxError, SyntaxErrorKind};

/// Type of a parameter, judged by its first significant character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Empty parameter.
    #[default]
    Undefined,
    /// Quoted or bare parameter.
    String,
    /// Bracketed array parameter.
    Array,
}

/// Classification of a parameter-list token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// First significant character of a top-level parameter. `text` is the
    /// opening `"` or `[`, or empty for a bare parameter. Contributes nothing
    /// to the decoded value.
    Begin(ParamType),
    /// Decoded value text of the current parameter.
    Value,
    /// Top-level `,` closing the current parameter.
    Comma,
}

/// A token borrowing its text from the parameter list.
///
/// `text` is a slice of the input but not necessarily `&input[start..end]`:
/// for a top-level `\"` escape the span covers both bytes while `text` is
/// only the quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Decoded text contributed by this token.
    pub text: &'a str,
    /// 1-based index of the top-level parameter the token belongs to.
    pub index: usize,
    /// Byte offset of the first source character.
    pub start: usize,
    /// Byte offset one past the last source character.
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between parameters: skipping spaces, waiting for the first character.
    Init,
    Quoted,
    Unquoted,
}

/// Lazy tokenizer over a parameter list.
///
/// Yields `Err` at most once; the stream ends after an error.
#[derive(Debug, Clone)]
pub struct ParamLexer<'a> {
    input: &'a str,
    pos: usize,
    state: State,
    in_array: bool,
    index: usize,
    done: bool,
}

/// Tokenize a parameter list.
pub fn tokenize(input: &str) -> ParamLexer<'_> {
    ParamLexer::new(input)
}

impl<'a> ParamLexer<'a> {
    /// Create a lexer positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: State::Init,
            in_array: false,
            index: 1,
            done: false,
        }
    }

    fn token(&self, kind: TokKind, start: usize, end: usize) -> Token<'a> {
        self.token_with_text(kind, start, end, start, end)
    }

    fn token_with_text(
        &self,
        kind: TokKind,
        start: usize,
        end: usize,
        text_start: usize,
        text_end: usize,
    ) -> Token<'a> {
        Token {
            kind,
            text: &self.input[text_start..text_end],
            index: self.index,
            start,
            end,
        }
    }

    /// After a closing `"` or `]`: skip spaces, then require `,`, end of
    /// input, or `]` while still inside an array.
    fn expect_separator(&mut self) -> Result<(), SyntaxError> {
        let input = self.input;
        let b = input.as_bytes();
        while b.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }
        match b.get(self.pos) {
            None | Some(b',') => Ok(()),
            Some(b']') if self.in_array => Ok(()),
            Some(_) => Err(SyntaxError::new(
                self.pos,
                SyntaxErrorKind::UnexpectedCharacter,
            )),
        }
    }

    fn step(&mut self) -> Option<Result<Token<'a>, SyntaxError>> {
        let input = self.input;
        let b = input.as_bytes();
        while self.pos < b.len() {
            let start = self.pos;
            match self.state {
                State::Init => match b[start] {
                    b',' => {
                        self.pos += 1;
                        if self.in_array {
                            return Some(Ok(self.token(TokKind::Value, start, self.pos)));
                        }
                        let tok = self.token(TokKind::Comma, start, self.pos);
                        self.index += 1;
                        return Some(Ok(tok));
                    }
                    b'"' => {
                        self.pos += 1;
                        self.state = State::Quoted;
                        let kind = if self.in_array {
                            TokKind::Value
                        } else {
                            TokKind::Begin(ParamType::String)
                        };
                        return Some(Ok(self.token(kind, start, self.pos)));
                    }
                    b'[' => {
                        if self.in_array {
                            return Some(Err(SyntaxError::new(
                                start,
                                SyntaxErrorKind::NestedArray,
                            )));
                        }
                        self.pos += 1;
                        self.in_array = true;
                        let tok = self.token(TokKind::Begin(ParamType::Array), start, self.pos);
                        return Some(Ok(tok));
                    }
                    b']' => {
                        if !self.in_array {
                            return Some(Err(SyntaxError::new(
                                start,
                                SyntaxErrorKind::UnbalancedBracket,
                            )));
                        }
                        self.in_array = false;
                        self.pos += 1;
                        if let Err(e) = self.expect_separator() {
                            return Some(Err(e));
                        }
                    }
                    b' ' => self.pos += 1,
                    _ => {
                        self.state = State::Unquoted;
                        if !self.in_array {
                            let tok = self.token(TokKind::Begin(ParamType::String), start, start);
                            return Some(Ok(tok));
                        }
                    }
                },
                State::Unquoted => {
                    let mut end = start;
                    while end < b.len() {
                        match b[end] {
                            b',' => break,
                            b']' if self.in_array => break,
                            b']' => {
                                return Some(Err(SyntaxError::new(
                                    end,
                                    SyntaxErrorKind::UnbalancedBracket,
                                )));
                            }
                            _ => end += 1,
                        }
                    }
                    self.pos = end;
                    self.state = State::Init;
                    return Some(Ok(self.token(TokKind::Value, start, end)));
                }
                State::Quoted => {
                    if b[start] == b'"' {
                        self.pos += 1;
                        self.state = State::Init;
                        let tok = self.token(TokKind::Value, start, self.pos);
                        if let Err(e) = self.expect_separator() {
                            return Some(Err(e));
                        }
                        if self.in_array {
                            return Some(Ok(tok));
                        }
                        continue;
                    }
                    if b[start] == b'\\' && b.get(start + 1) == Some(&b'"') {
                        self.pos += 2;
                        // Escapes inside an array are decoded by a later parse
                        // of the array's own text.
                        let text_start = if self.in_array { start } else { start + 1 };
                        let tok =
                            self.token_with_text(TokKind::Value, start, self.pos, text_start, self.pos);
                        return Some(Ok(tok));
                    }
                    let mut end = start + 1;
                    while end < b.len()
                        && b[end] != b'"'
                        && !(b[end] == b'\\' && b.get(end + 1) == Some(&b'"'))
                    {
                        end += 1;
                    }
                    self.pos = end;
                    return Some(Ok(self.token(TokKind::Value, start, end)));
                }
            }
        }

        if self.state == State::Quoted {
            return Some(Err(SyntaxError::new(
                self.pos,
                SyntaxErrorKind::UnterminatedQuote,
            )));
        }
        if self.in_array {
            return Some(Err(SyntaxError::new(
                self.pos,
                SyntaxErrorKind::UnterminatedArray,
            )));
        }
        None
    }
}

impl<'a> Iterator for ParamLexer<'a> {
    type Item = Result<Token<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.step();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl std::iter::FusedIterator for ParamLexer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> Vec<(usize, String)> {
        tokenize(input)
            .map(|t| t.unwrap())
            .filter(|t| t.kind == TokKind::Value)
            .map(|t| (t.index, t.text.to_string()))
            .collect()
    }

    fn error(input: &str) -> SyntaxError {
        tokenize(input)
            .find_map(Result::err)
            .unwrap_or_else(|| panic!("expected a syntax error for {input:?}"))
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(tokenize("").count(), 0);
        assert_eq!(tokenize("   ").count(), 0);
    }

    #[test]
    fn bare_parameters_keep_trailing_spaces() {
        assert_eq!(
            values(" a ,b"),
            vec![(1, "a ".to_string()), (2, "b".to_string())]
        );
    }

    #[test]
    fn begin_tokens_report_types() {
        let kinds: Vec<TokKind> = tokenize("a,\"b\",[c],")
            .map(|t| t.unwrap().kind)
            .filter(|k| matches!(k, TokKind::Begin(_)))
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokKind::Begin(ParamType::String),
                TokKind::Begin(ParamType::String),
                TokKind::Begin(ParamType::Array),
            ]
        );
    }

    #[test]
    fn top_level_escape_drops_backslash() {
        let toks: Vec<Token<'_>> = tokenize(r#""a\"b""#).map(|t| t.unwrap()).collect();
        let escape = toks.iter().find(|t| t.text == "\"" && t.kind == TokKind::Value);
        let escape = escape.unwrap();
        assert_eq!((escape.start, escape.end), (2, 4));
        assert_eq!(values(r#""a\"b""#), vec![
            (1, "a".to_string()),
            (1, "\"".to_string()),
            (1, "b".to_string())
        ]);
    }

    #[test]
    fn array_escape_is_kept_verbatim() {
        let text: String = values(r#"[ "a\"b" ]"#).into_iter().map(|(_, t)| t).collect();
        assert_eq!(text, r#""a\"b""#);
    }

    #[test]
    fn array_commas_stay_inside_one_parameter() {
        let vals = values("[1, 2],3");
        assert!(vals.iter().take(3).all(|(i, _)| *i == 1));
        assert_eq!(vals.last().unwrap(), &(2, "3".to_string()));
    }

    #[test]
    fn syntax_errors_carry_offsets() {
        assert_eq!(error("a,\"b").kind, SyntaxErrorKind::UnterminatedQuote);
        assert_eq!(error("a,[b").kind, SyntaxErrorKind::UnterminatedArray);
        assert_eq!(error("a]"), SyntaxError::new(1, SyntaxErrorKind::UnbalancedBracket));
        assert_eq!(error("a,[[b]]"), SyntaxError::new(3, SyntaxErrorKind::NestedArray));
        assert_eq!(
            error("\"a\" b"),
            SyntaxError::new(4, SyntaxErrorKind::UnexpectedCharacter)
        );
        assert_eq!(
            error("[a] ]"),
            SyntaxError::new(4, SyntaxErrorKind::UnexpectedCharacter)
        );
    }

    #[test]
    fn stream_ends_after_error() {
        let mut lexer = tokenize("]a,b");
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn multibyte_text_is_sliced_on_char_boundaries() {
        assert_eq!(
            values("ä,\"ö\""),
            vec![(1, "ä".to_string()), (2, "ö".to_string())]
        );
    }
}
