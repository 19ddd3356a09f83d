//! Collation tokenizer.
//!
//! A collation file is a flat stream of whitespace-separated words; all
//! structure comes from the first character of each word. The scanner
//! tracks the line each word starts on and can be restarted from the top
//! of the source, which the variant listing writer uses to re-walk the
//! file once reduction has settled the unit weights.

use logos::Logos;

/// Raw lexical classes. Newlines survive as tokens so the scanner can
/// report the line a word started on.
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\r\x0b\x0c]+")]
pub enum RawToken {
    #[token("\n")]
    Newline,

    #[regex(r"[^ \t\r\n\x0b\x0c]+")]
    Word,
}

/// A word together with the line it started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub line: u32,
}

impl<'a> Word<'a> {
    /// Leading character, the command dispatch key.
    pub fn head(&self) -> char {
        self.text.chars().next().unwrap_or('\0')
    }

    /// Character after the dispatch key, carrying command modifiers.
    pub fn modifier(&self) -> Option<char> {
        self.text.chars().nth(1)
    }
}

/// Restartable word scanner over a collation source.
pub struct Scanner<'a> {
    lexer: logos::Lexer<'a, RawToken>,
    line: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            lexer: RawToken::lexer(source),
            line: 1,
        }
    }

    /// Line number of the most recently returned word.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Next word, or `None` at end of input.
    pub fn next_word(&mut self) -> Option<Word<'a>> {
        while let Some(result) = self.lexer.next() {
            match result {
                Ok(RawToken::Newline) => self.line += 1,
                Ok(RawToken::Word) => {
                    return Some(Word {
                        text: self.lexer.slice(),
                        line: self.line,
                    });
                }
                Err(_) => {}
            }
        }
        None
    }

    /// Discard words until one begins with `terminator`. Returns that
    /// word, or `None` if the input ran out first.
    pub fn eat_until(&mut self, terminator: char) -> Option<Word<'a>> {
        while let Some(word) = self.next_word() {
            if word.head() == terminator {
                return Some(word);
            }
        }
        None
    }
}
