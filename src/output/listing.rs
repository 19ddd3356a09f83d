//! The variant listing.
//!
//! A second pass over the collation source, keeping only position
//! markers, lemmata, and numbered readings. Every unit line starts
//! with the matrix column its last repeat lands in, so a reading can
//! be looked up straight from the state matrix; units that lost their
//! weight show `----` instead.

use std::fmt::Write;

use crate::lexer::Scanner;
use crate::model::Collation;

pub fn render(source: &str, coll: &Collation) -> String {
    let mut out = String::new();
    let mut scanner = Scanner::new(source);
    let mut var = 0usize;
    let mut columns = 0u32;
    let mut in_piece = false;
    let mut lemma = false;
    let mut lemma_open = false;
    let mut readings = 0u32;
    while let Some(word) = scanner.next_word() {
        match word.head() {
            '!' => break,
            '@' => {
                if let Some(marker) = scanner.next_word() {
                    let _ = write!(out, "\n@ {}\n", marker.text);
                }
            }
            '[' => {
                in_piece = true;
                lemma = true;
                lemma_open = false;
            }
            '|' if in_piece => {
                lemma = false;
                readings = 0;
                let weight = coll.weights[var];
                var += 1;
                if weight == 0 {
                    out.push_str("\n----  ");
                } else {
                    columns += weight;
                    let _ = write!(out, "\n{:>4}  ", columns - 1);
                }
            }
            ']' => {
                in_piece = false;
                lemma = false;
                out.push('\n');
            }
            '<' => {
                let _ = scanner.eat_until('>');
            }
            '"' => {
                let _ = scanner.eat_until('"');
            }
            '*' | '=' | '-' | '+' | '#' | '(' | ')' => {
                let _ = scanner.eat_until(';');
            }
            _ => {
                if lemma {
                    // The lemma line appears only once there is a lemma.
                    if !lemma_open {
                        out.push_str("\n>    ");
                        lemma_open = true;
                    }
                    let _ = write!(out, " {}", word.text);
                } else if in_piece {
                    readings += 1;
                    let sep = if readings > 1 { " " } else { "" };
                    let _ = write!(out, "{sep}{readings}={}", word.text);
                }
            }
        }
    }
    out
}
