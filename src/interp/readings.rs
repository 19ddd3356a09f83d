//! Reading blocks and state assignment.
//!
//! `[ lemma | readings | readings ]` opens a piece with one unit per
//! `|`. The following `< states names >` blocks claim state sets for
//! witnesses, with explicit names outranking groups and later groups
//! outranking earlier ones.

use super::Interpreter;
use crate::errors::Result;
use crate::lexer::Word;
use crate::macros::Priority;
use crate::model::{Lookup, Piece, SetId, LACUNOSE, MISSING, UNASSIGNED};

impl<'a> Interpreter<'a> {
    /// `[ lemma... | readings... ]` — open a piece and size its units.
    pub(super) fn open_readings(&mut self) -> Result<()> {
        self.coll.lemma.clear();
        let piece = self.coll.pieces.len();
        self.coll.pieces.push(Piece {
            first_unit: self.coll.n_units(),
            units: 0,
        });
        let mut unit: Option<usize> = None;
        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof("["));
            };
            match word.head() {
                ']' => return Ok(()),
                '"' => {
                    if self.scanner.eat_until('"').is_none() {
                        return Err(self.eof("["));
                    }
                }
                '|' => {
                    let weight = self.parse_weight(&word);
                    self.coll.weights.push(weight);
                    self.coll.readings.push(0);
                    self.coll.weighted_units += weight;
                    self.coll.pieces[piece].units += 1;
                    unit = Some(self.coll.n_units() - 1);
                }
                _ => match unit {
                    None => {
                        if !self.coll.lemma.is_empty() {
                            self.coll.lemma.push(' ');
                        }
                        self.coll.lemma.push_str(word.text);
                    }
                    Some(var) => self.coll.readings[var] += 1,
                },
            }
        }
    }

    /// Weight of a unit from its `|` token. Bare `|` weighs one; `|*n`
    /// is a raw weight; `|n` grades an edit distance of n through the
    /// configured divisor. A unit weighted zero is collated but never
    /// reaches the matrix.
    fn parse_weight(&mut self, word: &Word) -> u32 {
        let text = word.text;
        if text == "|" {
            return 1;
        }
        if let Some(raw) = text.strip_prefix("|*") {
            return match raw.parse::<u32>() {
                Ok(n) => n,
                Err(_) => {
                    self.warn("[", "Bad weight:", text);
                    0
                }
            };
        }
        match text[1..].parse::<i64>() {
            Err(_) | Ok(0) => 0,
            Ok(distance) => {
                if self.config.ed_divisor == 0 {
                    1
                } else {
                    let divisor = i64::from(self.config.ed_divisor);
                    ((distance - 1) / divisor + 1).max(0) as u32
                }
            }
        }
    }

    /// `< states names... | states names... >` — claim state sets for
    /// the current piece in the active parallel.
    pub(super) fn assign_states(&mut self) -> Result<()> {
        if !self.coll.declared() {
            return Err(self.fatal("<", "No witnesses.", ""));
        }
        let Some(piece) = self.coll.pieces.len().checked_sub(1) else {
            return Err(self.fatal("<", "No reading block open.", ""));
        };
        let active = self.coll.active;
        let units = self.coll.pieces[piece].units;

        for t in &mut self.coll.parallels[active].testimony {
            for hand in &mut t.hands {
                hand.level = None;
            }
        }

        let mut expect_states = true;
        let mut set: Option<SetId> = None;
        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof("<"));
            };
            match word.head() {
                '>' => {
                    self.close_assignment(active, piece);
                    return Ok(());
                }
                '"' => {
                    if self.scanner.eat_until('"').is_none() {
                        return Err(self.eof("<"));
                    }
                }
                '|' => expect_states = true,
                '$' => match self.claimants(active, word.text) {
                    None => self.warn("<", "Unknown macro:", word.text),
                    Some(_) if set.is_none() => {
                        return Err(self.fatal("<", "States must precede names:", word.text));
                    }
                    Some((priority, members)) => {
                        let mut duplicates = 0;
                        for ms in members {
                            let hand = &mut self.coll.parallels[active].testimony[ms].hands[0];
                            if hand.suppressed {
                                continue;
                            }
                            match hand.level {
                                Some(level) if level > priority => {}
                                Some(level) if level == priority => duplicates += 1,
                                _ => {
                                    if !hand.in_lacuna {
                                        hand.set_cell(piece, set);
                                        hand.level = Some(priority);
                                    }
                                }
                            }
                        }
                        for _ in 0..duplicates {
                            self.warn("<", "Duplicate macro:", word.text);
                        }
                    }
                },
                _ if expect_states => {
                    expect_states = false;
                    let n = word.text.chars().count();
                    if n != units {
                        let detail =
                            format!("{} ({}) should have exactly {}", word.text, n, units);
                        return Err(self.fatal("<", "Variant mismatch:", detail));
                    }
                    let normalized: String = word
                        .text
                        .chars()
                        .map(|c| {
                            if c == LACUNOSE || c == UNASSIGNED {
                                MISSING
                            } else {
                                c
                            }
                        })
                        .collect();
                    set = Some(self.coll.sets.push(&normalized));
                }
                _ => match self.coll.resolve(word.text) {
                    Lookup::Unknown | Lookup::BadHand => {
                        if word.text.starts_with('<') {
                            return Err(self.fatal("<", "Unknown:", word.text));
                        }
                        self.warn("<", "Unknown:", word.text);
                    }
                    Lookup::Suppressed => {}
                    Lookup::Found { witness, hand } => {
                        let Some(set_id) = set else {
                            return Err(self.fatal("<", "States must precede names:", word.text));
                        };
                        let t = &self.coll.parallels[active].testimony[witness];
                        if t.hands[hand].in_lacuna {
                            self.warn("<", "In lacuna:", word.text);
                        } else if t.hands[hand].cell(piece).is_some()
                            && t.hands[hand].level == Some(Priority::Explicit)
                        {
                            self.warn("<", "Duplicate:", word.text);
                        } else {
                            let t = &mut self.coll.parallels[active].testimony[witness];
                            if hand != 0 {
                                t.corrected = true;
                                let mut p = hand - 1;
                                while p > 0 && !t.hands[p].testified() {
                                    p -= 1;
                                }
                                t.hands[hand].prior = p;
                            }
                            t.hands[hand].set_cell(piece, Some(set_id));
                            t.hands[hand].level = Some(Priority::Explicit);
                        }
                    }
                },
            }
        }
    }

    /// At `>`: members of `$?` lose any group-claimed cell, and a first
    /// hand with no cell at all is reported, lacunae excepted.
    fn close_assignment(&mut self, parallel: usize, piece: usize) {
        let mut unassigned: Vec<usize> = Vec::new();
        for ms in self.first_unrooted()..self.coll.n_witnesses() {
            let in_unknown = self.coll.in_unknown_group(parallel, ms);
            let hand = &mut self.coll.parallels[parallel].testimony[ms].hands[0];
            if hand.suppressed {
                continue;
            }
            if in_unknown && hand.level.map_or(true, |l| l <= Priority::Unknown) {
                hand.set_cell(piece, None);
                continue;
            }
            if hand.in_lacuna {
                continue;
            }
            if hand.cell(piece).is_none() {
                unassigned.push(ms);
            }
        }
        for ms in unassigned {
            let label = self.coll.input_label(parallel, ms, 0);
            self.warn("<", "Unassigned:", label);
        }
    }

    /// Priority and members of a `$x` claim, or `None` if undefined.
    fn claimants(&self, parallel: usize, token: &str) -> Option<(Priority, Vec<usize>)> {
        let name = crate::macros::MacroRegistry::name_of(token)?;
        let mac = self.coll.parallels[parallel].macros.get(name)?;
        Some((mac.priority, mac.members().collect()))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::model::MISSING;
    use crate::testing;

    #[test]
    fn test_lemma_and_units_and_readings() {
        let (coll, diags) = testing::interpret("* A ; [ two words | a b | c ] < xy A >");
        assert!(diags.is_clean());
        assert_eq!(coll.lemma, "two words");
        assert_eq!(coll.pieces.len(), 1);
        assert_eq!(coll.pieces[0].units, 2);
        assert_eq!(coll.readings, vec![2, 1]);
        assert_eq!(coll.weights, vec![1, 1]);
        assert_eq!(coll.weighted_units, 2);
    }

    #[test]
    fn test_explicit_assignment() {
        let (coll, diags) = testing::interpret("* A B ; [ w | a b ] < x A | y B >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
        assert_eq!(coll.state_at(0, 1, 0, 0, 0), 'y');
    }

    #[test]
    fn test_corrector_assignment_keeps_prior_hand() {
        let (coll, diags) = testing::interpret("* A ; [ w | a b ] < x A | y A:2 >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
        assert_eq!(coll.state_at(0, 0, 2, 0, 0), 'y');
        // Hand 1 never testified, so it reads through to the first hand.
        assert_eq!(coll.state_at(0, 0, 1, 0, 0), 'x');
    }

    #[test]
    fn test_group_claims_and_overrides() {
        let (coll, diags) =
            testing::interpret("* A B C ; = $u B C ; [ w | a b ] < x $* | y $u | z C >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
        assert_eq!(coll.state_at(0, 1, 0, 0, 0), 'y');
        assert_eq!(coll.state_at(0, 2, 0, 0, 0), 'z');
    }

    #[test]
    fn test_earlier_group_cannot_reclaim() {
        let (coll, diags) =
            testing::interpret("* A B ; = $u B ; [ w | a b ] < y $u | x $* >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
        assert_eq!(coll.state_at(0, 1, 0, 0, 0), 'y');
    }

    #[test]
    fn test_equal_group_claim_warns_per_member() {
        let (_, diags) = testing::interpret("* A B ; = $u A B ; [ w | a b ] < x $u | y $u >");
        assert_eq!(diags.warning_count(), 2);
        assert_eq!(diags.warnings()[0].message, "Duplicate macro:");
    }

    #[test]
    fn test_explicit_duplicate_warns() {
        let (coll, diags) = testing::interpret("* A ; [ w | a b ] < x A | y A >");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "Duplicate:");
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
    }

    #[test]
    fn test_unknown_group_members_are_cleared_at_close() {
        let (coll, diags) = testing::interpret("* A B ; = $? B ; [ w | a b ] < x $* >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
        assert_eq!(coll.state_at(0, 1, 0, 0, 0), MISSING);
    }

    #[test]
    fn test_explicit_outranks_unknown_group() {
        let (coll, diags) = testing::interpret("* A B ; = $? B ; [ w | a b ] < x $* | y B >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 1, 0, 0, 0), 'y');
    }

    #[test]
    fn test_unassigned_witness_warns() {
        let (_, diags) = testing::interpret("* A B ; [ w | a b ] < x A >");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "Unassigned:");
        assert_eq!(diags.warnings()[0].detail, "B");
    }

    #[test]
    fn test_lacunose_witness_is_skipped_quietly() {
        let (coll, diags) = testing::interpret("* A B ; ( B ; [ w | a b ] < x $* > ) B ;");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 1, 0, 0, 0), MISSING);
    }

    #[test]
    fn test_explicit_assignment_in_lacuna_warns() {
        let (_, diags) = testing::interpret("* A B ; ( B ; [ w | a b ] < x A | y B > ) B ;");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "In lacuna:");
    }

    #[test]
    fn test_variant_mismatch_is_fatal() {
        let err = testing::try_interpret("* A ; [ w | a b | c d ] < x A >").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Variant mismatch:"));
        assert!(text.contains("x (1) should have exactly 2"));
    }

    #[test]
    fn test_states_before_any_block_is_fatal() {
        let err = testing::try_interpret("* A ; < x A >").unwrap_err();
        assert!(err.to_string().contains("No reading block open."));
    }

    #[test]
    fn test_name_before_any_states_is_fatal() {
        let err = testing::try_interpret("* A B ; = $u B ; [ w | a b ] < $u x A >").unwrap_err();
        assert!(err.to_string().contains("States must precede names:"));
    }

    #[test]
    fn test_lacunose_and_unassigned_marks_normalize_to_missing() {
        let (coll, diags) = testing::interpret("* A ; [ w | a b | c d ] < a. A >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'a');
        assert_eq!(coll.state_at(0, 0, 0, 0, 1), MISSING);
    }

    #[test]
    fn test_raw_weight_and_graded_weight() {
        let (coll, diags) = testing::interpret("* A ; [ w |*3 a | b |7 c |6 d |0 e |x f ] < xxxxxx A >");
        assert!(diags.is_clean());
        assert_eq!(coll.weights, vec![3, 1, 2, 1, 0, 0]);
        assert_eq!(coll.weighted_units, 7);
    }

    #[test]
    fn test_bad_raw_weight_warns() {
        let (coll, diags) = testing::interpret("* A ; [ w |*x a ] < x A >");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "Bad weight:");
        assert_eq!(coll.weights, vec![0]);
    }

    #[test]
    fn test_graded_weight_ignores_divisor_of_zero() {
        let config = Config {
            ed_divisor: 0,
            ..Config::default()
        };
        let (coll, _) = testing::interpret_with("* A ; [ w |9 a ] < x A >", &config).unwrap();
        assert_eq!(coll.weights, vec![1]);
    }

    #[test]
    fn test_comments_inside_blocks_are_eaten() {
        let (coll, diags) =
            testing::interpret("* A ; [ w \" gloss \" | a b ] < \" why \" x A >");
        assert!(diags.is_clean());
        assert_eq!(coll.lemma, "w");
        assert_eq!(coll.pieces[0].units, 1);
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
    }

    #[test]
    fn test_reassignment_block_for_same_piece() {
        let (coll, diags) = testing::interpret("* A B ; [ w | a b ] < x $* > < y B >");
        assert!(diags.is_clean());
        assert_eq!(coll.state_at(0, 0, 0, 0, 0), 'x');
        assert_eq!(coll.state_at(0, 1, 0, 0, 0), 'y');
    }
}
