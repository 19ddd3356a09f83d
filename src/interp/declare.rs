//! Witness declaration and group definition.

use super::{Interpreter, SetOp};
use crate::errors::Result;
use crate::macros::MacroRegistry;
use crate::model::{Lookup, Witness};

impl<'a> Interpreter<'a> {
    /// `* name... /c name... ;` — declare every witness, then one
    /// parallel per `/c` code seen, or a single uncoded parallel.
    pub(super) fn declare_witnesses(&mut self) -> Result<()> {
        if self.coll.declared() {
            return Err(self.fatal("*", "Already declared the witnesses.", ""));
        }
        if let Some(root) = self.coll.root.clone() {
            self.coll.witnesses.push(Witness::declare(&root));
        }
        let mut codes: Vec<Option<char>> = Vec::new();
        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof("*"));
            };
            match word.head() {
                ';' => break,
                '"' => {
                    if self.scanner.eat_until('"').is_none() {
                        return Err(self.eof("*"));
                    }
                }
                '/' => codes.push(word.modifier()),
                _ => self.coll.witnesses.push(Witness::declare(word.text)),
            }
        }
        if self.coll.witnesses.is_empty() {
            return Err(self.fatal("*", "No witnesses.", ""));
        }
        if codes.is_empty() {
            self.coll.add_parallel(None);
        } else {
            for code in codes {
                self.coll.add_parallel(code);
            }
        }
        self.coll.parallels[0].position = self.predeclare_position.clone();
        // The root testifies in the first parallel only, at year zero.
        if self.coll.root.is_some() {
            let hand = &mut self.coll.parallels[0].testimony[0].hands[0];
            hand.earliest = 0;
            hand.average = 0;
            hand.latest = Some(0);
            hand.suppressed = false;
            hand.mandated = true;
        }
        Ok(())
    }

    /// `= $m name... ;` — define or adjust the group `$m` in the active
    /// parallel. `=+` adds to it, `=-` removes from it, `=?` reports
    /// names that are not members.
    pub(super) fn define_group(&mut self, op: SetOp) -> Result<()> {
        let Some(word) = self.scanner.next_word() else {
            return Err(self.eof("="));
        };
        let Some(name) = MacroRegistry::name_of(word.text).filter(|_| word.head() == '$') else {
            return Err(self.fatal("=", "Not a macro name:", word.text));
        };
        if !self.coll.declared() {
            return Err(self.fatal("=", "No witnesses.", ""));
        }
        let active = self.coll.active;

        if op == SetOp::Check {
            return self.check_group(active, name);
        }

        if !self.coll.parallels[active].macros.has(name) {
            let seq = self.coll.next_macro_seq();
            self.coll.parallels[active].macros.ensure(name, seq);
        } else if op == SetOp::Replace {
            if let Some(mac) = self.coll.parallels[active].macros.get_mut(name) {
                mac.clear();
            }
        }
        let keep = op != SetOp::Remove;

        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof("="));
            };
            match word.head() {
                ';' => return Ok(()),
                '$' => match self.group_members(active, word.text) {
                    None => self.warn("=", "Unknown macro:", word.text),
                    Some(members) => {
                        if let Some(mac) = self.coll.parallels[active].macros.get_mut(name) {
                            for ms in members {
                                mac.set(ms, keep);
                            }
                        }
                    }
                },
                _ => match self.coll.resolve(word.text) {
                    Lookup::Unknown => {
                        if word.text.contains(';') {
                            return Err(self.fatal("=", "Unknown:", word.text));
                        }
                        self.warn("=", "Unknown:", word.text);
                    }
                    Lookup::Suppressed => {}
                    Lookup::BadHand | Lookup::Found { hand: 1.., .. } => {
                        self.warn("=", "No macros with correctors:", word.text);
                    }
                    Lookup::Found { witness, .. } => {
                        if let Some(mac) = self.coll.parallels[active].macros.get_mut(name) {
                            mac.set(witness, keep);
                        }
                    }
                },
            }
        }
    }

    /// `=? $m name... ;` — membership check, no mutation.
    fn check_group(&mut self, parallel: usize, name: char) -> Result<()> {
        if !self.coll.parallels[parallel].macros.has(name) {
            self.warn("=", "Unknown macro:", format!("${name}"));
            if self.scanner.eat_until(';').is_none() {
                return Err(self.eof("="));
            }
            return Ok(());
        }
        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof("="));
            };
            match word.head() {
                ';' => return Ok(()),
                '$' => match self.group_members(parallel, word.text) {
                    None => self.warn("=", "Unknown macro:", word.text),
                    Some(members) => {
                        for ms in members {
                            if !self.member_of(parallel, name, ms) {
                                let label =
                                    self.coll.tagged(parallel, &self.coll.witnesses[ms].name);
                                self.warn("=", "Not a member:", label);
                            }
                        }
                    }
                },
                _ => match self.coll.resolve(word.text) {
                    Lookup::Unknown => self.warn("=", "Unknown:", word.text),
                    Lookup::Suppressed => {}
                    Lookup::BadHand | Lookup::Found { hand: 1.., .. } => {
                        self.warn("=", "No macros with correctors:", word.text);
                    }
                    Lookup::Found { witness, .. } => {
                        if !self.member_of(parallel, name, witness) {
                            self.warn("=", "Not a member:", word.text);
                        }
                    }
                },
            }
        }
    }

    fn member_of(&self, parallel: usize, name: char, witness: usize) -> bool {
        self.coll.parallels[parallel]
            .macros
            .get(name)
            .map(|m| m.contains(witness))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::macros::Priority;
    use crate::testing;

    #[test]
    fn test_declaration_builds_one_parallel() {
        let (coll, diags) = testing::interpret("* P46 01 03 ;");
        assert!(diags.is_clean());
        assert_eq!(coll.n_witnesses(), 3);
        assert_eq!(coll.parallels.len(), 1);
        assert_eq!(coll.parallels[0].code, None);
        assert_eq!(coll.parallels[0].testimony.len(), 3);
    }

    #[test]
    fn test_declaration_with_codes_builds_each_parallel() {
        let (coll, _) = testing::interpret("* A B /m /l ;");
        assert_eq!(coll.parallels.len(), 2);
        assert_eq!(coll.parallels[0].code, Some('m'));
        assert_eq!(coll.parallels[1].code, Some('l'));
    }

    #[test]
    fn test_declaration_skips_comments() {
        let (coll, diags) = testing::interpret("* A \" the main uncials \" B ;");
        assert!(diags.is_clean());
        assert_eq!(coll.n_witnesses(), 2);
    }

    #[test]
    fn test_second_declaration_is_fatal() {
        let err = testing::try_interpret("* A ; * B ;").unwrap_err();
        assert!(err.to_string().contains("Already declared the witnesses."));
    }

    #[test]
    fn test_empty_declaration_is_fatal() {
        let err = testing::try_interpret("* ;").unwrap_err();
        assert!(err.to_string().contains("No witnesses."));
    }

    #[test]
    fn test_root_is_reinstated_in_first_parallel_only() {
        let mut config = Config::default();
        config.root = Some("Arch".to_string());
        let (coll, _) = testing::interpret_with("* A /m /l ;", &config).unwrap();
        assert_eq!(coll.witnesses[0].name, "Arch");
        let first = &coll.parallels[0].testimony[0].hands[0];
        assert!(!first.suppressed);
        assert!(first.mandated);
        assert_eq!(first.latest, Some(0));
        assert!(coll.parallels[1].testimony[0].hands[0].suppressed);
    }

    #[test]
    fn test_define_and_membership() {
        let (coll, diags) = testing::interpret("* A B C ; = $u A B ;");
        assert!(diags.is_clean());
        let mac = coll.parallels[0].macros.get('u').unwrap();
        assert!(mac.contains(0));
        assert!(mac.contains(1));
        assert!(!mac.contains(2));
        assert_eq!(mac.priority, Priority::Member(2));
    }

    #[test]
    fn test_redefine_replaces_but_keeps_priority() {
        let (coll, _) = testing::interpret("* A B ; = $u A ; = $v B ; = $u B ;");
        let mac = coll.parallels[0].macros.get('u').unwrap();
        assert!(!mac.contains(0));
        assert!(mac.contains(1));
        assert_eq!(mac.priority, Priority::Member(2));
        assert_eq!(
            coll.parallels[0].macros.get('v').unwrap().priority,
            Priority::Member(3)
        );
    }

    #[test]
    fn test_add_and_remove() {
        let (coll, _) = testing::interpret("* A B C ; = $u A ; =+ $u B C ; =- $u A ;");
        let mac = coll.parallels[0].macros.get('u').unwrap();
        assert!(!mac.contains(0));
        assert!(mac.contains(1));
        assert!(mac.contains(2));
    }

    #[test]
    fn test_define_from_another_group() {
        let (coll, _) = testing::interpret("* A B C ; = $u A B ; = $v $u C ;");
        let mac = coll.parallels[0].macros.get('v').unwrap();
        assert!(mac.contains(0));
        assert!(mac.contains(1));
        assert!(mac.contains(2));
    }

    #[test]
    fn test_define_with_corrector_warns() {
        let (_, diags) = testing::interpret("* A B ; = $u A:2 B ;");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "No macros with correctors:");
    }

    #[test]
    fn test_define_unknown_name_warns() {
        let (_, diags) = testing::interpret("* A ; = $u Z A ;");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "Unknown:");
    }

    #[test]
    fn test_unknown_name_glued_to_terminator_is_fatal() {
        let err = testing::try_interpret("* A ; = $u Z; [").unwrap_err();
        assert!(err.to_string().contains("Unknown:"));
    }

    #[test]
    fn test_check_reports_non_members() {
        let (_, diags) = testing::interpret("* A B C ; = $u A B ; =? $u A C ;");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "Not a member:");
        assert_eq!(diags.warnings()[0].detail, "C");
    }

    #[test]
    fn test_check_of_unknown_group_eats_list() {
        let (coll, diags) = testing::interpret("* A ; =? $z A ; [ w | ] < x A >");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "Unknown macro:");
        assert_eq!(coll.pieces.len(), 1);
    }

    #[test]
    fn test_groups_are_per_parallel() {
        let (coll, diags) = testing::interpret("* A B /m /l ; = $u A ; /l = $u B ;");
        assert!(diags.is_clean());
        assert!(coll.parallels[0].macros.get('u').unwrap().contains(0));
        assert!(!coll.parallels[0].macros.get('u').unwrap().contains(1));
        assert!(coll.parallels[1].macros.get('u').unwrap().contains(1));
    }

    #[test]
    fn test_suppressed_names_are_quietly_dropped() {
        let (coll, diags) = testing::interpret("* A B ; - B ; = $u A B ;");
        assert!(diags.is_clean());
        assert!(!coll.parallels[0].macros.get('u').unwrap().contains(1));
    }
}
