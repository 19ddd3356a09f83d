//! Collation interpreter.
//!
//! Commands are dispatched on the first character of each word:
//!
//! | Head | Command                                          |
//! |------|--------------------------------------------------|
//! | `*`  | Declare witnesses and parallels                  |
//! | `/c` | Switch to the parallel coded `c`                 |
//! | `=`  | Define a group; `=+` add, `=-` remove, `=?` check|
//! | `@`  | Set the reading position marker                  |
//! | `[`  | Open a reading block                             |
//! | `<`  | Assign state sets to witnesses                   |
//! | `~`  | Alias a witness                                  |
//! | `^`  | Import chronology                                |
//! | `-`  | Suppress witnesses or hands                      |
//! | `+`  | Mandate witnesses or hands                       |
//! | `(`  | Open a lacuna; `(?` checks one                   |
//! | `)`  | Close a lacuna                                   |
//! | `"`  | Comment, to the next word starting with `"`      |
//! | `#`  | Discard words through `;`                        |
//! | `{`  | Ignored, as is `}`                               |
//! | `!`  | End of input                                     |
//!
//! Anything else is an unknown token warning. Warnings never stop the
//! interpreter; malformed structure (a missing terminator, a reading
//! block that never opened) is fatal and stops the run at once.

mod chron;
mod declare;
mod readings;
mod roster;

use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::{PrepError, Result};
use crate::lexer::{Scanner, Word};
use crate::model::{Collation, Lookup, MAX_HANDS};

pub(crate) use roster::LacunaOp;

/// Witness-group adjustment selected by the `=` command modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOp {
    Replace,
    Add,
    Remove,
    Check,
}

/// Commands, keyed by the first character of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Declare,
    SwitchParallel,
    Define(SetOp),
    Verse,
    Readings,
    Assign,
    Alias,
    Chron,
    Suppress,
    Mandate,
    LacunaOpen,
    LacunaClose,
    LacunaCheck,
    Comment,
    Discard,
    Section,
    End,
}

impl Command {
    fn classify(word: &Word) -> Option<Command> {
        match word.head() {
            '!' => Some(Command::End),
            '*' => Some(Command::Declare),
            '/' => Some(Command::SwitchParallel),
            '=' => Some(Command::Define(match word.modifier() {
                Some('+') => SetOp::Add,
                Some('-') => SetOp::Remove,
                Some('?') => SetOp::Check,
                _ => SetOp::Replace,
            })),
            '@' => Some(Command::Verse),
            '[' => Some(Command::Readings),
            '<' => Some(Command::Assign),
            '~' => Some(Command::Alias),
            '^' => Some(Command::Chron),
            '-' => Some(Command::Suppress),
            '+' => Some(Command::Mandate),
            '(' => Some(match word.modifier() {
                Some('?') => Command::LacunaCheck,
                _ => Command::LacunaOpen,
            }),
            ')' => Some(Command::LacunaClose),
            '"' => Some(Command::Comment),
            '#' => Some(Command::Discard),
            '{' | '}' => Some(Command::Section),
            _ => None,
        }
    }
}

/// Interpret a collation source into `coll`, collecting warnings in
/// `diags`. Returns an error only for fatal malformations.
pub fn interpret(
    source: &str,
    coll: &mut Collation,
    diags: &mut Diagnostics,
    config: &Config,
) -> Result<()> {
    Interpreter {
        scanner: Scanner::new(source),
        coll,
        diags,
        config,
        command_line: 1,
        predeclare_position: "Beginning".to_string(),
    }
    .run()
}

struct Interpreter<'a> {
    scanner: Scanner<'a>,
    coll: &'a mut Collation,
    diags: &'a mut Diagnostics,
    config: &'a Config,
    command_line: u32,
    /// Position marker seen before the declaration, adopted by the
    /// first parallel once it exists.
    predeclare_position: String,
}

impl<'a> Interpreter<'a> {
    fn run(&mut self) -> Result<()> {
        while let Some(word) = self.scanner.next_word() {
            self.command_line = word.line;
            let Some(command) = Command::classify(&word) else {
                self.warn("?", "Unknown token:", word.text);
                continue;
            };
            match command {
                Command::End => break,
                Command::Declare => self.declare_witnesses()?,
                Command::SwitchParallel => self.switch_parallel(&word)?,
                Command::Define(op) => self.define_group(op)?,
                Command::Verse => self.set_position()?,
                Command::Readings => self.open_readings()?,
                Command::Assign => self.assign_states()?,
                Command::Alias => self.set_aliases()?,
                Command::Chron => self.import_chronology()?,
                Command::Suppress => self.suppress_list()?,
                Command::Mandate => self.mandate_list()?,
                Command::LacunaOpen => self.lacuna_list(LacunaOp::Open)?,
                Command::LacunaClose => self.lacuna_list(LacunaOp::Close)?,
                Command::LacunaCheck => self.lacuna_list(LacunaOp::Check)?,
                Command::Comment => self.skip_comment()?,
                Command::Discard => self.discard_list()?,
                Command::Section => {}
            }
        }
        if !self.coll.declared() {
            return Err(self.fatal("*", "No witnesses.", ""));
        }
        self.check_open_lacunae();
        Ok(())
    }

    /// `/c` — make the parallel coded `c` current.
    fn switch_parallel(&mut self, word: &Word) -> Result<()> {
        match self.coll.parallel_index(word.modifier()) {
            Some(pp) => {
                self.coll.active = pp;
                Ok(())
            }
            None => Err(self.fatal("/", "Unknown parallel:", word.text)),
        }
    }

    /// `@ marker` — update the active parallel's reading position.
    fn set_position(&mut self) -> Result<()> {
        let Some(word) = self.scanner.next_word() else {
            return Err(self.eof("@"));
        };
        let position = word.text.to_string();
        match self.coll.parallels.get_mut(self.coll.active) {
            Some(par) => par.position = position,
            None => self.predeclare_position = position,
        }
        Ok(())
    }

    /// `~ name chron-name display-name` — alias a witness. A suppressed
    /// target still consumes its two names.
    fn set_aliases(&mut self) -> Result<()> {
        let Some(name) = self.scanner.next_word() else {
            return Err(self.eof("~"));
        };
        let target = match self.coll.resolve(name.text) {
            Lookup::Found { witness, hand: 0 } => Some(witness),
            Lookup::Suppressed => None,
            Lookup::Unknown => return Err(self.fatal("~", "Unknown:", name.text)),
            Lookup::Found { .. } | Lookup::BadHand => {
                return Err(self.fatal("~", "Cannot have a corrector:", name.text));
            }
        };
        let Some(chron) = self.scanner.next_word() else {
            return Err(self.eof("~"));
        };
        let chron = chron.text.to_string();
        let Some(display) = self.scanner.next_word() else {
            return Err(self.eof("~"));
        };
        if let Some(ms) = target {
            self.coll.witnesses[ms].chron_name = chron;
            self.coll.witnesses[ms].display_name = display.text.to_string();
        }
        Ok(())
    }

    /// `" words "` — discard everything through the closing quote word.
    fn skip_comment(&mut self) -> Result<()> {
        match self.scanner.eat_until('"') {
            Some(_) => Ok(()),
            None => Err(self.eof("(comment)")),
        }
    }

    /// `# words ;` — discard everything through the terminator.
    fn discard_list(&mut self) -> Result<()> {
        match self.scanner.eat_until(';') {
            Some(_) => Ok(()),
            None => Err(self.eof("#")),
        }
    }

    /// A lacuna left open at end of input is a warning per witness.
    fn check_open_lacunae(&mut self) {
        for pp in 0..self.coll.parallels.len() {
            for ms in 0..self.coll.n_witnesses() {
                let open = self.coll.parallels[pp].testimony[ms]
                    .hands
                    .iter()
                    .any(|h| h.in_lacuna);
                if open {
                    let label = self.coll.tagged(pp, &self.coll.witnesses[ms].name);
                    self.warn("(", "Lacuna still open:", label);
                }
            }
        }
    }

    /// Indices of a `$x` token's members in `parallel`, or `None` when
    /// no such group exists.
    fn group_members(&self, parallel: usize, token: &str) -> Option<Vec<usize>> {
        let name = crate::macros::MacroRegistry::name_of(token)?;
        let members = self.coll.parallels[parallel]
            .macros
            .get(name)?
            .members()
            .collect();
        Some(members)
    }

    /// First witness index macros may touch; the root is exempt.
    fn first_unrooted(&self) -> usize {
        if self.coll.root.is_some() {
            1
        } else {
            0
        }
    }

    fn position(&self) -> &str {
        self.coll
            .parallels
            .get(self.coll.active)
            .map(|p| p.position.as_str())
            .unwrap_or(self.predeclare_position.as_str())
    }

    fn diagnostic(
        &self,
        command: &'static str,
        message: &'static str,
        detail: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic {
            line: self.scanner.line(),
            command_line: self.command_line,
            command,
            message,
            detail: detail.into(),
            position: self.position().to_string(),
            lemma: self.coll.lemma.clone(),
        }
    }

    fn warn(&mut self, command: &'static str, message: &'static str, detail: impl Into<String>) {
        let diagnostic = self.diagnostic(command, message, detail);
        self.diags.warn(diagnostic);
    }

    fn fatal(
        &self,
        command: &'static str,
        message: &'static str,
        detail: impl Into<String>,
    ) -> PrepError {
        PrepError::Fatal(self.diagnostic(command, message, detail))
    }

    fn eof(&self, command: &'static str) -> PrepError {
        self.fatal(command, "Unexpected end of file", "")
    }

    /// Corrector hands a list command touches for a resolved name: the
    /// named hand alone, or every hand for a bare name.
    fn hand_range(hand: usize) -> std::ops::Range<usize> {
        if hand != 0 {
            hand..hand + 1
        } else {
            0..MAX_HANDS
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Lookup;
    use crate::testing;

    #[test]
    fn test_unknown_token_warns_and_continues() {
        let (coll, diags) = testing::interpret("% * A B ;");
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.warnings()[0].message, "Unknown token:");
        assert_eq!(coll.n_witnesses(), 2);
    }

    #[test]
    fn test_end_token_stops_reading() {
        let (coll, diags) = testing::interpret("* A B ; ! % % %");
        assert!(diags.is_clean());
        assert_eq!(coll.n_witnesses(), 2);
    }

    #[test]
    fn test_braces_are_ignored() {
        let (_, diags) = testing::interpret("{ * A B ; }");
        assert!(diags.is_clean());
    }

    #[test]
    fn test_comments_run_to_closing_quote() {
        let (coll, diags) = testing::interpret("\" any; words [ here \" * A ;");
        assert!(diags.is_clean());
        assert_eq!(coll.n_witnesses(), 1);
    }

    #[test]
    fn test_discard_runs_to_terminator() {
        let (coll, diags) = testing::interpret("* A ; # B % C ;");
        assert!(diags.is_clean());
        assert_eq!(coll.n_witnesses(), 1);
    }

    #[test]
    fn test_verse_updates_position() {
        let (coll, _) = testing::interpret("* A ; @ Jn3:16");
        assert_eq!(coll.parallels[0].position, "Jn3:16");
    }

    #[test]
    fn test_verse_before_declaration_is_kept() {
        let (coll, diags) = testing::interpret("@ Jn3:16 * A ;");
        assert!(diags.is_clean());
        assert_eq!(coll.parallels[0].position, "Jn3:16");
    }

    #[test]
    fn test_switch_parallel() {
        let (coll, diags) = testing::interpret("* A /m B /l ; /l @ Lk1:1 /m @ Mk1:1");
        assert!(diags.is_clean());
        assert_eq!(coll.parallels[0].code, Some('m'));
        assert_eq!(coll.parallels[1].code, Some('l'));
        assert_eq!(coll.parallels[1].position, "Lk1:1");
        assert_eq!(coll.parallels[0].position, "Mk1:1");
    }

    #[test]
    fn test_unknown_parallel_is_fatal() {
        let err = testing::try_interpret("* A ; /z").unwrap_err();
        assert!(err.to_string().contains("Unknown parallel:"));
    }

    #[test]
    fn test_alias_changes_both_names() {
        let (coll, diags) = testing::interpret("* 01 ; ~ 01 S Sinaiticus");
        assert!(diags.is_clean());
        assert_eq!(coll.witnesses[0].chron_name, "S");
        assert_eq!(coll.witnesses[0].display_name, "Sinaiticus");
        assert_eq!(coll.resolve("01"), Lookup::Found { witness: 0, hand: 0 });
    }

    #[test]
    fn test_alias_of_suppressed_witness_consumes_names() {
        let (coll, diags) = testing::interpret("* 01 02 ; - 01 ; ~ 01 S Sin");
        assert!(diags.is_clean());
        assert_eq!(coll.witnesses[0].chron_name, "01");
    }

    #[test]
    fn test_alias_of_corrector_is_fatal() {
        let err = testing::try_interpret("* 01 ; ~ 01:2 S Sin").unwrap_err();
        assert!(err.to_string().contains("Cannot have a corrector:"));
    }

    #[test]
    fn test_missing_declaration_is_fatal() {
        let err = testing::try_interpret("@ Mt1:1").unwrap_err();
        assert!(err.to_string().contains("No witnesses."));
    }

    #[test]
    fn test_unterminated_comment_is_fatal() {
        let err = testing::try_interpret("* A ; \" runs off").unwrap_err();
        assert!(err.to_string().contains("Unexpected end of file"));
    }
}
