//! Witness roster commands: suppression, mandates, lacunae.

use super::Interpreter;
use crate::errors::Result;
use crate::model::Lookup;

/// What a lacuna command does to the hands it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LacunaOp {
    Open,
    Close,
    Check,
}

impl LacunaOp {
    fn command(self) -> &'static str {
        match self {
            LacunaOp::Open => "(",
            LacunaOp::Close => ")",
            LacunaOp::Check => "(?",
        }
    }
}

impl<'a> Interpreter<'a> {
    /// `- name... ;` — drop witnesses or single hands from the run. A
    /// bare name takes its correctors with it.
    pub(super) fn suppress_list(&mut self) -> Result<()> {
        let active = self.coll.active;
        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof("-"));
            };
            match word.head() {
                ';' => return Ok(()),
                '$' => match self.group_members(active, word.text) {
                    None => self.warn("-", "Unknown macro:", word.text),
                    Some(members) => {
                        let first = self.first_unrooted();
                        for ms in members.into_iter().filter(|&ms| ms >= first) {
                            for hand in &mut self.coll.parallels[active].testimony[ms].hands {
                                hand.suppressed = true;
                            }
                        }
                    }
                },
                _ => match self.coll.resolve(word.text) {
                    Lookup::Suppressed => self.warn("-", "Already suppressed:", word.text),
                    Lookup::Unknown | Lookup::BadHand => self.warn("-", "Unknown:", word.text),
                    Lookup::Found { witness, hand } => {
                        let t = &mut self.coll.parallels[active].testimony[witness];
                        for h in Self::hand_range(hand) {
                            t.hands[h].suppressed = true;
                        }
                    }
                },
            }
        }
    }

    /// `+ name... ;` — exempt hands from threshold suppression. Naming
    /// a corrector keeps its first hand as well; the corrector is of no
    /// use without it.
    pub(super) fn mandate_list(&mut self) -> Result<()> {
        let active = self.coll.active;
        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof("+"));
            };
            match word.head() {
                ';' => return Ok(()),
                '$' => match self.group_members(active, word.text) {
                    None => self.warn("+", "Unknown macro:", word.text),
                    Some(members) => {
                        let first = self.first_unrooted();
                        for ms in members.into_iter().filter(|&ms| ms >= first) {
                            self.coll.parallels[active].testimony[ms].hands[0].mandated = true;
                        }
                    }
                },
                _ => match self.coll.resolve(word.text) {
                    Lookup::Suppressed => self.warn("+", "Already suppressed:", word.text),
                    Lookup::Unknown | Lookup::BadHand => self.warn("+", "Unknown:", word.text),
                    Lookup::Found { witness, hand } => {
                        let t = &mut self.coll.parallels[active].testimony[witness];
                        t.hands[hand].mandated = true;
                        t.hands[0].mandated = true;
                    }
                },
            }
        }
    }

    /// `( name... ;`, `) name... ;`, `(? name... ;` — open, close, or
    /// probe lacunose stretches.
    pub(super) fn lacuna_list(&mut self, op: LacunaOp) -> Result<()> {
        let cmd = op.command();
        let active = self.coll.active;
        loop {
            let Some(word) = self.scanner.next_word() else {
                return Err(self.eof(cmd));
            };
            match word.head() {
                ';' => return Ok(()),
                '$' => match self.group_members(active, word.text) {
                    None => self.warn(cmd, "Unknown macro:", word.text),
                    Some(members) => {
                        let first = self.first_unrooted();
                        for ms in members.into_iter().filter(|&ms| ms >= first) {
                            match op {
                                LacunaOp::Open => self.set_lacuna(active, ms, true),
                                LacunaOp::Close => self.set_lacuna(active, ms, false),
                                LacunaOp::Check => {
                                    if !self.any_lacuna(active, ms) {
                                        let label = self
                                            .coll
                                            .tagged(active, &self.coll.witnesses[ms].name);
                                        self.warn(cmd, "Not in lacuna:", label);
                                    }
                                }
                            }
                        }
                    }
                },
                _ => match self.coll.resolve(word.text) {
                    Lookup::Suppressed => {}
                    Lookup::Unknown | Lookup::BadHand => self.warn(cmd, "Unknown:", word.text),
                    Lookup::Found { witness, hand } => {
                        let targets = Self::hand_range(hand);
                        let t = &self.coll.parallels[active].testimony[witness];
                        let any = targets.clone().any(|h| t.hands[h].in_lacuna);
                        let all = targets.clone().all(|h| t.hands[h].in_lacuna);
                        match op {
                            LacunaOp::Open => {
                                if all {
                                    self.warn(cmd, "Already in lacuna:", word.text);
                                } else {
                                    let t = &mut self.coll.parallels[active].testimony[witness];
                                    for h in targets {
                                        t.hands[h].in_lacuna = true;
                                    }
                                }
                            }
                            LacunaOp::Close => {
                                if !any {
                                    self.warn(cmd, "Not in lacuna:", word.text);
                                } else {
                                    let t = &mut self.coll.parallels[active].testimony[witness];
                                    for h in targets {
                                        t.hands[h].in_lacuna = false;
                                    }
                                }
                            }
                            LacunaOp::Check => {
                                if !any {
                                    self.warn(cmd, "Not in lacuna:", word.text);
                                }
                            }
                        }
                    }
                },
            }
        }
    }

    fn set_lacuna(&mut self, parallel: usize, witness: usize, value: bool) {
        for hand in &mut self.coll.parallels[parallel].testimony[witness].hands {
            hand.in_lacuna = value;
        }
    }

    fn any_lacuna(&self, parallel: usize, witness: usize) -> bool {
        self.coll.parallels[parallel].testimony[witness]
            .hands
            .iter()
            .any(|h| h.in_lacuna)
    }
}
