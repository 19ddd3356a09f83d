//! Collation data model.
//!
//! The interpreter fills one [`Collation`] per run. Witnesses are declared
//! once and shared by every parallel; each parallel keeps its own testimony
//! grid of witnesses by hands, its own macro table, and its own reading
//! position. State strings live in an append-only arena and cells hold
//! handles into it, so two groups assigned from the same token share one
//! set while equal spellings from different blocks stay distinct. Identity
//! suppression compares handles, not text, and depends on that.

use crate::config::Config;
use crate::macros::{MacroRegistry, Priority, UNKNOWN};

/// Hands tracked per witness: the original plus three correctors.
pub const MAX_HANDS: usize = 4;

/// State character for unattested or unreadable testimony.
pub const MISSING: char = '?';
/// In state strings, physically lacunose text; folded to [`MISSING`].
pub const LACUNOSE: char = '.';
/// In state strings, deliberately unassigned units; folded to [`MISSING`].
pub const UNASSIGNED: char = ':';
/// Separator for inline alias declarations in witness names.
pub const ALIAS_SEP: char = '~';

/// Handle to an interned state string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetId(u32);

/// Append-only arena of state strings. No deduplication on purpose.
#[derive(Debug, Default)]
pub struct SetArena {
    sets: Vec<Box<str>>,
}

impl SetArena {
    pub fn push(&mut self, states: &str) -> SetId {
        let id = SetId(self.sets.len() as u32);
        self.sets.push(states.into());
        id
    }

    pub fn get(&self, id: SetId) -> &str {
        &self.sets[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// State character of `id` at unit offset `unit`.
    pub fn state_at(&self, id: SetId, unit: usize) -> char {
        self.get(id).chars().nth(unit).unwrap_or(MISSING)
    }
}

/// One hand of one witness in one parallel.
#[derive(Debug, Clone)]
pub struct Hand {
    cells: Vec<Option<SetId>>,
    /// Earliest defensible date.
    pub earliest: i32,
    /// Editorially preferred date, used for stratification.
    pub average: i32,
    /// Latest defensible date; `None` until a chronology entry bounds it.
    pub latest: Option<i32>,
    /// True once a chronology record named this hand directly.
    pub has_chron: bool,
    /// Assigned by the stratifier.
    pub stratum: usize,
    pub suppressed: bool,
    pub mandated: bool,
    pub in_lacuna: bool,
    /// Priority of the claim holding this hand's cell in the open piece.
    pub level: Option<Priority>,
    /// Nearest earlier kept hand; maintained strictly below the hand's
    /// own index by coverage reduction.
    pub prior: usize,
}

impl Hand {
    fn new(suppressed: bool) -> Self {
        Hand {
            cells: Vec::new(),
            earliest: 0,
            average: 0,
            latest: None,
            has_chron: false,
            stratum: 0,
            suppressed,
            mandated: false,
            in_lacuna: false,
            level: None,
            prior: 0,
        }
    }

    pub fn cell(&self, piece: usize) -> Option<SetId> {
        self.cells.get(piece).copied().flatten()
    }

    /// True once this hand has claimed any cell of its own.
    pub fn testified(&self) -> bool {
        self.cells.iter().any(|c| c.is_some())
    }

    pub fn set_cell(&mut self, piece: usize, set: Option<SetId>) {
        if self.cells.len() <= piece {
            self.cells.resize(piece + 1, None);
        }
        self.cells[piece] = set;
    }
}

/// All hands of one witness in one parallel.
#[derive(Debug, Clone)]
pub struct Testimony {
    pub hands: Vec<Hand>,
    /// True when a corrector hand survived coverage reduction.
    pub corrected: bool,
}

impl Testimony {
    fn new(suppressed: bool) -> Self {
        Testimony {
            hands: (0..MAX_HANDS).map(|_| Hand::new(suppressed)).collect(),
            corrected: false,
        }
    }
}

/// A declared witness. `name` keys lookups in the collation body,
/// `chron_name` keys chronology records, `display_name` appears in the
/// generated artifacts.
#[derive(Debug, Clone)]
pub struct Witness {
    pub name: String,
    pub chron_name: String,
    pub display_name: String,
}

impl Witness {
    /// Parse a declaration token, honoring inline aliases:
    /// `name~chron-name` or `name~chron-name~display-name`.
    pub fn declare(token: &str) -> Self {
        match token.split_once(ALIAS_SEP) {
            None => {
                let name = token.to_string();
                Witness {
                    chron_name: name.clone(),
                    display_name: name.clone(),
                    name,
                }
            }
            Some((name, rest)) => {
                let name = name.to_string();
                match rest.split_once(ALIAS_SEP) {
                    None => Witness {
                        chron_name: rest.to_string(),
                        display_name: name.clone(),
                        name,
                    },
                    Some((chron, display)) => Witness {
                        chron_name: chron.to_string(),
                        display_name: display.to_string(),
                        name,
                    },
                }
            }
        }
    }
}

/// One parallel tradition: its code, reading position, testimony grid,
/// and macro table.
#[derive(Debug)]
pub struct Parallel {
    /// Single-character code from the declaration; `None` for the default.
    pub code: Option<char>,
    /// Position marker in force, from the last `@` command.
    pub position: String,
    pub testimony: Vec<Testimony>,
    pub macros: MacroRegistry,
}

/// A reading block: a run of consecutive variation units settled together.
#[derive(Debug, Clone, Copy)]
pub struct Piece {
    pub first_unit: usize,
    pub units: usize,
}

/// Result of a witness lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found { witness: usize, hand: usize },
    /// The requested hand is suppressed, or the name carries a leading `-`.
    Suppressed,
    Unknown,
    BadHand,
}

/// Everything the interpreter accumulates from a collation file.
#[derive(Debug)]
pub struct Collation {
    pub witnesses: Vec<Witness>,
    pub parallels: Vec<Parallel>,
    /// Index of the parallel now receiving commands.
    pub active: usize,
    pub pieces: Vec<Piece>,
    /// Weight of each variation unit; zeroed to suppress the unit.
    pub weights: Vec<u32>,
    /// Readings counted per unit.
    pub readings: Vec<u32>,
    /// Sum of unsuppressed unit weights.
    pub weighted_units: u32,
    pub sets: SetArena,
    /// Lemma of the current reading block.
    pub lemma: String,
    /// Declaration token for the synthetic root witness, when configured.
    pub root: Option<String>,
    /// State character the root shows at unset units of the first parallel.
    pub root_state: char,
    macro_seq: u32,
}

impl Collation {
    pub fn new(config: &Config) -> Self {
        Collation {
            witnesses: Vec::new(),
            parallels: Vec::new(),
            active: 0,
            pieces: Vec::new(),
            weights: Vec::new(),
            readings: Vec::new(),
            weighted_units: 0,
            sets: SetArena::default(),
            lemma: String::new(),
            root: config.root.clone(),
            root_state: config.root_state,
            macro_seq: 0,
        }
    }

    /// True once the witness declaration has closed.
    pub fn declared(&self) -> bool {
        !self.parallels.is_empty()
    }

    pub fn n_witnesses(&self) -> usize {
        self.witnesses.len()
    }

    pub fn n_units(&self) -> usize {
        self.weights.len()
    }

    pub(crate) fn next_macro_seq(&mut self) -> u32 {
        self.macro_seq += 1;
        self.macro_seq
    }

    /// Append a parallel sized for the declared witnesses. The root, when
    /// present, starts suppressed everywhere; the declaration close
    /// reinstates it in the first parallel only.
    pub(crate) fn add_parallel(&mut self, code: Option<char>) {
        let has_root = self.root.is_some();
        let all_seq = self.next_macro_seq();
        let testimony = (0..self.witnesses.len())
            .map(|ms| Testimony::new(has_root && ms == 0))
            .collect();
        self.parallels.push(Parallel {
            code,
            position: "Beginning".to_string(),
            testimony,
            macros: MacroRegistry::new(self.witnesses.len(), all_seq),
        });
    }

    pub fn parallel_index(&self, code: Option<char>) -> Option<usize> {
        self.parallels.iter().position(|p| p.code == code)
    }

    /// Look up a name token in the active parallel.
    pub fn resolve(&self, name: &str) -> Lookup {
        self.resolve_in(self.active, name)
    }

    /// Look up a name token in the given parallel. Tolerates one trailing
    /// dot (a witness separator in ECM exports) and treats a leading `-`
    /// as an inline suppression mark. A `:h` suffix selects a corrector
    /// hand. The root is never findable by name.
    pub fn resolve_in(&self, parallel: usize, name: &str) -> Lookup {
        if self.parallels.is_empty() {
            return Lookup::Unknown;
        }
        let mut name = name;
        if let Some(i) = name.find('.') {
            if i + 1 == name.len() {
                name = &name[..i];
            }
        }
        if name.starts_with('-') {
            return Lookup::Suppressed;
        }
        let mut hand = 0;
        if let Some((base, suffix)) = name.split_once(':') {
            match suffix.parse::<usize>() {
                Ok(h) if h < MAX_HANDS => hand = h,
                _ => return Lookup::BadHand,
            }
            name = base;
        }
        for (ms, w) in self.witnesses.iter().enumerate() {
            if w.name == name {
                if self.parallels[parallel].testimony[ms].hands[hand].suppressed {
                    return Lookup::Suppressed;
                }
                if self.root.is_some() && ms == 0 {
                    return Lookup::Unknown;
                }
                return Lookup::Found { witness: ms, hand };
            }
        }
        Lookup::Unknown
    }

    /// Resolve the cell a hand shows at `piece`, following prior-hand
    /// links for correctors whose own cell is unset.
    pub fn resolve_cell(
        &self,
        parallel: usize,
        witness: usize,
        hand: usize,
        piece: usize,
    ) -> Option<SetId> {
        let t = &self.parallels[parallel].testimony[witness];
        let mut h = hand;
        loop {
            if let Some(id) = t.hands[h].cell(piece) {
                return Some(id);
            }
            if h == 0 {
                return None;
            }
            let prior = t.hands[h].prior;
            h = if prior < h { prior } else { 0 };
        }
    }

    /// State character a hand shows at unit `unit` of `piece`.
    pub fn state_at(
        &self,
        parallel: usize,
        witness: usize,
        hand: usize,
        piece: usize,
        unit: usize,
    ) -> char {
        match self.resolve_cell(parallel, witness, hand, piece) {
            Some(id) => self.sets.state_at(id, unit),
            None => self.default_state(parallel, witness),
        }
    }

    /// Default character for a hand with no cell: the root shows its
    /// configured state in the first parallel, everyone else is missing.
    pub fn default_state(&self, parallel: usize, witness: usize) -> char {
        if self.root.is_some() && parallel == 0 && witness == 0 {
            self.root_state
        } else {
            MISSING
        }
    }

    /// A hand reaches the artifacts only while both it and its witness's
    /// first hand are unsuppressed, and a corrector only once it has
    /// testimony of its own.
    pub fn surviving(&self, parallel: usize, witness: usize, hand: usize) -> bool {
        let t = &self.parallels[parallel].testimony[witness];
        if t.hands[0].suppressed || t.hands[hand].suppressed {
            return false;
        }
        hand == 0 || t.hands[hand].testified()
    }

    /// Count of hands that will appear in the state matrix.
    pub fn active_hands(&self) -> usize {
        let mut n = 0;
        for pp in 0..self.parallels.len() {
            for ms in 0..self.witnesses.len() {
                for h in 0..MAX_HANDS {
                    if self.surviving(pp, ms, h) {
                        n += 1;
                    }
                }
            }
        }
        n
    }

    /// Recompute every `corrected` flag from what actually survived:
    /// suppression can take a witness's last corrector with it.
    pub fn refresh_corrected(&mut self) {
        for parallel in &mut self.parallels {
            for t in &mut parallel.testimony {
                t.corrected = !t.hands[0].suppressed
                    && t.hands[1..].iter().any(|h| !h.suppressed && h.testified());
            }
        }
    }

    /// True when the named witness sits in the missing group `$?` of the
    /// given parallel.
    pub fn in_unknown_group(&self, parallel: usize, witness: usize) -> bool {
        self.parallels[parallel]
            .macros
            .get(UNKNOWN)
            .map(|m| m.contains(witness))
            .unwrap_or(false)
    }

    /// Artifact label for a hand: display name, `:h` once the testimony
    /// kept a corrector, and the parallel code.
    pub fn label(&self, parallel: usize, witness: usize, hand: usize) -> String {
        let base = self.witnesses[witness].display_name.clone();
        self.suffixed(parallel, witness, hand, base)
    }

    /// Diagnostic label built on the collation-file name.
    pub fn input_label(&self, parallel: usize, witness: usize, hand: usize) -> String {
        let base = self.witnesses[witness].name.clone();
        self.suffixed(parallel, witness, hand, base)
    }

    /// A bare name tagged with the parallel code only.
    pub fn tagged(&self, parallel: usize, base: &str) -> String {
        let mut out = base.to_string();
        if let Some(code) = self.parallels[parallel].code {
            out.push('/');
            out.push(code);
        }
        out
    }

    fn suffixed(&self, parallel: usize, witness: usize, hand: usize, mut out: String) -> String {
        if self.parallels[parallel].testimony[witness].corrected {
            out.push(':');
            out.push_str(&hand.to_string());
        }
        if let Some(code) = self.parallels[parallel].code {
            out.push('/');
            out.push(code);
        }
        out
    }
}
