//! Witness groups.
//!
//! A macro names a set of witnesses so a reading block can assign a whole
//! group at once. Every claim on a cell carries a priority: witnesses named
//! directly outrank the implicit missing group `$?`, which outranks every
//! declared group, and a later declared group outranks an earlier one.
//! Priorities decide who wins a contested cell and whether the contest
//! deserves a warning.

use std::collections::HashMap;

/// Reserved name of the group holding every witness.
pub const ALL: char = '*';
/// Reserved name of the missing group.
pub const UNKNOWN: char = '?';

/// Priority of a claim on a cell. A claim strictly above the holder's
/// replaces it silently; an equal claim is a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// A declared group, ranked by declaration sequence.
    Member(u32),
    /// The implicit missing group `$?`.
    Unknown,
    /// A witness named directly in the block.
    Explicit,
}

/// A named group of witnesses.
#[derive(Debug, Clone)]
pub struct Macro {
    pub priority: Priority,
    members: Vec<bool>,
}

impl Macro {
    fn new(priority: Priority, n_witnesses: usize, member: bool) -> Self {
        Macro {
            priority,
            members: vec![member; n_witnesses],
        }
    }

    pub fn contains(&self, witness: usize) -> bool {
        self.members.get(witness).copied().unwrap_or(false)
    }

    pub fn set(&mut self, witness: usize, member: bool) {
        if witness < self.members.len() {
            self.members[witness] = member;
        }
    }

    pub fn clear(&mut self) {
        for m in &mut self.members {
            *m = false;
        }
    }

    /// Indices of the member witnesses, ascending.
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(ms, _)| ms)
    }
}

/// Per-parallel macro table, keyed by the single character after `$`.
#[derive(Debug)]
pub struct MacroRegistry {
    n_witnesses: usize,
    table: HashMap<char, Macro>,
}

impl MacroRegistry {
    /// A fresh table holding the two reserved groups: `$*` containing
    /// every witness, and the empty missing group `$?`.
    pub fn new(n_witnesses: usize, all_seq: u32) -> Self {
        let mut table = HashMap::new();
        table.insert(ALL, Macro::new(Priority::Member(all_seq), n_witnesses, true));
        table.insert(UNKNOWN, Macro::new(Priority::Unknown, n_witnesses, false));
        MacroRegistry { n_witnesses, table }
    }

    /// Group name carried by a `$x` token.
    pub fn name_of(token: &str) -> Option<char> {
        token.chars().nth(1)
    }

    pub fn has(&self, name: char) -> bool {
        self.table.contains_key(&name)
    }

    pub fn get(&self, name: char) -> Option<&Macro> {
        self.table.get(&name)
    }

    pub fn get_mut(&mut self, name: char) -> Option<&mut Macro> {
        self.table.get_mut(&name)
    }

    /// Fetch `name`, creating an empty group at `seq` priority if new.
    pub fn ensure(&mut self, name: char, seq: u32) -> &mut Macro {
        let n = self.n_witnesses;
        self.table
            .entry(name)
            .or_insert_with(|| Macro::new(Priority::Member(seq), n, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Member(1) < Priority::Member(2));
        assert!(Priority::Member(200) < Priority::Unknown);
        assert!(Priority::Unknown < Priority::Explicit);
        assert_eq!(Priority::Explicit, Priority::Explicit);
    }

    #[test]
    fn test_reserved_groups() {
        let reg = MacroRegistry::new(3, 1);
        let all = reg.get(ALL).unwrap();
        assert_eq!(all.members().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(all.priority, Priority::Member(1));
        let unknown = reg.get(UNKNOWN).unwrap();
        assert_eq!(unknown.members().count(), 0);
        assert_eq!(unknown.priority, Priority::Unknown);
    }

    #[test]
    fn test_ensure_creates_once() {
        let mut reg = MacroRegistry::new(2, 1);
        reg.ensure('a', 2).set(0, true);
        reg.ensure('a', 9).set(1, true);
        let mac = reg.get('a').unwrap();
        assert_eq!(mac.priority, Priority::Member(2));
        assert_eq!(mac.members().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_any_character_names_a_group() {
        let mut reg = MacroRegistry::new(1, 1);
        reg.ensure('β', 2).set(0, true);
        assert!(reg.has('β'));
        assert_eq!(MacroRegistry::name_of("$β"), Some('β'));
        assert_eq!(MacroRegistry::name_of("$"), None);
    }

    #[test]
    fn test_clear_and_set() {
        let mut reg = MacroRegistry::new(3, 1);
        let mac = reg.ensure('b', 2);
        mac.set(0, true);
        mac.set(2, true);
        assert!(mac.contains(0) && !mac.contains(1) && mac.contains(2));
        mac.clear();
        assert_eq!(mac.members().count(), 0);
        assert!(!mac.contains(9));
    }
}
