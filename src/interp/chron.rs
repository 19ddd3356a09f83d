//! Chronology import.
//!
//! A chronology file carries one record per line:
//!
//! ```text
//! name earliest average latest
//! ```
//!
//! The name matches the chronology alias of every witness that bears
//! it, across all parallels, and may carry a `:h` suffix to date one
//! corrector. A first-hand record also loosens the dates of correctors
//! that have no record of their own: they inherit the earliest and
//! average years but keep an open latest bound, since a correction can
//! postdate its manuscript by centuries.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use super::Interpreter;
use crate::errors::Result;
use crate::model::MAX_HANDS;

static CHRON_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\S+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s*$").expect("chron pattern"));

impl<'a> Interpreter<'a> {
    /// `^ path` — read witness date ranges from a file.
    pub(super) fn import_chronology(&mut self) -> Result<()> {
        let Some(word) = self.scanner.next_word() else {
            return Err(self.eof("^"));
        };
        let path = self.expand_home(word.text);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return Err(self.fatal("^", "Cannot open file:", word.text)),
        };
        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(caps) = CHRON_LINE.captures(trimmed) else {
                self.diags.note(format_args!("Malformed chron entry: {trimmed}"));
                continue;
            };
            let years = (
                caps[2].parse::<i32>(),
                caps[3].parse::<i32>(),
                caps[4].parse::<i32>(),
            );
            match years {
                (Ok(min), Ok(mid), Ok(max)) => self.apply_chron(&caps[1], min, mid, max),
                _ => self.diags.note(format_args!("Malformed chron entry: {trimmed}")),
            }
        }
        Ok(())
    }

    fn expand_home(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix('~') {
            if let Some(home) = &self.config.home {
                let mut expanded = home.clone().into_os_string();
                expanded.push(rest);
                return PathBuf::from(expanded);
            }
        }
        PathBuf::from(path)
    }

    fn apply_chron(&mut self, name: &str, min: i32, mid: i32, max: i32) {
        let (base, hand) = match name.split_once(':') {
            None => (name, 0),
            Some((base, suffix)) => match suffix.parse::<usize>() {
                Ok(h) if h < MAX_HANDS => (base, h),
                _ => {
                    self.diags.note(format_args!("Malformed chron entry: {name}"));
                    return;
                }
            },
        };
        for ms in 0..self.coll.n_witnesses() {
            if self.coll.witnesses[ms].chron_name != base {
                continue;
            }
            for pp in 0..self.coll.parallels.len() {
                let t = &mut self.coll.parallels[pp].testimony[ms];
                t.hands[hand].earliest = min;
                t.hands[hand].average = mid;
                t.hands[hand].latest = Some(max);
                t.hands[hand].has_chron = true;
                if hand != 0 {
                    continue;
                }
                for h in 1..MAX_HANDS {
                    if t.hands[h].has_chron {
                        continue;
                    }
                    t.hands[h].earliest = min;
                    t.hands[h].average = mid;
                    t.hands[h].latest = None;
                }
            }
        }
    }
}
