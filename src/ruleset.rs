// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The projection of a specification's rules under an accumulating
//! condition. `TreeBuilder` never looks at `Specification::rules` directly:
//! it always works through a `RuleSet`, which is what carries "which rules
//! are still live here, and under what residual condition".

use crate::condition::Condition;
use crate::rule::Rule;
use crate::specification::Specification;
use crate::tristate::TristateBitArray;

/// A rule as seen from inside a particular `RuleSet`: the rule itself, plus
/// its condition with whatever the rule set has already committed to
/// subtracted out.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSetEntry<'a> {
    pub rule: &'a Rule,
    pub effective: Condition,
}

/// A live slice of a specification: an accumulated `Condition` (what every
/// remaining rule still has to satisfy) and the ordered entries that are
/// still reachable under it.
///
/// Entries stop being appended as soon as one of them has an empty effective
/// condition: that rule matches everything the rule set could still see, so
/// nothing after it (lower priority, by construction) can ever fire.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSet<'a> {
    pub condition: Condition,
    entries: Vec<RuleSetEntry<'a>>,
}

fn populate<'a, I>(condition: &Condition, candidates: I) -> Vec<RuleSetEntry<'a>>
where
    I: IntoIterator<Item = &'a Rule>,
{
    let mut entries = Vec::new();
    for rule in candidates {
        if !rule.condition.is_compatible(condition) {
            continue;
        }
        let effective = rule.condition.subtract_intersection(condition);
        let is_exact_match = effective.is_empty();
        entries.push(RuleSetEntry { rule, effective });
        if is_exact_match {
            break;
        }
    }
    entries
}

impl<'a> RuleSet<'a> {
    /// The rule set over every rule in `spec`, optionally pre-committing to
    /// `fixed_flags` (the caller's "these context flags are already known at
    /// decode time" input).
    ///
    /// # Panics
    /// Panics if `fixed_flags` is given and its length does not match
    /// `spec.num_flags()`.
    pub fn root(spec: &'a Specification<'a>, fixed_flags: Option<TristateBitArray>) -> Self {
        let decode = TristateBitArray::new(spec.num_bits());
        let flags = match fixed_flags {
            Some(f) => {
                assert_eq!(
                    spec.num_flags(),
                    f.len(),
                    "fixed_flags length must match the specification's flag count"
                );
                f
            }
            None => TristateBitArray::new(spec.num_flags()),
        };
        let condition = Condition::new(decode, flags);
        let entries = populate(&condition, spec.rules().iter());
        RuleSet { condition, entries }
    }

    pub fn entries(&self) -> &[RuleSetEntry<'a>] {
        &self.entries
    }

    pub fn num_rules(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Narrows this rule set down to `child_condition` (typically
    /// `self.condition.union(...)` with some bits pinned to a branch's
    /// value). Only entries compatible with the union survive, and each
    /// survivor's effective condition is recomputed against the union.
    pub fn derive(&self, child_condition: Condition) -> RuleSet<'a> {
        let union = self.condition.union(&child_condition);
        let entries = populate(&union, self.entries.iter().map(|e| e.rule));
        RuleSet {
            condition: union,
            entries,
        }
    }

    /// The rule set obtained by dropping this rule set's last entry and
    /// recomputing: used by the if-chain strategy to build the "none of the
    /// rules tried so far matched" else-branch one rule at a time.
    pub fn derive_excluding_last(&self) -> RuleSet<'a> {
        let rules = self.entries[..self.entries.len().saturating_sub(1)]
            .iter()
            .map(|e| e.rule);
        let entries = populate(&self.condition, rules);
        RuleSet {
            condition: self.condition.clone(),
            entries,
        }
    }
}
