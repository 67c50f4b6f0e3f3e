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

//! Turns a `RuleSet` into a decoder tree by trying a fixed cascade of
//! strategies, each one a local, cheap-to-check optimisation over the
//! generic if-chain every rule set could always fall back to.

use std::time::Instant;

use log::{debug, trace};

use crate::analyser::BitfieldAnalyser;
use crate::bitfield::Switchable;
use crate::condition::Condition;
use crate::node::Node;
use crate::ruleset::{RuleSet, RuleSetEntry};
use crate::specification::Specification;
use crate::tristate::TristateBitArray;

/// Builds the decoder tree for `spec`. A rule-less specification, a
/// zero-width specification, and a `fixed_flags` mask of the wrong width are
/// all programming errors: unrecoverable bugs in the caller, not conditions
/// this crate recovers from. Guarded by `assert!` rather than `Result`, the
/// same way every other invariant in this crate is enforced.
///
/// # Panics
/// Panics if `spec` has zero instruction bits, if `spec` has no rules, or if
/// `fixed_flags` is given and its length does not match `spec.num_flags()`.
pub fn build_tree<'a>(spec: &'a Specification<'a>, fixed_flags: Option<TristateBitArray>) -> Node<'a> {
    assert!(spec.num_bits() > 0, "specification has zero instruction bits");
    assert!(!spec.rules().is_empty(), "specification has no rules");

    let builder = TreeBuilder::new(spec);
    let root_set = RuleSet::root(spec, fixed_flags);

    let start = Instant::now();
    let tree = builder.build_with(&root_set, 0, 0);
    if spec.config().timings {
        debug!("build_tree: {:?} for {} rules", start.elapsed(), spec.rules().len());
    }
    tree
}

fn single_defined_bit(ta: &TristateBitArray) -> Option<usize> {
    let mut found = None;
    for i in 0..ta.len() {
        if ta.is_defined(i) {
            if found.is_some() {
                return None;
            }
            found = Some(i);
        }
    }
    found
}

/// Builds a decoder tree for one specification's rule sets. Holds only a
/// borrow of the `Specification` (and, through it, its `Config`); all actual
/// state lives in the `RuleSet` passed to each call.
pub struct TreeBuilder<'a> {
    spec: &'a Specification<'a>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(spec: &'a Specification<'a>) -> Self {
        TreeBuilder { spec }
    }

    fn config(&self) -> &crate::config::Config {
        self.spec.config()
    }

    /// Tries every strategy in fixed order, returning the first that
    /// applies. The if-chain strategy never fails, so this always returns.
    fn build_with(
        &self,
        rule_set: &RuleSet<'a>,
        switch_nesting_depth: usize,
        total_switch_bits: usize,
    ) -> Node<'a> {
        if rule_set.is_empty() {
            if self.config().verbose {
                trace!("empty rule set at depth {switch_nesting_depth}");
            }
            return Node::Empty;
        }

        if let Some(n) = self.try_fallback_sequence(rule_set, switch_nesting_depth, total_switch_bits) {
            return n;
        }
        if let Some(n) = self.try_lift_flags(rule_set, switch_nesting_depth, total_switch_bits) {
            return n;
        }
        if let Some(n) = self.try_lift_decode(rule_set, switch_nesting_depth, total_switch_bits) {
            return n;
        }
        if let Some(n) = self.try_inverted_pair(rule_set) {
            return n;
        }
        if let Some(n) = self.try_switch(rule_set, switch_nesting_depth, total_switch_bits) {
            return n;
        }
        if let Some(n) = self.try_sequence(rule_set) {
            return n;
        }
        self.build_if_chain(rule_set)
    }

    fn try_fallback_sequence(
        &self,
        rule_set: &RuleSet<'a>,
        switch_nesting_depth: usize,
        total_switch_bits: usize,
    ) -> Option<Node<'a>> {
        if !self.config().allow_sequence || rule_set.num_rules() < 2 {
            return None;
        }
        let entries = rule_set.entries();
        let last = entries.last()?;
        if !last.effective.is_empty() {
            return None;
        }

        let without_last = rule_set.derive_excluding_last();
        let sub = self.build_with(&without_last, switch_nesting_depth, total_switch_bits);
        let mut items = match sub {
            Node::Sequence(items) => items,
            other => vec![other],
        };
        items.push(Node::Rule(last.rule));
        Some(Node::Sequence(items))
    }

    fn try_lift_flags(
        &self,
        rule_set: &RuleSet<'a>,
        switch_nesting_depth: usize,
        total_switch_bits: usize,
    ) -> Option<Node<'a>> {
        let entries = rule_set.entries();
        let first = entries.first()?;
        if first.effective.flags.is_empty() {
            return None;
        }
        if !entries.iter().all(|e| e.effective.flags == first.effective.flags) {
            return None;
        }

        let n_bits = first.effective.decode.len();
        let cond = Condition::new(TristateBitArray::new(n_bits), first.effective.flags.clone());
        let child = rule_set.derive(cond.clone());
        let sub = self.build_with(&child, switch_nesting_depth, total_switch_bits);
        Some(Node::IfElse {
            cond,
            if_true: Box::new(sub),
            if_false: Box::new(Node::Empty),
        })
    }

    fn try_lift_decode(
        &self,
        rule_set: &RuleSet<'a>,
        switch_nesting_depth: usize,
        total_switch_bits: usize,
    ) -> Option<Node<'a>> {
        let entries = rule_set.entries();
        let first = entries.first()?;
        if first.effective.decode.is_empty() {
            return None;
        }
        if !entries.iter().all(|e| e.effective.decode == first.effective.decode) {
            return None;
        }

        let n_flags = first.effective.flags.len();
        let cond = Condition::new(first.effective.decode.clone(), TristateBitArray::new(n_flags));
        let child = rule_set.derive(cond.clone());
        let sub = self.build_with(&child, switch_nesting_depth, total_switch_bits);
        Some(Node::IfElse {
            cond,
            if_true: Box::new(sub),
            if_false: Box::new(Node::Empty),
        })
    }

    fn try_inverted_pair(&self, rule_set: &RuleSet<'a>) -> Option<Node<'a>> {
        let entries = rule_set.entries();
        if entries.len() != 2 {
            return None;
        }
        let (a, b) = (&entries[0], &entries[1]);
        if !a.effective.flags.is_empty() || !b.effective.flags.is_empty() {
            return None;
        }
        let bit_a = single_defined_bit(&a.effective.decode)?;
        let bit_b = single_defined_bit(&b.effective.decode)?;
        if bit_a != bit_b {
            return None;
        }
        Some(Node::IfElse {
            cond: a.effective.clone(),
            if_true: Box::new(Node::Rule(a.rule)),
            if_false: Box::new(Node::Rule(b.rule)),
        })
    }

    fn is_switch_permitted(&self, rule_set: &RuleSet<'a>, switch_nesting_depth: usize) -> bool {
        self.config().allow_switch
            && rule_set.num_rules() >= self.config().min_switch_rules
            && switch_nesting_depth <= self.config().max_switch_nesting_depth
    }

    fn try_switch(
        &self,
        rule_set: &RuleSet<'a>,
        switch_nesting_depth: usize,
        total_switch_bits: usize,
    ) -> Option<Node<'a>> {
        if !self.is_switch_permitted(rule_set, switch_nesting_depth) {
            return None;
        }

        let config = self.config();
        let min = config.min_switch_bits;
        let max_budget = config.max_total_switch_bits.saturating_sub(total_switch_bits);
        let max = config.max_switch_bits.min(max_budget);
        if max < min {
            return None;
        }

        let n_bits = self.spec.num_bits();
        let analyser = BitfieldAnalyser::new(rule_set, n_bits, config);
        let ideal = BitfieldAnalyser::ideal_width(rule_set.num_rules()).clamp(min, max);

        let best_single = analyser.find_best_bitfield(min, max, ideal, None, config);
        let best_set = analyser.find_best_bitfield_set(min, max, ideal, config);

        let expr = match (best_single, best_set) {
            (Some(bf), Some(bs)) => {
                let q_bf = analyser.bitfield_quality(&bf, ideal, config);
                let q_bs = analyser.bitfield_set_quality(&bs, ideal, config);
                if q_bf >= q_bs {
                    Switchable::Bitfield(bf)
                } else {
                    Switchable::BitfieldSet(bs)
                }
            }
            (Some(bf), None) => Switchable::Bitfield(bf),
            (None, Some(bs)) => Switchable::BitfieldSet(bs),
            (None, None) => return None,
        };

        if self.config().verbose {
            trace!("switching on {:?} at depth {}", expr, switch_nesting_depth);
        }

        let width = expr.num_bits();
        let n_flags = rule_set.condition.flags.len();
        let mut cases: Vec<Node<'a>> = Vec::with_capacity(expr.num_values() as usize);
        for v in 0..expr.num_values() {
            let case_cond = Condition::new(expr.get_bits_for_value(n_bits, v), TristateBitArray::new(n_flags));
            let child = rule_set.derive(case_cond);
            let sub = self.build_with(
                &child,
                switch_nesting_depth + 1,
                total_switch_bits + width,
            );
            if let Some(j) = cases.iter().position(|c| *c == sub) {
                cases.push(Node::ChildReference(j));
            } else {
                cases.push(sub);
            }
        }

        Some(Node::Switch { expr, cases })
    }

    fn try_sequence(&self, rule_set: &RuleSet<'a>) -> Option<Node<'a>> {
        if !self.config().allow_sequence || rule_set.num_rules() < 2 {
            return None;
        }
        let items = rule_set
            .entries()
            .iter()
            .map(|e| Node::IfElse {
                cond: e.effective.clone(),
                if_true: Box::new(Node::Rule(e.rule)),
                if_false: Box::new(Node::Empty),
            })
            .collect();
        Some(Node::Sequence(items))
    }

    fn build_if_chain(&self, rule_set: &RuleSet<'a>) -> Node<'a> {
        let mut acc = Node::Empty;
        for entry in rule_set.entries().iter().rev() {
            acc = self.if_chain_link(entry, acc);
        }
        acc
    }

    fn if_chain_link(&self, entry: &RuleSetEntry<'a>, tail: Node<'a>) -> Node<'a> {
        if entry.effective.is_empty() {
            return Node::Rule(entry.rule);
        }
        let cond = if self.config().no_optimise_if_condition_nodes {
            entry.rule.condition.clone()
        } else {
            entry.effective.clone()
        };
        Node::IfElse {
            cond,
            if_true: Box::new(Node::Rule(entry.rule)),
            if_false: Box::new(tail),
        }
    }
}
