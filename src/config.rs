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

//! The tunable knobs that steer `BitfieldAnalyser` and `TreeBuilder`, plus a
//! couple of emitter-only fields the core carries through untouched.
//!
//! The external driver persists this as a flat JSON object. Deriving `serde`
//! with `#[serde(default)]` gets us "missing keys keep their default, unknown
//! keys are ignored" for free rather than needing hand-written merge logic.

use serde::{Deserialize, Serialize};

/// Configuration for bitfield scoring and tree-building heuristics.
///
/// Field names are serialized in `PascalCase` to match the JSON schema the
/// external driver reads and writes (see `spec.md` §6 for the authoritative
/// list of keys and defaults).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    /// Whether the switch strategy may fire at all.
    pub allow_switch: bool,
    /// Whether the sequence (and fallback-sequence) strategies may fire.
    pub allow_sequence: bool,

    /// Emitter-only: whether to insert explicit `return` statements.
    /// Unused by this crate; carried through for the emitter.
    pub insert_returns: bool,
    /// Emitter-only: suppress pretty (human-friendly) formatting.
    pub no_pretty_output: bool,
    /// Emitter-only: never break the output after a rule's code fragment.
    pub no_break_after_rule: bool,

    /// When set, if-chain nodes test the rule's full condition rather than
    /// its effective (subtracted) condition.
    pub no_optimise_if_condition_nodes: bool,

    /// Discount applied to a rule's weight, when scoring a bit, for rules
    /// whose effective condition has any flags defined (they still need a
    /// flag test after the switch).
    pub bit_flag_coef: f64,
    /// Exponent softening the width-mismatch penalty for a single bitfield.
    pub bitfield_length_delta_power: f64,
    /// Exponent softening the width-mismatch penalty for a bitfield set.
    pub bitfield_set_length_delta_power: f64,
    /// Multiplier discouraging (when < 1) choosing a split bitfield set over
    /// a single contiguous bitfield of comparable quality.
    pub bitfield_set_coef: f64,

    /// Minimum number of rules in a rule set before a switch is considered.
    pub min_switch_rules: usize,
    /// Minimum width, in bits, of a switch expression.
    pub min_switch_bits: usize,
    /// Maximum width, in bits, of a single switch expression.
    pub max_switch_bits: usize,
    /// Maximum number of nested switches along any root-to-leaf path.
    pub max_switch_nesting_depth: usize,
    /// Maximum total switch width summed along any root-to-leaf path.
    pub max_total_switch_bits: usize,
    /// Maximum number of disjoint bitfields a switch expression may split
    /// into. `0` disables bitfield sets entirely.
    pub max_switch_splits: usize,

    /// Emit `trace!`/`debug!` diagnostics describing which strategy matched
    /// at each rule set.
    pub verbose: bool,
    /// Emit a `debug!` with the wall-clock time taken to build the tree.
    pub timings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            allow_switch: true,
            allow_sequence: true,
            insert_returns: false,
            no_pretty_output: false,
            no_break_after_rule: true,
            no_optimise_if_condition_nodes: false,
            bit_flag_coef: 1.0,
            bitfield_length_delta_power: 0.5,
            bitfield_set_length_delta_power: 0.5,
            bitfield_set_coef: 1.0,
            min_switch_rules: 4,
            min_switch_bits: 2,
            max_switch_bits: 8,
            max_switch_nesting_depth: 3,
            max_total_switch_bits: 15,
            max_switch_splits: 1,
            verbose: false,
            timings: false,
        }
    }
}

#[cfg(test)]
mod test_config {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let c = Config::default();
        assert!(c.allow_switch);
        assert!(c.allow_sequence);
        assert!(!c.insert_returns);
        assert!(!c.no_pretty_output);
        assert!(!c.no_optimise_if_condition_nodes);
        assert!(c.no_break_after_rule);
        assert_eq!(1.0, c.bit_flag_coef);
        assert_eq!(0.5, c.bitfield_length_delta_power);
        assert_eq!(0.5, c.bitfield_set_length_delta_power);
        assert_eq!(1.0, c.bitfield_set_coef);
        assert_eq!(4, c.min_switch_rules);
        assert_eq!(2, c.min_switch_bits);
        assert_eq!(8, c.max_switch_bits);
        assert_eq!(3, c.max_switch_nesting_depth);
        assert_eq!(15, c.max_total_switch_bits);
        assert_eq!(1, c.max_switch_splits);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let parsed: Config = serde_json::from_str(r#"{"MinSwitchRules": 6}"#).unwrap();
        assert_eq!(6, parsed.min_switch_rules);
        assert_eq!(Config::default().max_switch_bits, parsed.max_switch_bits);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let parsed: Config =
            serde_json::from_str(r#"{"SomeFutureKnob": 42, "AllowSwitch": false}"#).unwrap();
        assert!(!parsed.allow_switch);
    }
}
