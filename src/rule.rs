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

//! A single pattern rule: a condition, a code fragment to emit when it
//! matches, a weight, and the source line it came from.

use crate::condition::Condition;

/// One rule from a specification. Rules are ordered; that order is the
/// user-specified match priority (first match wins) and this crate never
/// reorders them on its own.
///
/// `weight` is a floating-point value rather than the integer the original
/// grammar's `$<weight>` token implied — widened to match the bit-scoring
/// arithmetic in `BitfieldAnalyser` (see `DESIGN.md`, "Rule weight").
///
/// Reachability marking (used by the external reachability pass) is
/// deliberately **not** a field here: a `Rule` is immutable once built, and
/// that pass keeps its own side table keyed by a rule's position in
/// `Specification::rules`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub condition: Condition,
    pub code: String,
    pub weight: f64,
    pub line: usize,
}

impl Rule {
    /// # Panics
    /// Panics if `weight` is not strictly positive.
    pub fn new(condition: Condition, code: impl Into<String>, weight: f64, line: usize) -> Self {
        assert!(weight > 0.0, "rule weight must be positive");
        Rule {
            condition,
            code: code.into(),
            weight,
            line,
        }
    }
}

#[cfg(test)]
mod test_rule {
    use super::*;

    fn cond(n_bits: usize, n_flags: usize) -> Condition {
        Condition::empty(n_bits, n_flags)
    }

    #[test]
    fn default_weight_is_respected() {
        let r = Rule::new(cond(4, 1), "emit_a()", 1.0, 12);
        assert_eq!(1.0, r.weight);
        assert_eq!(12, r.line);
    }

    #[test]
    #[should_panic]
    fn zero_weight_is_rejected() {
        Rule::new(cond(4, 1), "emit_a()", 0.0, 1);
    }

    #[test]
    fn fractional_weight_is_preserved() {
        let r = Rule::new(cond(4, 1), "emit_b()", 2.5, 3);
        assert_eq!(2.5, r.weight);
    }
}
