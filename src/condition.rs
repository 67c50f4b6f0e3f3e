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

//! A `Condition` pairs a tristate pattern over instruction bits with one over
//! context flags. Everything a rule, a rule-set, or a tree node needs to say
//! about "what has to be true here" is one of these.

use crate::specification::Specification;
use crate::tristate::TristateBitArray;

/// A pattern over `(instruction bits, context flags)`. Empty iff both
/// components are empty. The algebra is componentwise: whatever
/// `TristateBitArray` defines for a single array, `Condition` defines for the
/// pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub decode: TristateBitArray,
    pub flags: TristateBitArray,
}

impl Condition {
    pub fn new(decode: TristateBitArray, flags: TristateBitArray) -> Self {
        Condition { decode, flags }
    }

    /// A condition with nothing defined at all, for a spec with `n_bits`
    /// instruction bits and `n_flags` flag slots.
    pub fn empty(n_bits: usize, n_flags: usize) -> Self {
        Condition {
            decode: TristateBitArray::new(n_bits),
            flags: TristateBitArray::new(n_flags),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decode.is_empty() && self.flags.is_empty()
    }

    pub fn is_compatible(&self, other: &Condition) -> bool {
        self.decode.is_compatible(&other.decode) && self.flags.is_compatible(&other.flags)
    }

    pub fn union(&self, other: &Condition) -> Condition {
        Condition {
            decode: self.decode.union(&other.decode),
            flags: self.flags.union(&other.flags),
        }
    }

    pub fn subtract_intersection(&self, other: &Condition) -> Condition {
        Condition {
            decode: self.decode.subtract_intersection(&other.decode),
            flags: self.flags.subtract_intersection(&other.flags),
        }
    }

    /// Diagnostic rendering: decode bits then flag bits, each in brackets,
    /// using `TristateBitArray`'s own display format for both.
    pub fn to_raw_string(&self) -> String {
        format!("{}[{}]", self.decode, self.flags)
    }

    /// The rendering used as an inline comment in generated code: the decode
    /// bits, a space, then `[f1,!f2,…]` listing the defined flags in index
    /// order (`!` prefixing a zero-valued/negated flag). Either part is
    /// omitted if its tristate array is empty.
    pub fn to_pretty_string(&self, spec: &Specification) -> String {
        let mut parts = Vec::new();
        if !self.decode.is_empty() {
            parts.push(self.decode.to_string());
        }
        if !self.flags.is_empty() {
            let mut items = Vec::new();
            for i in 0..self.flags.len() {
                if self.flags.is_defined(i) {
                    let name = spec.get_flag(i).name();
                    if self.flags.get_value_bit(i) {
                        items.push(name.to_string());
                    } else {
                        items.push(format!("!{name}"));
                    }
                }
            }
            parts.push(format!("[{}]", items.join(",")));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod test_condition {
    use super::*;

    fn decode(n: usize, start: usize, end: usize, v: u64) -> TristateBitArray {
        TristateBitArray::load_bitfield_value(n, start, end, v)
    }

    #[test]
    fn empty_condition_is_empty() {
        let c = Condition::empty(8, 2);
        assert!(c.is_empty());
    }

    #[test]
    fn union_with_self_is_self() {
        let c = Condition::new(decode(8, 0, 3, 0b1010), TristateBitArray::new(2));
        assert_eq!(c, c.union(&c));
    }

    #[test]
    fn subtract_intersection_with_self_is_empty() {
        let c = Condition::new(decode(8, 0, 3, 0b1010), decode(2, 0, 1, 0b01));
        assert!(c.subtract_intersection(&c).is_empty());
    }

    #[test]
    fn is_compatible_is_symmetric() {
        let a = Condition::new(decode(8, 0, 3, 0b1010), TristateBitArray::new(2));
        let b = Condition::new(decode(8, 2, 5, 0b1100), TristateBitArray::new(2));
        assert_eq!(a.is_compatible(&b), b.is_compatible(&a));
    }

    #[test]
    fn raw_string_wraps_both_parts() {
        let c = Condition::new(decode(4, 0, 3, 0b0101), TristateBitArray::new(1));
        assert_eq!("0101[.]", c.to_raw_string());
    }
}
