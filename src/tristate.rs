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

//! This module defines `TristateBitArray`, a fixed-length array in which every
//! position independently holds a `0`, a `1`, or is left unconstrained. It is
//! the algebra everything else in this crate (conditions, rules, bitfields) is
//! built on top of.

use std::fmt;

use bit_vec::BitVec;

/// A fixed-length vector of tristate bits, each independently `0`, `1`, or
/// unconstrained.
///
/// Internally this keeps two word-packed bit vectors: `mask` (is the position
/// defined?) and `value` (if defined, what is it?). The invariant
/// `mask & value == value` is maintained by every operation except
/// [`TristateBitArray::set_bit`], which is the one mutator allowed to poke a
/// single position (used while a specification is being parsed; every other
/// operation here is value-semantic and returns a fresh array).
#[derive(Clone, Debug, PartialEq)]
pub struct TristateBitArray {
    len: usize,
    mask: BitVec,
    value: BitVec,
}

impl TristateBitArray {
    /// Creates a new array of `n` positions, all unconstrained.
    ///
    /// # Panics
    /// Panics if `n == 0`; a tristate array always has at least one position
    /// (this is what lets a specification with zero declared flags still get
    /// a one-element dummy flag table, see `Specification`).
    pub fn new(n: usize) -> Self {
        assert!(n >= 1, "TristateBitArray requires at least one position");
        TristateBitArray {
            len: n,
            mask: BitVec::from_elem(n, false),
            value: BitVec::from_elem(n, false),
        }
    }

    /// The number of positions in this array (fixed at construction).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether position `pos` has a known value (as opposed to `.`/unknown).
    #[inline]
    pub fn is_defined(&self, pos: usize) -> bool {
        self.mask.get(pos).expect("position out of range")
    }

    /// The bit value at `pos`. Meaningless (always `false`) if `pos` is not
    /// defined.
    #[inline]
    pub fn get_value_bit(&self, pos: usize) -> bool {
        self.value.get(pos).expect("position out of range")
    }

    /// Alias for [`TristateBitArray::is_defined`], named to mirror the mask
    /// accessor alongside [`TristateBitArray::get_value_bit`].
    #[inline]
    pub fn get_mask_bit(&self, pos: usize) -> bool {
        self.is_defined(pos)
    }

    /// Sets a single position to a known value. This is the one place the
    /// `mask & value == value` invariant is established by direct mutation
    /// rather than by combining two already-consistent arrays; every other
    /// operation on this type is value-semantic.
    pub fn set_bit(&mut self, pos: usize, value: bool) {
        assert!(pos < self.len, "position out of range");
        self.mask.set(pos, true);
        self.value.set(pos, value);
    }

    /// Number of positions that are defined (the popcount of the mask).
    pub fn num_significant_bits(&self) -> usize {
        self.mask.iter().filter(|&b| b).count()
    }

    /// True iff no position is defined.
    pub fn is_empty(&self) -> bool {
        self.num_significant_bits() == 0
    }

    fn assert_same_length(&self, other: &Self) {
        assert_eq!(
            self.len, other.len,
            "tristate bit arrays of different lengths cannot be combined"
        );
    }

    /// Two arrays are compatible when, at every position both define, they
    /// agree on the value.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.assert_same_length(other);
        let mut common = self.mask.clone();
        common.and(&other.mask);
        let mut a = self.value.clone();
        a.and(&common);
        let mut b = other.value.clone();
        b.and(&common);
        a == b
    }

    /// True iff some position is defined by both arrays (regardless of
    /// whether the values agree there).
    pub fn mask_intersects_with(&self, other: &Self) -> bool {
        self.assert_same_length(other);
        let mut common = self.mask.clone();
        common.and(&other.mask);
        common.any()
    }

    /// Union: a position is defined in the result iff it is defined in
    /// either operand. Assumes the operands are compatible; combining
    /// incompatible arrays silently favours `self` at the few positions
    /// where they disagree; callers that cannot guarantee compatibility
    /// should check it first.
    pub fn union(&self, other: &Self) -> Self {
        self.assert_same_length(other);
        debug_assert!(
            self.is_compatible(other),
            "union of incompatible tristate arrays"
        );
        let mut mask = self.mask.clone();
        mask.or(&other.mask);
        let mut value = self.value.clone();
        value.or(&other.value);
        TristateBitArray {
            len: self.len,
            mask,
            value,
        }
    }

    /// Intersection: a position is defined in the result iff both operands
    /// define it (and, implicitly, agree there).
    pub fn intersection(&self, other: &Self) -> Self {
        self.assert_same_length(other);
        let mut mask = self.mask.clone();
        mask.and(&other.mask);
        let mut value = self.value.clone();
        value.and(&mask);
        TristateBitArray {
            len: self.len,
            mask,
            value,
        }
    }

    /// Clears every position that `other` defines.
    pub fn subtract(&self, other: &Self) -> Self {
        self.assert_same_length(other);
        let mut not_other = other.mask.clone();
        not_other.negate();
        let mut mask = self.mask.clone();
        mask.and(&not_other);
        let mut value = self.value.clone();
        value.and(&mask);
        TristateBitArray {
            len: self.len,
            mask,
            value,
        }
    }

    /// `x.subtract(x.intersection(y))` — the portion of `self` not yet
    /// implied by `other`. This is how a rule's effective condition is
    /// derived from its full condition and the ruleset's accumulated one.
    pub fn subtract_intersection(&self, other: &Self) -> Self {
        self.subtract(&self.intersection(other))
    }

    /// Builds a fresh array of length `n` with positions `[start..=end]`
    /// loaded from the low `end - start + 1` bits of `value`.
    ///
    /// # Panics
    /// Panics if the range is out of bounds or wider than 64 bits (`value`'s
    /// width).
    pub fn load_bitfield_value(n: usize, start: usize, end: usize, value: u64) -> Self {
        assert!(start <= end, "bitfield start must not exceed end");
        assert!(end < n, "bitfield end out of range");
        assert!(end - start < 64, "bitfield width must fit in 64 bits");
        let mut arr = TristateBitArray::new(n);
        for k in 0..=(end - start) {
            let bit = (value >> k) & 1 == 1;
            arr.set_bit(start + k, bit);
        }
        arr
    }
}

/// Most-significant bit first, with a space inserted after every fourth bit
/// counting from the LSB, using `'0'`/`'1'`/`'.'` glyphs. This exact format
/// is user-observable: it is how effective conditions show up as comments in
/// generated code.
impl fmt::Display for TristateBitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            if i != self.len - 1 && (i + 1) % 4 == 0 {
                write!(f, " ")?;
            }
            let glyph = if !self.is_defined(i) {
                '.'
            } else if self.get_value_bit(i) {
                '1'
            } else {
                '0'
            };
            write!(f, "{glyph}")?;
        }
        Ok(())
    }
}
