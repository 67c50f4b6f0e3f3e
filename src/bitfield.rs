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

//! The things a `Switch` node can dispatch on: a single contiguous bitfield,
//! or a handful of disjoint ones treated as one wider switch key.
//!
//! Neither type stores a quality score. `BitfieldAnalyser` computes quality
//! on demand against a particular rule set instead, which is what makes
//! `BitfieldSet`'s derived, pairwise `PartialEq` on `Vec<Bitfield>` correct:
//! there is no stale cached score to ever compare instead of the fields.

use crate::tristate::TristateBitArray;

/// A contiguous, inclusive range of instruction bits `[start, end]`, `start`
/// being the lower (least significant) bound. Width is `end - start + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitfield {
    pub start: usize,
    pub end: usize,
}

impl Bitfield {
    /// # Panics
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "a bitfield's end must not precede its start");
        Bitfield { start, end }
    }

    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether `self` and `other` share any bit position.
    pub fn overlaps(&self, other: &Bitfield) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The tristate array, over `n_bits` instruction bits, that fixes this
    /// field to `value` and leaves every other bit unknown.
    pub fn get_bits_for_value(&self, n_bits: usize, value: u64) -> TristateBitArray {
        TristateBitArray::load_bitfield_value(n_bits, self.start, self.end, value)
    }
}

/// A handful of disjoint bitfields, read together as a single wider switch
/// key: the lowest-indexed field contributes the least significant bits of
/// the combined value.
#[derive(Debug, Clone, PartialEq)]
pub struct BitfieldSet {
    pub fields: Vec<Bitfield>,
}

impl BitfieldSet {
    pub fn width(&self) -> usize {
        self.fields.iter().map(Bitfield::width).sum()
    }

    /// The tristate array, over `n_bits` instruction bits, that fixes every
    /// field in this set to its slice of `value` and leaves everything else
    /// unknown. Fields are read low-to-high in declaration order.
    pub fn get_bits_for_value(&self, n_bits: usize, value: u64) -> TristateBitArray {
        let mut bits = TristateBitArray::new(n_bits);
        let mut shift = 0u32;
        for field in &self.fields {
            let width = field.width() as u32;
            let slice = (value >> shift) & ((1u64 << width) - 1);
            bits = bits.union(&field.get_bits_for_value(n_bits, slice));
            shift += width;
        }
        bits
    }
}

/// The expression a `Switch` node dispatches on.
#[derive(Debug, Clone, PartialEq)]
pub enum Switchable {
    Bitfield(Bitfield),
    BitfieldSet(BitfieldSet),
}

impl Switchable {
    pub fn num_bits(&self) -> usize {
        match self {
            Switchable::Bitfield(b) => b.width(),
            Switchable::BitfieldSet(s) => s.width(),
        }
    }

    pub fn num_values(&self) -> u64 {
        1u64 << self.num_bits()
    }

    pub fn get_bits_for_value(&self, n_bits: usize, value: u64) -> TristateBitArray {
        match self {
            Switchable::Bitfield(b) => b.get_bits_for_value(n_bits, value),
            Switchable::BitfieldSet(s) => s.get_bits_for_value(n_bits, value),
        }
    }
}
