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

//! Scores how well each instruction bit discriminates a rule set, and
//! searches for the best contiguous bitfield (or small union of disjoint
//! ones) to switch upon.

use ordered_float::OrderedFloat;

use crate::bitfield::{Bitfield, BitfieldSet};
use crate::config::Config;
use crate::ruleset::RuleSet;
use crate::tristate::TristateBitArray;

/// Precomputed per-bit statistics for one rule set, plus a search over
/// candidate switch expressions.
pub struct BitfieldAnalyser {
    n_bits: usize,
    bit_quality: Vec<f32>,
    min_significant_bit: Option<usize>,
    max_significant_bit: Option<usize>,
    /// Bits already fixed by the rule set's own condition; the default
    /// exclusion mask for every search, since such a bit can no longer
    /// discriminate between the set's entries.
    committed_decode: TristateBitArray,
}

impl BitfieldAnalyser {
    pub fn new(rule_set: &RuleSet, n_bits: usize, config: &Config) -> Self {
        let mut total = vec![0usize; n_bits];
        let mut total_one = vec![0usize; n_bits];
        let mut score = vec![0f64; n_bits];

        for entry in rule_set.entries() {
            let discount = if entry.effective.flags.is_empty() {
                1.0
            } else {
                config.bit_flag_coef
            };
            let weight = entry.rule.weight * discount;
            for i in 0..n_bits {
                if entry.effective.decode.is_defined(i) {
                    total[i] += 1;
                    if entry.effective.decode.get_value_bit(i) {
                        total_one[i] += 1;
                    }
                    score[i] += weight;
                }
            }
        }

        let total_score: f64 = score.iter().sum();
        let mut bit_quality = vec![0f32; n_bits];
        let mut min_significant_bit = None;
        let mut max_significant_bit = None;

        for i in 0..n_bits {
            if total[i] == 0 || score[i] == 0.0 || total_score == 0.0 {
                continue;
            }
            let balance = 2.0 * (total_one[i].min(total[i] - total_one[i])) as f64 / total[i] as f64;
            let quality = (balance * score[i] / total_score) as f32;
            bit_quality[i] = quality;
            if quality > 0.0 {
                min_significant_bit.get_or_insert(i);
                max_significant_bit = Some(i);
            }
        }

        BitfieldAnalyser {
            n_bits,
            bit_quality,
            min_significant_bit,
            max_significant_bit,
            committed_decode: rule_set.condition.decode.clone(),
        }
    }

    pub fn bit_quality(&self, i: usize) -> f32 {
        self.bit_quality[i]
    }

    pub fn min_significant_bit(&self) -> Option<usize> {
        self.min_significant_bit
    }

    pub fn max_significant_bit(&self) -> Option<usize> {
        self.max_significant_bit
    }

    /// `⌈log2(rule_count)⌉`, the target switch width before the caller's
    /// `[min, max]` clamp is applied.
    pub fn ideal_width(rule_count: usize) -> usize {
        if rule_count <= 1 {
            return 0;
        }
        (rule_count as f64).log2().ceil() as usize
    }

    fn quality_of_range(&self, start: usize, end: usize) -> f32 {
        self.bit_quality[start..=end].iter().sum()
    }

    fn has_zero_quality_bit(&self, start: usize, end: usize) -> bool {
        self.bit_quality[start..=end].iter().any(|&q| q == 0.0)
    }

    fn is_disjoint_from(&self, start: usize, end: usize, exclusion: &TristateBitArray) -> bool {
        (start..=end).all(|i| !exclusion.is_defined(i))
    }

    pub fn bitfield_quality(&self, bf: &Bitfield, ideal: usize, config: &Config) -> f32 {
        let q = self.quality_of_range(bf.start, bf.end);
        let delta = (ideal as i64 - bf.width() as i64).unsigned_abs() as f32;
        q / (1.0 + delta).powf(config.bitfield_length_delta_power as f32)
    }

    pub fn bitfield_set_quality(&self, bs: &BitfieldSet, ideal: usize, config: &Config) -> f32 {
        let q: f32 = bs
            .fields
            .iter()
            .map(|f| self.quality_of_range(f.start, f.end))
            .sum();
        let delta = (ideal as i64 - bs.width() as i64).unsigned_abs() as f32;
        config.bitfield_set_coef as f32 * q / (1.0 + delta).powf(config.bitfield_set_length_delta_power as f32)
    }

    /// The highest-quality contiguous bitfield of width in `[min, max]`,
    /// disjoint from `exclusion` (defaulting to this rule set's own fixed
    /// decode bits). `None` if no candidate qualifies.
    pub fn find_best_bitfield(
        &self,
        min: usize,
        max: usize,
        ideal: usize,
        exclusion: Option<&TristateBitArray>,
        config: &Config,
    ) -> Option<Bitfield> {
        let exclusion = exclusion.unwrap_or(&self.committed_decode);
        let lo = self.min_significant_bit?;
        let hi = self.max_significant_bit?;

        let mut best: Option<(Bitfield, f32)> = None;
        for start in lo..=hi {
            for end in start..=hi {
                let width = end - start + 1;
                if width < min || width > max {
                    continue;
                }
                if !self.is_disjoint_from(start, end, exclusion) {
                    continue;
                }
                if self.has_zero_quality_bit(start, end) {
                    continue;
                }
                let candidate = Bitfield { start, end };
                let quality = self.bitfield_quality(&candidate, ideal, config);
                if best.as_ref().map_or(true, |(_, q)| quality > *q) {
                    best = Some((candidate, quality));
                }
            }
        }
        best.map(|(bf, _)| bf)
    }

    fn best_field_of_width(
        &self,
        width: usize,
        exclusion: &TristateBitArray,
    ) -> Option<(Bitfield, f32)> {
        let lo = self.min_significant_bit?;
        let hi = self.max_significant_bit?;
        if width == 0 || width > hi - lo + 1 {
            return None;
        }
        let mut best: Option<(Bitfield, f32)> = None;
        for start in lo..=(hi + 1 - width) {
            let end = start + width - 1;
            if !self.is_disjoint_from(start, end, exclusion) {
                continue;
            }
            if self.has_zero_quality_bit(start, end) {
                continue;
            }
            let quality = self.quality_of_range(start, end);
            if best.as_ref().map_or(true, |(_, q)| quality > *q) {
                best = Some((Bitfield { start, end }, quality));
            }
        }
        best
    }

    fn exclude_field(&self, exclusion: &TristateBitArray, field: &Bitfield) -> TristateBitArray {
        exclusion.union(&field.get_bits_for_value(self.n_bits, 0))
    }

    /// Picks `k` disjoint fields within a combined width budget, recursing
    /// on the last `k - 1` fields for each candidate width of the current
    /// one and keeping the combination with the highest raw (unshaped)
    /// summed bit quality.
    fn best_k_fields(
        &self,
        k: usize,
        budget: usize,
        exclusion: &TristateBitArray,
    ) -> Option<(Vec<Bitfield>, f32)> {
        if k == 0 {
            return Some((Vec::new(), 0.0));
        }
        if budget < k {
            return None;
        }

        let mut best: Option<(Vec<Bitfield>, f32)> = None;
        let max_width_here = budget - (k - 1);
        for width in 1..=max_width_here {
            let Some((rest_fields, rest_q)) = self.best_k_fields(k - 1, budget - width, exclusion)
            else {
                continue;
            };
            let mut combined_exclusion = exclusion.clone();
            for f in &rest_fields {
                combined_exclusion = self.exclude_field(&combined_exclusion, f);
            }
            let Some((field, field_q)) = self.best_field_of_width(width, &combined_exclusion)
            else {
                continue;
            };
            let mut fields = rest_fields;
            fields.push(field);
            fields.sort_by_key(|f| f.start);
            let total_q = rest_q + field_q;
            if best.as_ref().map_or(true, |(_, q)| total_q > *q) {
                best = Some((fields, total_q));
            }
        }
        best
    }

    /// The highest-quality combination of 2 to `Config.MaxSwitchSplits + 1`
    /// disjoint bitfields whose total width lies in `[min, max]`. `None` if
    /// `Config.MaxSwitchSplits == 0` or no combination qualifies.
    pub fn find_best_bitfield_set(
        &self,
        min: usize,
        max: usize,
        ideal: usize,
        config: &Config,
    ) -> Option<BitfieldSet> {
        if config.max_switch_splits == 0 {
            return None;
        }

        let mut best: Option<(BitfieldSet, f32)> = None;
        for k in 2..=(config.max_switch_splits + 1) {
            let Some((fields, _raw_q)) = self.best_k_fields(k, max, &self.committed_decode) else {
                continue;
            };
            let width: usize = fields.iter().map(Bitfield::width).sum();
            if width < min || width > max {
                continue;
            }
            let candidate = BitfieldSet { fields };
            let quality = self.bitfield_set_quality(&candidate, ideal, config);
            if best
                .as_ref()
                .map_or(true, |(_, q)| OrderedFloat(quality) > OrderedFloat(*q))
            {
                best = Some((candidate, quality));
            }
        }
        best.map(|(bs, _)| bs)
    }
}
