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

//! The top-level input to the tree builder: instruction width, declared
//! flags, and the ordered list of rules, plus the handful of emitter
//! passthrough strings the generated file wraps itself in.

use fxhash::FxHashMap;

use crate::config::Config;
use crate::flag::Flag;
use crate::rule::Rule;

const DUMMY_FLAG_NAME: &str = "__dummy";

/// A decoder specification: instruction width, flags, rules, plus the
/// emitter's boilerplate strings. Borrows its `Config` rather than owning a
/// copy, since the same config is shared by the analyser and the builder.
pub struct Specification<'a> {
    n_bits: usize,
    flags: Vec<Flag>,
    flag_index: FxHashMap<String, usize>,
    rules: Vec<Rule>,

    pub file_start: String,
    pub file_end: String,
    pub enum_start: String,
    pub enum_end: String,
    pub decode_flags_fetch: String,
    pub instruction_fetch: String,
    pub root_indentation: usize,
    pub enum_indentation: usize,

    pub config: &'a Config,
}

impl<'a> Specification<'a> {
    /// # Panics
    /// Panics if `n_bits` is zero.
    pub fn new(n_bits: usize, config: &'a Config) -> Self {
        assert!(n_bits >= 1, "a specification needs at least one bit");
        let dummy = Flag::new(DUMMY_FLAG_NAME, 0, true);
        let mut flag_index = FxHashMap::default();
        flag_index.insert(DUMMY_FLAG_NAME.to_string(), 0);
        Specification {
            n_bits,
            flags: vec![dummy],
            flag_index,
            rules: Vec::new(),
            file_start: String::new(),
            file_end: String::new(),
            enum_start: String::new(),
            enum_end: String::new(),
            decode_flags_fetch: String::new(),
            instruction_fetch: String::new(),
            root_indentation: 0,
            enum_indentation: 0,
            config,
        }
    }

    pub fn num_bits(&self) -> usize {
        self.n_bits
    }

    /// Always at least 1: the dummy flag a fresh specification is born with
    /// is only ever removed, never leaving the table empty.
    pub fn num_flags(&self) -> usize {
        self.flags.len()
    }

    /// Whether any real (non-dummy) flag has been declared.
    pub fn has_flags(&self) -> bool {
        self.flags.iter().any(|f| !f.is_dummy())
    }

    pub fn get_flag(&self, index: usize) -> &Flag {
        &self.flags[index]
    }

    pub fn get_flag_by_name(&self, name: &str) -> Option<&Flag> {
        self.flag_index.get(name).map(|&i| &self.flags[i])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Declares a new flag and returns its index. On the first call, the
    /// placeholder dummy flag is dropped and every stored index shifts down
    /// by one to keep the table contiguous from zero.
    ///
    /// # Panics
    /// Panics if `name` is already declared.
    pub fn add_flag(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        assert!(
            self.get_flag_by_name(&name).is_none(),
            "flag '{name}' already declared"
        );

        if self.flags.len() == 1 && self.flags[0].is_dummy() {
            self.flags.clear();
            self.flag_index.clear();
        }

        let index = self.flags.len();
        self.flags.push(Flag::new(name.clone(), index, false));
        self.flag_index.insert(name, index);
        index
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }
}

#[cfg(test)]
mod test_specification {
    use super::*;
    use crate::condition::Condition;

    fn spec(config: &Config) -> Specification<'_> {
        Specification::new(8, config)
    }

    #[test]
    fn fresh_specification_has_one_dummy_flag() {
        let config = Config::default();
        let s = spec(&config);
        assert_eq!(1, s.num_flags());
        assert!(!s.has_flags());
        assert!(s.get_flag(0).is_dummy());
    }

    #[test]
    fn first_add_flag_clears_the_dummy() {
        let config = Config::default();
        let mut s = spec(&config);
        let i = s.add_flag("carry");
        assert_eq!(0, i);
        assert_eq!(1, s.num_flags());
        assert!(s.has_flags());
        assert_eq!("carry", s.get_flag(0).name());
        assert!(!s.get_flag(0).is_dummy());
    }

    #[test]
    fn subsequent_flags_keep_increasing_indices() {
        let config = Config::default();
        let mut s = spec(&config);
        assert_eq!(0, s.add_flag("carry"));
        assert_eq!(1, s.add_flag("zero"));
        assert_eq!(2, s.num_flags());
        assert_eq!(1, s.get_flag_by_name("zero").unwrap().index());
    }

    #[test]
    #[should_panic]
    fn duplicate_flag_names_are_rejected() {
        let config = Config::default();
        let mut s = spec(&config);
        s.add_flag("carry");
        s.add_flag("carry");
    }

    #[test]
    fn rules_are_kept_in_insertion_order() {
        let config = Config::default();
        let mut s = spec(&config);
        s.add_rule(Rule::new(Condition::empty(8, 1), "a()", 1.0, 1));
        s.add_rule(Rule::new(Condition::empty(8, 1), "b()", 1.0, 2));
        assert_eq!(2, s.rules().len());
        assert_eq!("a()", s.rules()[0].code);
        assert_eq!("b()", s.rules()[1].code);
    }

    #[test]
    #[should_panic]
    fn zero_width_specification_panics() {
        let config = Config::default();
        Specification::new(0, &config);
    }
}
