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

//! # decgen
//!
//! `decgen` builds a decision tree for a binary-pattern instruction decoder.
//! Given a [`Specification`](specification::Specification) — an instruction
//! width, a table of context flags, and an ordered list of bit-pattern
//! rules, each with a code fragment to emit on match — [`build_tree`]
//! produces a [`Node`] tree of nested conditionals, switches, sequences and
//! rules that dispatches an instruction word (plus flag set) to the first
//! matching rule.
//!
//! The pipeline, leaves first: the tristate bit algebra
//! ([`TristateBitArray`](tristate::TristateBitArray),
//! [`Condition`](condition::Condition)) underlies the rule-set narrowing
//! ([`RuleSet`](ruleset::RuleSet)), which
//! [`BitfieldAnalyser`](analyser::BitfieldAnalyser) scores bit-by-bit to
//! find good switch expressions ([`Bitfield`](bitfield::Bitfield),
//! [`BitfieldSet`](bitfield::BitfieldSet)), which the tree builder uses
//! while trying its cascade of strategies.
//!
//! ## Quick example
//!
//! ```
//! use decgen::config::Config;
//! use decgen::condition::Condition;
//! use decgen::rule::Rule;
//! use decgen::specification::Specification;
//! use decgen::{build_tree, Node};
//!
//! let config = Config::default();
//! let mut spec = Specification::new(4, &config);
//! spec.add_rule(Rule::new(Condition::empty(4, 1), "emit_nop()", 1.0, 1));
//!
//! let tree = build_tree(&spec, None);
//! assert!(matches!(tree, Node::Rule(_)));
//! ```
//!
//! Parsing the textual specification grammar, loading/saving [`Config`] as
//! JSON, emitting target-language source from the tree, and reachability
//! reporting are all external collaborators; this crate only builds the
//! tree.

pub mod analyser;
pub mod bitfield;
pub mod condition;
pub mod config;
pub mod flag;
pub mod node;
pub mod rule;
pub mod ruleset;
pub mod specification;
pub mod tristate;

mod builder;

pub use builder::build_tree;
pub use config::Config;
pub use node::{touch, Node};
