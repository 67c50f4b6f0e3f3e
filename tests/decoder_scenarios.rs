//! End-to-end scenarios exercising the full `build_tree` pipeline, mirroring
//! the worked examples used to pin down the strategy cascade's behaviour.

use pretty_assertions::assert_eq;

use decgen::condition::Condition;
use decgen::config::Config;
use decgen::rule::Rule;
use decgen::ruleset::RuleSet;
use decgen::specification::Specification;
use decgen::tristate::TristateBitArray;
use decgen::{build_tree, Node};

fn decode(n: usize, start: usize, end: usize, v: u64) -> TristateBitArray {
    TristateBitArray::load_bitfield_value(n, start, end, v)
}

/// Simulates the tree the way the generated decoder would: descend
/// `IfElse` by testing the condition against a candidate instruction word
/// and flag word, descend `Switch` by extracting the expression's value.
fn simulate<'a>(node: &'a Node<'a>, word: u64, flags: &TristateBitArray, n_bits: usize) -> Option<&'a str> {
    match node {
        Node::Empty => None,
        Node::Rule(r) => Some(&r.code),
        Node::Sequence(items) => items.iter().find_map(|n| simulate(n, word, flags, n_bits)),
        Node::IfElse { cond, if_true, if_false } => {
            let word_bits = TristateBitArray::load_bitfield_value(n_bits, 0, n_bits - 1, word);
            let matches_decode = (0..n_bits).all(|i| !cond.decode.is_defined(i) || cond.decode.get_value_bit(i) == word_bits.get_value_bit(i));
            let matches_flags = (0..flags.len()).all(|i| !cond.flags.is_defined(i) || cond.flags.get_value_bit(i) == flags.get_value_bit(i));
            if matches_decode && matches_flags {
                simulate(if_true, word, flags, n_bits)
            } else {
                simulate(if_false, word, flags, n_bits)
            }
        }
        Node::Switch { expr, cases } => {
            let value = extract(expr_bits(expr), word);
            let mut idx = value as usize;
            loop {
                match &cases[idx] {
                    Node::ChildReference(j) => idx = *j,
                    other => return simulate(other, word, flags, n_bits),
                }
            }
        }
        Node::ChildReference(_) => None,
    }
}

fn expr_bits(expr: &decgen::bitfield::Switchable) -> Vec<(usize, usize)> {
    match expr {
        decgen::bitfield::Switchable::Bitfield(b) => vec![(b.start, b.end)],
        decgen::bitfield::Switchable::BitfieldSet(s) => s.fields.iter().map(|f| (f.start, f.end)).collect(),
    }
}

fn extract(fields: Vec<(usize, usize)>, word: u64) -> u64 {
    let mut value = 0u64;
    let mut shift = 0u32;
    for (start, end) in fields {
        let width = (end - start + 1) as u32;
        let slice = (word >> start) & ((1u64 << width) - 1);
        value |= slice << shift;
        shift += width;
    }
    value
}

#[test]
fn s1_three_rules_sequence_or_if_chain() {
    let config = Config::default();
    let mut spec = Specification::new(4, &config);
    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 3, 0b0000), TristateBitArray::new(1)), "A", 1.0, 1));
    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 3, 0b0001), TristateBitArray::new(1)), "B", 1.0, 2));
    spec.add_rule(Rule::new(Condition::empty(4, 1), "C", 1.0, 3));

    let tree = build_tree(&spec, None);
    let flags = TristateBitArray::new(1);
    assert_eq!(Some("A"), simulate(&tree, 0b0000, &flags, 4));
    assert_eq!(Some("B"), simulate(&tree, 0b0001, &flags, 4));
    assert_eq!(Some("C"), simulate(&tree, 0b1111, &flags, 4));
}

#[test]
fn s2_dense_table_becomes_switch_and_every_value_resolves() {
    let config = Config::default();
    let mut spec = Specification::new(4, &config);
    for v in 0..16u64 {
        spec.add_rule(Rule::new(
            Condition::new(decode(4, 0, 3, v), TristateBitArray::new(1)),
            format!("R{v}"),
            1.0,
            v as usize,
        ));
    }
    let tree = build_tree(&spec, None);
    assert!(matches!(tree, Node::Switch { .. }));
    let flags = TristateBitArray::new(1);
    for v in 0..16u64 {
        assert_eq!(Some(format!("R{v}")), simulate(&tree, v, &flags, 4).map(str::to_string));
    }
}

#[test]
fn s3_inverted_pair_resolves_both_branches() {
    let config = Config::default();
    let mut spec = Specification::new(4, &config);
    spec.add_rule(Rule::new(Condition::new(decode(4, 3, 3, 0), TristateBitArray::new(1)), "A", 1.0, 1));
    spec.add_rule(Rule::new(Condition::new(decode(4, 3, 3, 1), TristateBitArray::new(1)), "B", 1.0, 2));
    let tree = build_tree(&spec, None);
    let flags = TristateBitArray::new(1);
    assert_eq!(Some("A"), simulate(&tree, 0b0000, &flags, 4));
    assert_eq!(Some("B"), simulate(&tree, 0b1000, &flags, 4));
}

#[test]
fn s4_shared_required_flag_lifts_into_an_if_else() {
    let config = Config::default();
    let mut spec = Specification::new(4, &config);
    let f1 = spec.add_flag("f1");
    let mut flag_true = TristateBitArray::new(1);
    flag_true.set_bit(f1, true);
    let mut flag_false = TristateBitArray::new(1);
    flag_false.set_bit(f1, false);

    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 3, 0b0000), flag_true.clone()), "A", 1.0, 1));
    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 3, 0b0001), flag_true.clone()), "B", 1.0, 2));

    let tree = build_tree(&spec, None);
    assert!(matches!(tree, Node::IfElse { .. }));
    assert_eq!(Some("A"), simulate(&tree, 0b0000, &flag_true, 4));
    assert_eq!(Some("B"), simulate(&tree, 0b0001, &flag_true, 4));
    assert_eq!(None, simulate(&tree, 0b0000, &flag_false, 4));
    assert_eq!(None, simulate(&tree, 0b0010, &flag_true, 4));
}

#[test]
fn s5_dense_two_field_table_becomes_a_bitfield_set_switch() {
    let config = Config::default();
    let mut spec = Specification::new(8, &config);
    for hi in 0..4u64 {
        for lo in 0..4u64 {
            let bits = decode(8, 0, 1, lo).union(&decode(8, 4, 5, hi));
            spec.add_rule(Rule::new(
                Condition::new(bits, TristateBitArray::new(1)),
                format!("R{hi}_{lo}"),
                1.0,
                (hi * 4 + lo) as usize,
            ));
        }
    }

    let tree = build_tree(&spec, None);
    match &tree {
        Node::Switch { expr, cases } => {
            assert!(matches!(expr, decgen::bitfield::Switchable::BitfieldSet(_)));
            assert_eq!(4, expr.num_bits());
            assert_eq!(16, cases.len());
        }
        other => panic!("expected a BitfieldSet switch, got {other:?}"),
    }

    let flags = TristateBitArray::new(1);
    for hi in 0..4u64 {
        for lo in 0..4u64 {
            let word = (hi << 4) | lo;
            assert_eq!(Some(format!("R{hi}_{lo}")), simulate(&tree, word, &flags, 8).map(str::to_string));
        }
    }
}

#[test]
fn s6_same_decode_different_flags_resolves_both() {
    let config = Config::default();
    let mut spec = Specification::new(4, &config);
    let f1 = spec.add_flag("f1");
    let mut flag_true = TristateBitArray::new(1);
    flag_true.set_bit(f1, true);
    let mut flag_false = TristateBitArray::new(1);
    flag_false.set_bit(f1, false);

    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 3, 0), flag_true.clone()), "A", 1.0, 1));
    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 3, 0), flag_false.clone()), "B", 1.0, 2));

    let tree = build_tree(&spec, None);
    assert_eq!(Some("A"), simulate(&tree, 0, &flag_true, 4));
    assert_eq!(Some("B"), simulate(&tree, 0, &flag_false, 4));
}

#[test]
fn building_twice_yields_structurally_equal_trees() {
    let config = Config::default();
    let mut spec = Specification::new(4, &config);
    for v in 0..16u64 {
        spec.add_rule(Rule::new(
            Condition::new(decode(4, 0, 3, v), TristateBitArray::new(1)),
            format!("R{v}"),
            1.0,
            v as usize,
        ));
    }
    let first = build_tree(&spec, None);
    let second = build_tree(&spec, None);
    assert_eq!(first, second);
}

#[test]
fn rule_set_derive_preserves_relative_order_and_last_exact_match() {
    let config = Config::default();
    let mut spec = Specification::new(4, &config);
    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 3, 0b0000), TristateBitArray::new(1)), "A", 1.0, 1));
    spec.add_rule(Rule::new(Condition::new(decode(4, 0, 1, 0b01), TristateBitArray::new(1)), "B", 1.0, 2));
    spec.add_rule(Rule::new(Condition::empty(4, 1), "C", 1.0, 3));

    let root = RuleSet::root(&spec, None);
    // Fixes the upper two bits to 0, leaving every rule's lower-bit
    // constraint (if any) as its effective condition.
    let child = root.derive(Condition::new(decode(4, 2, 3, 0b00), TristateBitArray::new(1)));

    let codes: Vec<&str> = child.entries().iter().map(|e| e.rule.code.as_str()).collect();
    assert_eq!(vec!["A", "B", "C"], codes);
    assert!(!child.entries()[0].effective.is_empty());
    assert!(!child.entries()[1].effective.is_empty());
    assert!(child.entries().last().unwrap().effective.is_empty());
}
