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

//! The decision tree `TreeBuilder` produces: a small tagged tree the emitter
//! walks to print a decoder function.

use crate::bitfield::Switchable;
use crate::condition::Condition;
use crate::rule::Rule;

/// A node of the decision tree built for a rule set.
///
/// No `Eq`: `Rule::weight` is an `f64`, which only has `PartialEq`.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<'a> {
    /// No rule could ever match here.
    Empty,
    /// Exactly one rule matches unconditionally; emit its code.
    Rule(&'a Rule),
    /// A straight-line run of rule emissions, none of which need a test
    /// against each other (their conditions don't overlap within the
    /// current rule set, or they're flag-only checks to run in order).
    Sequence(Vec<Node<'a>>),
    /// `if cond { if_true } else { if_false }`.
    IfElse {
        cond: Condition,
        if_true: Box<Node<'a>>,
        if_false: Box<Node<'a>>,
    },
    /// A dispatch on the value of a bitfield (or disjoint bitfield set),
    /// one case per possible value, in ascending order.
    Switch { expr: Switchable, cases: Vec<Node<'a>> },
    /// A reference to an earlier sibling case within the same `Switch`,
    /// used to collapse structurally identical subtrees instead of
    /// duplicating them.
    ChildReference(usize),
}

/// Pre-order visitor over a node and every node reachable from it.
pub fn touch<'a, F>(node: &Node<'a>, visitor: &mut F)
where
    F: FnMut(&Node<'a>),
{
    visitor(node);
    match node {
        Node::Sequence(children) => {
            for child in children {
                touch(child, visitor);
            }
        }
        Node::IfElse {
            if_true, if_false, ..
        } => {
            touch(if_true, visitor);
            touch(if_false, visitor);
        }
        Node::Switch { cases, .. } => {
            for case in cases {
                touch(case, visitor);
            }
        }
        Node::Empty | Node::Rule(_) | Node::ChildReference(_) => {}
    }
}

#[cfg(test)]
mod test_node {
    use super::*;
    use crate::condition::Condition;
    use crate::rule::Rule;

    fn rule() -> Rule {
        Rule::new(Condition::empty(4, 1), "emit()", 1.0, 1)
    }

    #[test]
    fn touch_visits_every_node_exactly_once() {
        let r = rule();
        let leaf = Node::Rule(&r);
        let tree = Node::Sequence(vec![leaf.clone(), Node::Empty]);
        let mut count = 0;
        touch(&tree, &mut |_| count += 1);
        assert_eq!(3, count);
    }

    #[test]
    fn touch_recurses_into_if_else_branches() {
        let r = rule();
        let tree = Node::IfElse {
            cond: Condition::empty(4, 1),
            if_true: Box::new(Node::Rule(&r)),
            if_false: Box::new(Node::Empty),
        };
        let mut seen = Vec::new();
        touch(&tree, &mut |n| {
            seen.push(matches!(n, Node::Empty));
        });
        assert_eq!(3, seen.len());
    }

    #[test]
    fn touch_does_not_follow_child_references() {
        let tree = Node::Switch {
            expr: Switchable::Bitfield(crate::bitfield::Bitfield { start: 0, end: 2 }),
            cases: vec![Node::ChildReference(5), Node::Empty],
        };
        let mut count = 0;
        touch(&tree, &mut |_| count += 1);
        assert_eq!(3, count);
    }
}
