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

//! A named boolean context input a rule's condition can constrain.

/// A flag declared in a specification. Flags are created at parse time and
/// never mutated or removed afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Flag {
    name: String,
    index: usize,
    is_dummy: bool,
}

impl Flag {
    pub(crate) fn new(name: impl Into<String>, index: usize, is_dummy: bool) -> Self {
        Flag {
            name: name.into(),
            index,
            is_dummy,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The zero-based position of this flag within its specification's flag
    /// table (and within every `Condition::flags` tristate array).
    pub fn index(&self) -> usize {
        self.index
    }

    /// True for the placeholder flag a freshly-created `Specification` is
    /// born with, so that `Condition::flags` never has to be a zero-length
    /// array. The first real `add_flag` call removes it.
    pub fn is_dummy(&self) -> bool {
        self.is_dummy
    }
}
