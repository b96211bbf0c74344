use crate::language::{expression::Expression, span::Position};
use crate::runtime::{action::Action, value::Variable};
use std::fmt;
use std::rc::Rc;

/// A resolved call: the action template plus this call site's compiled
/// arguments.
#[derive(Clone)]
pub struct Call {
    pub name: String,
    pub template: Rc<dyn Action>,
    pub arguments: Vec<Expression>,
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// One statement of a block. Assignments are calls too, to an assignment
/// template built for that line.
#[derive(Clone, Debug)]
pub struct ActionCall {
    pub call: Call,
    pub block: Option<Block>,
    pub position: Position,
}

impl ActionCall {
    pub fn name(&self) -> &str {
        &self.call.name
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Block {
    pub actions: Vec<ActionCall>,
    pub executed: bool,
    /// First value returned by the most recently executed statement.
    pub last_result: Option<Variable>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of blocks in this tree, this one included.
    pub fn count_blocks(&self) -> usize {
        1 + self
            .actions
            .iter()
            .filter_map(|call| call.block.as_ref())
            .map(Block::count_blocks)
            .sum::<usize>()
    }
}
