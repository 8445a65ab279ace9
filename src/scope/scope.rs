use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

use thiserror::Error;
use tracing::trace;

use crate::ast::types::Type;

/// One lexical scope.
pub type Frame<T> = HashMap<String, T>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
    #[error("{0} is already declared in this frame")]
    DuplicateDeclaration(String),
    #[error("{0} is not declared")]
    UndefinedName(String),
}

/// What the type checker records about a declared name.
///
/// `ty` is `None` when the declaration's initializer failed to type check;
/// uses of such a name stay silent instead of cascading further errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Declaration {
    pub is_const: bool,
    pub ty: Option<Type>,
}

/// Ordered chain of frames used for name resolution.
///
/// The last frame in `frames` is the innermost one. The same structure backs
/// the type checker (declarations), the evaluator (runtime values) and the
/// code generator (storage slots); each pass owns its own instance.
#[derive(Debug, Clone)]
pub struct ScopeChain<T> {
    frames: Vec<Frame<T>>,
}

impl<T> Default for ScopeChain<T> {
    fn default() -> Self {
        ScopeChain::new()
    }
}

impl<T> ScopeChain<T> {
    /// Creates a chain holding a single, outermost frame.
    pub fn new() -> Self {
        ScopeChain {
            frames: vec![HashMap::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
        trace!(depth = self.frames.len(), "push frame");
    }

    pub fn pop_frame(&mut self) -> Option<Frame<T>> {
        let frame = self.frames.pop();
        trace!(depth = self.frames.len(), "pop frame");
        frame
    }

    /// Pushes a frame that is popped again when the returned guard drops.
    pub fn enter(&mut self) -> FrameGuard<'_, T> {
        self.push_frame();
        FrameGuard { chain: self }
    }

    /// Declares `name` in the innermost frame only.
    ///
    /// Shadowing a name from an outer frame is allowed; redeclaring it in the
    /// same frame is not.
    pub fn declare(&mut self, name: &str, record: T) -> Result<(), ScopeError> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(ScopeError::UndefinedName(name.to_string()));
        };

        if frame.contains_key(name) {
            return Err(ScopeError::DuplicateDeclaration(name.to_string()));
        }

        frame.insert(name.to_string(), record);
        Ok(())
    }

    /// Resolves `name` searching from the innermost frame outwards.
    pub fn resolve(&self, name: &str) -> Result<&T, ScopeError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .ok_or_else(|| ScopeError::UndefinedName(name.to_string()))
    }

    /// Returns a mutable handle to the slot of the first frame (innermost
    /// outwards) that contains `name`.
    pub fn assign_target(&mut self, name: &str) -> Result<&mut T, ScopeError> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
            .ok_or_else(|| ScopeError::UndefinedName(name.to_string()))
    }

    /// Whether `name` is declared in the innermost frame.
    pub fn declared_in_current_frame(&self, name: &str) -> bool {
        self.frames
            .last()
            .map(|frame| frame.contains_key(name))
            .unwrap_or(false)
    }
}

/// Scoped frame acquisition: dereferences to the chain, pops on drop.
pub struct FrameGuard<'a, T> {
    chain: &'a mut ScopeChain<T>,
}

impl<T> Deref for FrameGuard<'_, T> {
    type Target = ScopeChain<T>;

    fn deref(&self) -> &Self::Target {
        self.chain
    }
}

impl<T> DerefMut for FrameGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.chain
    }
}

impl<T> Drop for FrameGuard<'_, T> {
    fn drop(&mut self) {
        self.chain.pop_frame();
    }
}
