// Copyright 2018-2025 the Deno authors. MIT license.

use super::handle_scope::HandleScope;
use super::handle_scope::ScopeKind;
use super::slot::Local;
use super::slot::ScopeId;
use crate::error::InvalidState;
use crate::error::ScopeError;
use crate::value::Value;
use log::trace;

pub const DEFAULT_HANDLE_CAPACITY: usize = 8;

/// The stack of open handle scopes for one thread of native execution.
///
/// Scopes nest strictly: only the top frame accepts new handles, escapes or
/// a close. Handles in any open frame can be read.
#[derive(Debug)]
pub struct ScopeStack {
  frames: Vec<HandleScope>,
  next_id: u64,
  handle_capacity: usize,
}

// Handles wrap `Rc`-backed values and the top-of-stack check is the only
// writer discipline; the stack must stay on its thread.
static_assertions::assert_not_impl_any!(ScopeStack: Send, Sync);

impl Default for ScopeStack {
  fn default() -> Self {
    Self::with_handle_capacity(DEFAULT_HANDLE_CAPACITY)
  }
}

impl ScopeStack {
  pub fn new() -> Self {
    Self::default()
  }

  /// `capacity` slots are preallocated for every scope opened on this stack.
  pub fn with_handle_capacity(capacity: usize) -> Self {
    Self {
      frames: Vec::new(),
      next_id: 0,
      handle_capacity: capacity,
    }
  }

  pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
    let id = ScopeId::new(self.next_id);
    self.next_id += 1;
    let parent = self.frames.last().map(HandleScope::id);
    self
      .frames
      .push(HandleScope::new(id, parent, kind, self.handle_capacity));
    trace!("opened {kind} scope {id} (depth {})", self.frames.len());
    id
  }

  pub fn open(&mut self) -> ScopeId {
    self.push(ScopeKind::Handle)
  }

  pub fn open_escapable(&mut self) -> ScopeId {
    self.push(ScopeKind::Escapable)
  }

  /// Closes the top scope, whichever it is.
  pub fn pop(&mut self) -> Result<ScopeId, ScopeError> {
    self.pop_frame().map(|(id, _)| id)
  }

  /// Closes `scope`, which must be the top frame. Returns the number of
  /// handles released.
  pub fn close(&mut self, scope: ScopeId) -> Result<usize, ScopeError> {
    self.top_mut(scope)?;
    self.pop_frame().map(|(_, released)| released)
  }

  pub fn current(&self) -> Result<ScopeId, ScopeError> {
    self
      .frames
      .last()
      .map(HandleScope::id)
      .ok_or(ScopeError::Empty)
  }

  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  pub fn is_open(&self, scope: ScopeId) -> bool {
    self.position(scope).is_some()
  }

  pub fn scope(&self, scope: ScopeId) -> Result<&HandleScope, ScopeError> {
    let index = self.position(scope).ok_or(InvalidState::Closed(scope))?;
    Ok(&self.frames[index])
  }

  pub fn frames(&self) -> impl Iterator<Item = &HandleScope> {
    self.frames.iter()
  }

  pub fn new_handle(
    &mut self,
    scope: ScopeId,
    value: impl Into<Value>,
  ) -> Result<Local, ScopeError> {
    let frame = self.top_mut(scope)?;
    Ok(frame.push_slot(value.into()))
  }

  /// Moves `local` out of `scope` into its parent and returns the handle the
  /// parent now owns. `scope` must be the escapable top frame and may only
  /// escape once.
  pub fn escape(
    &mut self,
    scope: ScopeId,
    local: Local,
  ) -> Result<Local, ScopeError> {
    self.top_mut(scope)?.check_escape(local)?;

    let top_index = self.frames.len() - 1;
    let (below, top) = self.frames.split_at_mut(top_index);
    let child = &mut top[0];
    let parent = below.last_mut().ok_or(InvalidState::NoParent(scope))?;
    debug_assert_eq!(child.parent(), Some(parent.id()));

    let slot = child.take_slot(local)?;
    let escaped = parent.adopt(slot);
    child.record_escape(escaped);
    trace!("escaped handle from scope {scope} into {}", parent.id());
    Ok(escaped)
  }

  pub fn get(&self, local: Local) -> Result<&Value, ScopeError> {
    let frame = self.scope(local.scope())?;
    Ok(frame.slot(local)?.value())
  }

  pub fn handle_count(&self, scope: ScopeId) -> Result<usize, ScopeError> {
    self.scope(scope).map(HandleScope::len)
  }

  /// Handles owned across every open scope.
  pub fn live_handles(&self) -> usize {
    self.frames.iter().map(HandleScope::len).sum()
  }

  fn pop_frame(&mut self) -> Result<(ScopeId, usize), ScopeError> {
    let mut frame = self.frames.pop().ok_or(ScopeError::Underflow)?;
    let released = frame.release();
    trace!(
      "closed {} scope {} releasing {released} handle(s)",
      frame.kind(),
      frame.id()
    );
    Ok((frame.id(), released))
  }

  // Frames are pushed with increasing ids, so the stack is sorted by id.
  fn position(&self, scope: ScopeId) -> Option<usize> {
    self
      .frames
      .binary_search_by_key(&scope, HandleScope::id)
      .ok()
  }

  fn top_mut(
    &mut self,
    scope: ScopeId,
  ) -> Result<&mut HandleScope, InvalidState> {
    let current = match self.frames.last() {
      Some(top) => top.id(),
      None => return Err(InvalidState::Closed(scope)),
    };
    if current != scope {
      return Err(if self.is_open(scope) {
        InvalidState::NotCurrent { scope, current }
      } else {
        InvalidState::Closed(scope)
      });
    }
    self.frames.last_mut().ok_or(InvalidState::Closed(scope))
  }
}
