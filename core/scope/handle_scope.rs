// Copyright 2018-2025 the Deno authors. MIT license.

use super::slot::HandleSlot;
use super::slot::Local;
use super::slot::ScopeId;
use crate::error::InvalidState;
use crate::value::Value;
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
  Handle,
  /// May promote one handle into its parent before closing.
  Escapable,
}

impl fmt::Display for ScopeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ScopeKind::Handle => f.write_str("handle"),
      ScopeKind::Escapable => f.write_str("escapable"),
    }
  }
}

#[derive(Debug, Default)]
struct EscapeState {
  escape_count: u32,
  escaped_slot: Option<Local>,
}

/// One frame of the [`ScopeStack`](super::ScopeStack): an arena of slots
/// released together when the scope closes.
///
/// Slots keep their creation order. Escaping a slot leaves a tombstone behind
/// so the indices of the remaining handles don't move.
pub struct HandleScope {
  id: ScopeId,
  parent: Option<ScopeId>,
  kind: ScopeKind,
  slots: SmallVec<[Option<HandleSlot>; 8]>,
  live: usize,
  escape: EscapeState,
  closed: bool,
}

impl HandleScope {
  pub(crate) fn new(
    id: ScopeId,
    parent: Option<ScopeId>,
    kind: ScopeKind,
    capacity: usize,
  ) -> Self {
    Self {
      id,
      parent,
      kind,
      slots: SmallVec::with_capacity(capacity),
      live: 0,
      escape: EscapeState::default(),
      closed: false,
    }
  }

  pub fn id(&self) -> ScopeId {
    self.id
  }

  pub fn parent(&self) -> Option<ScopeId> {
    self.parent
  }

  pub fn kind(&self) -> ScopeKind {
    self.kind
  }

  pub fn is_escapable(&self) -> bool {
    self.kind == ScopeKind::Escapable
  }

  pub fn is_closed(&self) -> bool {
    self.closed
  }

  /// Number of slots this scope still owns.
  pub fn len(&self) -> usize {
    self.live
  }

  pub fn is_empty(&self) -> bool {
    self.live == 0
  }

  pub fn escape_count(&self) -> u32 {
    self.escape.escape_count
  }

  /// The handle, now owned by the parent, that escaped from this scope.
  pub fn escaped_slot(&self) -> Option<Local> {
    self.escape.escaped_slot
  }

  pub(crate) fn push_slot(&mut self, value: Value) -> Local {
    debug_assert!(!self.closed, "push into closed scope {}", self.id);
    self.adopt(HandleSlot::new(value, self.id))
  }

  /// Takes ownership of a slot escaped from a child scope.
  pub(crate) fn adopt(&mut self, mut slot: HandleSlot) -> Local {
    slot.transfer_to(self.id);
    let local = Local::new(self.id, self.slots.len());
    self.slots.push(Some(slot));
    self.live += 1;
    local
  }

  pub(crate) fn slot(&self, local: Local) -> Result<&HandleSlot, InvalidState> {
    if local.scope() != self.id {
      return Err(InvalidState::ForeignHandle {
        scope: self.id,
        owner: local.scope(),
      });
    }
    match self.slots.get(local.index()) {
      Some(Some(slot)) => {
        debug_assert_eq!(slot.owning_scope(), self.id);
        Ok(slot)
      }
      _ => Err(InvalidState::StaleHandle(self.id)),
    }
  }

  /// Checks everything `escape` needs so a rejected escape never mutates.
  pub(crate) fn check_escape(&self, local: Local) -> Result<(), InvalidState> {
    if !self.is_escapable() {
      return Err(InvalidState::NotEscapable(self.id));
    }
    if self.escape.escape_count > 0 {
      return Err(InvalidState::EscapeCalledTwice(self.id));
    }
    self.slot(local)?;
    if self.parent.is_none() {
      return Err(InvalidState::NoParent(self.id));
    }
    Ok(())
  }

  /// Removes a slot, leaving a tombstone at its index.
  pub(crate) fn take_slot(
    &mut self,
    local: Local,
  ) -> Result<HandleSlot, InvalidState> {
    self.slot(local)?;
    let slot = self.slots[local.index()]
      .take()
      .ok_or(InvalidState::StaleHandle(self.id))?;
    self.live -= 1;
    Ok(slot)
  }

  pub(crate) fn record_escape(&mut self, escaped: Local) {
    self.escape.escape_count += 1;
    self.escape.escaped_slot = Some(escaped);
  }

  /// Drops every slot this scope still owns and marks it closed. Returns the
  /// number of released slots.
  pub(crate) fn release(&mut self) -> usize {
    let released = self.live;
    self.slots.clear();
    self.live = 0;
    self.closed = true;
    released
  }
}

impl fmt::Debug for HandleScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HandleScope")
      .field("id", &self.id)
      .field("parent", &self.parent)
      .field("kind", &self.kind)
      .field("live", &self.live)
      .field("escape_count", &self.escape.escape_count)
      .field("closed", &self.closed)
      .finish()
  }
}
