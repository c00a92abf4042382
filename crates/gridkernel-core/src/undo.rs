//! Grouped undo/redo log and the arena of archived expression trees
//! (spec §4.7, §9 "Undo storage").

use gridkernel_common::{Expr, KernelError, Position, StringPool};

/// Handle into the [`UndoArena`]. Stable for the lifetime of the archived
/// entry; log entries carry this instead of a pointer, keeping every log
/// entry small regardless of the archived expression's size (spec §9).
pub type ArenaHandle = u32;

/// An expression plus its string pool, displaced from the cell store by an
/// overwriting `insert` or a `delete`, kept alive until undo re-installs it
/// or the slot is otherwise dropped.
pub(crate) struct ArchivedCell {
    pub(crate) expr: Box<dyn Expr>,
    pub(crate) pool: Box<dyn StringPool>,
}

#[derive(Default)]
pub(crate) struct UndoArena {
    slots: Vec<Option<ArchivedCell>>,
    free: Vec<ArenaHandle>,
}

impl UndoArena {
    pub(crate) fn try_reserve_one(&mut self) -> Result<(), KernelError> {
        if !self.free.is_empty() {
            return Ok(());
        }
        self.slots.try_reserve(1).map_err(|_| KernelError::OutOfMemory)
    }

    pub(crate) fn archive(&mut self, cell: ArchivedCell) -> ArenaHandle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle as usize] = Some(cell);
            handle
        } else {
            self.slots.push(Some(cell));
            (self.slots.len() - 1) as ArenaHandle
        }
    }

    /// Remove and return the archived cell at `handle`, freeing the slot for
    /// reuse ("drop the arena slot", spec §4.7 `set_cell` inversion).
    pub(crate) fn take(&mut self, handle: ArenaHandle) -> ArchivedCell {
        let cell = self.slots[handle as usize].take().expect("stale arena handle");
        self.free.push(handle);
        cell
    }
}

/// Tagged union over the four reversible mutations the kernel can make
/// (spec §3 "Undo entry").
#[derive(Debug, Clone, Copy)]
pub(crate) enum UndoEntry {
    SetCell { pos: Position, handle: ArenaHandle },
    DeleteCell { pos: Position },
    SetColumnWidth { col: u16, old: u16 },
    SetColumnPrecision { col: u16, old: u8 },
}

/// Which log a mutation's inverse is appended to. Ordinary front-end calls
/// target `Undo`; replaying an entry during `undo()`/`redo()` targets the
/// opposite log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogSide {
    Undo,
    Redo,
}

/// Two parallel append-only logs (spec §4.7). Each entry carries its own
/// "is this the last entry of a user action" marker rather than a separate
/// index-keyed map, which is equivalent to spec §3's "map from log index to
/// marker" for a log that is only ever appended to or truncated from the
/// end.
#[derive(Default)]
pub(crate) struct UndoRedoLog {
    undo: Vec<(UndoEntry, bool)>,
    redo: Vec<(UndoEntry, bool)>,
    pub(crate) arena: UndoArena,
}

impl UndoRedoLog {
    pub(crate) fn try_reserve_one(&mut self, side: LogSide) -> Result<(), KernelError> {
        let log = match side {
            LogSide::Undo => &mut self.undo,
            LogSide::Redo => &mut self.redo,
        };
        log.try_reserve(1).map_err(|_| KernelError::OutOfMemory)
    }

    /// Append `entry` to `side`. Per spec, pushing to the undo log with
    /// `clear_redos` frees the redo log — any branch of "what could have
    /// been redone" is invalidated by a genuinely new action.
    pub(crate) fn push(&mut self, entry: UndoEntry, side: LogSide, clear_redos: bool) {
        match side {
            LogSide::Undo => {
                self.undo.push((entry, false));
                if clear_redos {
                    self.redo.clear();
                }
            }
            LogSide::Redo => {
                self.redo.push((entry, false));
            }
        }
    }

    /// Mark the last undo entry as a group terminator. Idempotent, and a
    /// no-op on an empty log.
    pub(crate) fn end_group(&mut self) {
        if let Some(last) = self.undo.last_mut() {
            last.1 = true;
        }
    }

    pub(crate) fn undo_is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub(crate) fn redo_is_empty(&self) -> bool {
        self.redo.is_empty()
    }

    /// Clear the terminal undo-group marker, then drain entries off the top
    /// of the undo log back to (but excluding) the previous group boundary,
    /// in the order they should be replayed (top of the stack first, i.e.
    /// most-recently-pushed first). Returns an empty vec if the undo log is
    /// empty, matching the no-op case in spec §4.7.
    pub(crate) fn begin_undo(&mut self) -> Vec<UndoEntry> {
        if self.undo.is_empty() {
            return Vec::new();
        }
        if let Some(last) = self.undo.last_mut() {
            last.1 = false;
        }
        let mut drained = Vec::new();
        while let Some(&(_, is_end)) = self.undo.last() {
            if is_end {
                break;
            }
            let (entry, _) = self.undo.pop().unwrap();
            drained.push(entry);
        }
        drained
    }

    /// Terminate the redo log with a marker once a `begin_undo` group has
    /// been fully replayed.
    pub(crate) fn finish_undo(&mut self) {
        if let Some(last) = self.redo.last_mut() {
            last.1 = true;
        }
    }

    /// Symmetric counterpart of [`UndoRedoLog::begin_undo`] for `redo()`.
    pub(crate) fn begin_redo(&mut self) -> Vec<UndoEntry> {
        if self.redo.is_empty() {
            return Vec::new();
        }
        if let Some(last) = self.redo.last_mut() {
            last.1 = false;
        }
        let mut drained = Vec::new();
        while let Some(&(_, is_end)) = self.redo.last() {
            if is_end {
                break;
            }
            let (entry, _) = self.redo.pop().unwrap();
            drained.push(entry);
        }
        drained
    }

    pub(crate) fn finish_redo(&mut self) {
        if let Some(last) = self.undo.last_mut() {
            last.1 = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkernel_common::ErrorKind;

    #[derive(Debug)]
    struct NullExpr;
    impl Expr for NullExpr {
        fn referenced_ranges(&self) -> Vec<gridkernel_common::Range> {
            Vec::new()
        }
        fn evaluate(
            &self,
            _ctx: &mut dyn gridkernel_common::Resolver,
            _pool: &dyn StringPool,
        ) -> Result<gridkernel_common::CellValue, ErrorKind> {
            Ok(gridkernel_common::CellValue::Number(0.0))
        }
        fn print(&self, out: &mut dyn std::fmt::Write, _pool: &dyn StringPool) -> std::fmt::Result {
            out.write_str("0")
        }
    }

    struct NullPool;
    impl StringPool for NullPool {
        fn get(&self, _handle: gridkernel_common::StringHandle) -> &str {
            ""
        }
    }

    #[test]
    fn arena_handles_are_reused_after_take() {
        let mut arena = UndoArena::default();
        let h1 = arena.archive(ArchivedCell { expr: Box::new(NullExpr), pool: Box::new(NullPool) });
        arena.take(h1);
        let h2 = arena.archive(ArchivedCell { expr: Box::new(NullExpr), pool: Box::new(NullPool) });
        assert_eq!(h1, h2);
    }

    #[test]
    fn begin_undo_on_empty_log_is_noop() {
        let mut log = UndoRedoLog::default();
        assert!(log.begin_undo().is_empty());
    }

    #[test]
    fn group_replay_stops_at_previous_boundary() {
        let mut log = UndoRedoLog::default();
        log.push(UndoEntry::DeleteCell { pos: Position::new(0, 0) }, LogSide::Undo, true);
        log.end_group();
        log.push(UndoEntry::DeleteCell { pos: Position::new(1, 0) }, LogSide::Undo, true);
        log.push(UndoEntry::DeleteCell { pos: Position::new(2, 0) }, LogSide::Undo, true);
        log.end_group();

        let drained = log.begin_undo();
        assert_eq!(drained.len(), 2);
        log.finish_undo();
        assert!(!log.undo_is_empty());
        assert!(!log.redo_is_empty());
    }

    #[test]
    fn undo_then_redo_drains_symmetrically() {
        let mut log = UndoRedoLog::default();
        log.push(UndoEntry::DeleteCell { pos: Position::new(0, 0) }, LogSide::Undo, true);
        log.end_group();

        let drained = log.begin_undo();
        assert_eq!(drained.len(), 1);
        for entry in drained {
            log.push(entry, LogSide::Redo, false);
        }
        log.finish_undo();
        assert!(log.undo_is_empty());
        assert!(!log.redo_is_empty());

        let replay = log.begin_redo();
        assert_eq!(replay.len(), 1);
        for entry in replay {
            log.push(entry, LogSide::Undo, false);
        }
        log.finish_redo();
        assert!(!log.undo_is_empty());
        assert!(log.redo_is_empty());
    }
}
