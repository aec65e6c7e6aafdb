/// One replacement in the buffer text: `removed` was at `offset` and
/// `inserted` took its place. Offsets are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub offset: usize,
    pub removed: String,
    pub inserted: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeltaKind {
    Insert,
    Delete,
    Replace,
}

impl Delta {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self { offset, removed: String::new(), inserted: text.into() }
    }

    pub fn delete(offset: usize, removed: impl Into<String>) -> Self {
        Self { offset, removed: removed.into(), inserted: String::new() }
    }

    pub fn replace(offset: usize, removed: impl Into<String>, inserted: impl Into<String>) -> Self {
        Self { offset, removed: removed.into(), inserted: inserted.into() }
    }

    fn kind(&self) -> DeltaKind {
        match (self.removed.is_empty(), self.inserted.is_empty()) {
            (true, _) => DeltaKind::Insert,
            (false, true) => DeltaKind::Delete,
            (false, false) => DeltaKind::Replace,
        }
    }

    pub fn apply(&self, text: &mut String) {
        text.replace_range(self.offset..self.offset + self.removed.len(), &self.inserted);
    }

    pub fn revert(&self, text: &mut String) {
        text.replace_range(self.offset..self.offset + self.inserted.len(), &self.removed);
    }

    // typing forward, backspacing backward, or deleting forward in place
    fn continued_by(&self, next: &Delta) -> bool {
        match (self.kind(), next.kind()) {
            (DeltaKind::Insert, DeltaKind::Insert) => {
                next.offset == self.offset + self.inserted.len()
            }
            (DeltaKind::Delete, DeltaKind::Delete) => {
                next.offset + next.removed.len() == self.offset || next.offset == self.offset
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
struct Group {
    deltas: Vec<Delta>,
    cursor_before: usize,
}

/// Undo stack of delta groups. Groups below `cursor` are applied, the rest
/// can be redone.
#[derive(Debug, Default)]
pub struct UndoHistory {
    groups: Vec<Group>,
    cursor: usize,
    open: bool,
    max_groups: Option<usize>,
}

impl UndoHistory {
    pub fn new(max_groups: Option<usize>) -> Self {
        Self {
            groups: Vec::new(),
            cursor: 0,
            open: false,
            max_groups: max_groups.filter(|&n| n > 0),
        }
    }

    /// Records a delta that has already been applied. `cursor_before` is
    /// where the edit cursor was before it, and is restored by undo.
    pub fn record(&mut self, delta: Delta, cursor_before: usize) {
        if self.cursor < self.groups.len() {
            self.groups.truncate(self.cursor);
            self.open = false;
        }

        let extends_open_group = self.open
            && self
                .groups
                .last()
                .and_then(|group| group.deltas.last())
                .is_some_and(|prev| prev.continued_by(&delta));

        if extends_open_group {
            if let Some(group) = self.groups.last_mut() {
                group.deltas.push(delta);
            }
        } else {
            self.start_group(delta, cursor_before);
        }
        self.open = true;
    }

    fn start_group(&mut self, delta: Delta, cursor_before: usize) {
        self.groups.push(Group { deltas: vec![delta], cursor_before });
        self.cursor += 1;
        if let Some(max) = self.max_groups {
            if self.groups.len() > max {
                self.groups.remove(0);
                self.cursor -= 1;
            }
        }
    }

    pub fn record_group(&mut self, deltas: Vec<Delta>, cursor_before: usize) {
        if deltas.is_empty() {
            return;
        }
        self.separator();
        let mut deltas = deltas.into_iter();
        if let Some(first) = deltas.next() {
            self.record(first, cursor_before);
        }
        if let Some(group) = self.groups.last_mut() {
            group.deltas.extend(deltas);
        }
        self.separator();
    }

    pub fn separator(&mut self) {
        self.open = false;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.groups.len()
    }

    /// Reverts the most recent applied group and returns the cursor it
    /// started from.
    pub fn undo(&mut self, text: &mut String) -> Option<usize> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.open = false;
        let group = &self.groups[self.cursor];
        for delta in group.deltas.iter().rev() {
            delta.revert(text);
        }
        Some(group.cursor_before)
    }

    pub fn redo(&mut self, text: &mut String) -> Option<usize> {
        if !self.can_redo() {
            return None;
        }
        let group = &self.groups[self.cursor];
        for delta in &group.deltas {
            delta.apply(text);
        }
        let restored = group.deltas.last().map(|d| d.offset + d.inserted.len());
        self.cursor += 1;
        self.open = false;
        restored
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.cursor = 0;
        self.open = false;
    }

    #[cfg(test)]
    fn group_count(&self) -> usize {
        self.groups.len()
    }
}
