use std::cell::Cell;

/// Which child slot a descent step takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Records `edits` structural edits (slot reassignments, rotation steps,
/// color changes) against a tree's modification counter.
pub(crate) fn bump(mods: &Cell<u64>, edits: u64) {
    mods.set(mods.get() + edits);
}
