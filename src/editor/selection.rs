use crate::blocks::document::{block_at, find_block, Place};
use crate::blocks::{Block, BlockId, ChildLocation};

/// Which block the settings panel is bound to.
///
/// The open block is looked up in the document on every read, so the panel
/// always sees the latest copy after a patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Closed,
    TopLevel {
        id: BlockId,
    },
    Child {
        location: ChildLocation,
        id: BlockId,
    },
}

impl Selection {
    /// Selection for whatever block sits at `place`.
    pub fn at(blocks: &[Block], place: Place) -> Self {
        match (block_at(blocks, place), place) {
            (Some(block), Place::TopLevel(_)) => Selection::TopLevel { id: block.id },
            (Some(block), Place::Child(location)) => Selection::Child {
                location,
                id: block.id,
            },
            (None, _) => Selection::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Selection::Closed)
    }

    pub fn open_id(&self) -> Option<BlockId> {
        match *self {
            Selection::Closed => None,
            Selection::TopLevel { id } | Selection::Child { id, .. } => Some(id),
        }
    }

    pub fn child_location(&self) -> Option<ChildLocation> {
        match *self {
            Selection::Child { location, .. } => Some(location),
            _ => None,
        }
    }

    pub fn resolve<'a>(&self, blocks: &'a [Block]) -> Option<&'a Block> {
        match *self {
            Selection::Closed => None,
            Selection::TopLevel { id } => blocks.iter().find(|b| b.id == id),
            Selection::Child { location, id } => block_at(blocks, Place::Child(location))
                .filter(|b| b.id == id)
                .or_else(|| find_block(blocks, id).and_then(|place| block_at(blocks, place))),
        }
    }

    /// Follow the open block to wherever it moved, or close if it is gone.
    pub fn reconcile(&mut self, blocks: &[Block]) {
        let Some(id) = self.open_id() else {
            return;
        };
        *self = match find_block(blocks, id) {
            Some(Place::TopLevel(_)) => Selection::TopLevel { id },
            Some(Place::Child(location)) => Selection::Child { location, id },
            None => Selection::Closed,
        };
    }
}
