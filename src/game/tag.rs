//! Tags and tag filters
//!
//! Every actor carries a 32-bit tag mask. Queries pair a mask with a
//! [`TagFilter`] to decide which actors they see.

use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

/// 32-bit tag bitmask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub u32);

impl Tag {
    pub const NONE: Tag = Tag(0);
    /// Blocks the player
    pub const PLAYER_COLLIDABLE: Tag = Tag(1);
    /// Blocks enemies
    pub const ENEMY_COLLIDABLE: Tag = Tag(2);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Copy with the bits of `other` set
    #[inline]
    pub const fn with(self, other: Tag) -> Tag {
        Tag(self.0 | other.0)
    }

    /// Copy with the bits of `other` cleared
    #[inline]
    pub const fn without(self, other: Tag) -> Tag {
        Tag(self.0 & !other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Test this tag against `mask` using `filter`
    #[inline]
    pub fn matches(self, mask: Tag, filter: TagFilter) -> bool {
        filter.matches(self, mask)
    }
}

impl BitOr for Tag {
    type Output = Tag;
    fn bitor(self, rhs: Tag) -> Tag {
        Tag(self.0 | rhs.0)
    }
}

impl BitAnd for Tag {
    type Output = Tag;
    fn bitand(self, rhs: Tag) -> Tag {
        Tag(self.0 & rhs.0)
    }
}

impl BitXor for Tag {
    type Output = Tag;
    fn bitxor(self, rhs: Tag) -> Tag {
        Tag(self.0 ^ rhs.0)
    }
}

impl Not for Tag {
    type Output = Tag;
    fn not(self) -> Tag {
        Tag(!self.0)
    }
}

/// How a tag is compared against a query mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagFilter {
    /// Everything matches
    #[default]
    NoFiltering,
    /// At least one bit of the mask is set
    One,
    /// Every bit of the mask is set
    All,
    /// No bit of the mask is set
    None,
}

impl TagFilter {
    #[inline]
    pub fn matches(self, tag: Tag, mask: Tag) -> bool {
        match self {
            TagFilter::NoFiltering => true,
            TagFilter::One => tag.0 & mask.0 != 0,
            TagFilter::All => tag.0 & mask.0 == mask.0,
            TagFilter::None => tag.0 & mask.0 == 0,
        }
    }
}

/// A mask plus the filter used to apply it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagQuery {
    pub mask: Tag,
    pub filter: TagFilter,
}

impl TagQuery {
    /// Matches every tag
    pub const ANY: TagQuery = TagQuery { mask: Tag::NONE, filter: TagFilter::NoFiltering };

    pub const fn new(mask: Tag, filter: TagFilter) -> Self {
        Self { mask, filter }
    }

    pub const fn any_of(mask: Tag) -> Self {
        Self::new(mask, TagFilter::One)
    }

    pub const fn all_of(mask: Tag) -> Self {
        Self::new(mask, TagFilter::All)
    }

    pub const fn none_of(mask: Tag) -> Self {
        Self::new(mask, TagFilter::None)
    }

    #[inline]
    pub fn accepts(&self, tag: Tag) -> bool {
        self.filter.matches(tag, self.mask)
    }
}

/// `None` means "no filtering"
#[inline]
pub(crate) fn accepts(query: Option<&TagQuery>, tag: Tag) -> bool {
    query.map_or(true, |q| q.accepts(tag))
}
