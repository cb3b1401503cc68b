use sheetdb_common::{ArgKind, LiteralValue};
use smallvec::{SmallVec, smallvec};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ShapeKind {
    Scalar,
    Range,
    /// May arrive as a 2-D array; subject to array-formula fan-out.
    Array,
}

#[derive(Clone, Debug)]
pub struct ArgSchema {
    pub kinds: SmallVec<[ArgKind; 2]>,
    pub required: bool,
    pub by_ref: bool,
    pub shape: ShapeKind,
    pub default: Option<LiteralValue>,
}

impl ArgSchema {
    pub fn any() -> Self {
        Self {
            kinds: smallvec![ArgKind::Any],
            required: true,
            by_ref: false,
            shape: ShapeKind::Scalar,
            default: None,
        }
    }

    /// A range reference that may also be passed as an array literal.
    pub fn range_array() -> Self {
        Self {
            kinds: smallvec![ArgKind::Range],
            required: true,
            by_ref: true,
            shape: ShapeKind::Array,
            default: None,
        }
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.shape == ShapeKind::Array
    }
}
