//! Transactional changes to the forest.

use std::rc::Rc;

use crate::{matching::Matching, piece::Piece, tree::AltTree};

/// Something that lives at the top level of a [`State`](crate::State).
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    /// An alternating tree, with an outer root.
    Tree(Rc<AltTree>),
    /// A finalized matching.
    Match(Rc<Matching>),
}

impl Member {
    /// Is this the same member (not just an equal one) as `other`?
    pub fn same_as(&self, other: &Member) -> bool {
        match (self, other) {
            (Member::Tree(a), Member::Tree(b)) => Rc::ptr_eq(a, b),
            (Member::Match(a), Member::Match(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Rc<AltTree>> for Member {
    fn from(t: Rc<AltTree>) -> Self {
        Member::Tree(t)
    }
}

impl From<AltTree> for Member {
    fn from(t: AltTree) -> Self {
        Member::Tree(Rc::new(t))
    }
}

impl From<Rc<Matching>> for Member {
    fn from(m: Rc<Matching>) -> Self {
        Member::Match(m)
    }
}

impl From<Matching> for Member {
    fn from(m: Matching) -> Self {
        Member::Match(Rc::new(m))
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Member::Tree(t) => t.fmt(f),
            Member::Match(m) => m.fmt(f),
        }
    }
}

/// A change applied to every member that survives an edit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// Grow every tree for this long. Matchings are frozen.
    Grow(f64),
}

impl Transform {
    /// Applies this transform to a single member.
    pub fn apply(&self, member: &Member) -> Member {
        match (self, member) {
            (Transform::Grow(dt), Member::Tree(t)) => Member::Tree(Rc::new(t.after_growing(*dt))),
            (Transform::Grow(_), Member::Match(m)) => Member::Match(Rc::clone(m)),
        }
    }
}

/// A description of how to get from one state to the next.
///
/// Applying an edit removes every member of `removed`, transforms whatever
/// survives, and then appends every member of `added`. Added members are
/// not transformed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Edit {
    removed: Vec<Member>,
    added: Vec<Member>,
    transforms: Vec<Transform>,
}

impl Edit {
    /// An edit that does nothing.
    pub fn new() -> Self {
        Edit::default()
    }

    /// Also removes `member`.
    pub fn remove(mut self, member: impl Into<Member>) -> Self {
        self.removed.push(member.into());
        self
    }

    /// Also adds `member`.
    pub fn add(mut self, member: impl Into<Member>) -> Self {
        self.added.push(member.into());
        self
    }

    /// Also applies `transform`, after all previously-given transforms.
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// The members to remove.
    pub fn removed(&self) -> &[Member] {
        &self.removed
    }

    /// The members to add.
    pub fn added(&self) -> &[Member] {
        &self.added
    }

    /// The transforms to apply to survivors, in order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Does this edit remove `member`?
    pub fn removes(&self, member: &Member) -> bool {
        self.removed.iter().any(|r| r.same_as(member))
    }

    /// All of the transforms, composed in order.
    pub fn full_transformer(&self) -> impl Fn(&Member) -> Member + '_ {
        move |member| {
            self.transforms
                .iter()
                .fold(member.clone(), |m, t| t.apply(&m))
        }
    }
}

impl std::fmt::Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for t in &self.transforms {
            match t {
                Transform::Grow(dt) => writeln!(f, "grow by {dt}")?,
            }
        }
        for m in &self.removed {
            writeln!(f, "remove:")?;
            writeln!(f, "{m}")?;
        }
        for m in &self.added {
            writeln!(f, "add:")?;
            writeln!(f, "{m}")?;
        }
        Ok(())
    }
}
