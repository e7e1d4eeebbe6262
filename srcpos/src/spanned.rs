use crate::{MaybeSpanned, Position};
use serde_derive::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub pos: Position,
    pub data: T,
}

impl<T> Eq for Spanned<T> where T: Eq {}
impl<T> PartialEq for Spanned<T>
where
    T: PartialEq,
{
    /// This only compares the `data`! Two `Spanned`s at different positions
    /// are equal as long as the content is the same.
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T> Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for Spanned<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T> fmt::Display for Spanned<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.data, self.pos)
    }
}

impl<T> Spanned<T> {
    pub fn new(pos: Position, value: T) -> Self {
        Spanned { pos, data: value }
    }

    pub fn map<U, F>(&self, f: F) -> Spanned<U>
    where
        F: FnOnce(&T) -> U,
    {
        Spanned {
            pos: self.pos,
            data: f(&self.data),
        }
    }
}

impl<'b, T: 'b> From<&'b Spanned<T>> for MaybeSpanned<&'b dyn fmt::Display>
where
    T: fmt::Display,
{
    fn from(spanned: &'b Spanned<T>) -> Self {
        MaybeSpanned::WithSpan(Spanned {
            pos: spanned.pos,
            data: &spanned.data,
        })
    }
}
