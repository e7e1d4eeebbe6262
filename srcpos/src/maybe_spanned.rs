use crate::{Position, Spanned};
use std::ops::Deref;

#[derive(Debug)]
pub enum MaybeSpanned<T> {
    WithoutSpan(T),
    WithSpan(Spanned<T>),
}

impl<T> MaybeSpanned<T> {
    pub fn pos(&self) -> Option<Position> {
        match self {
            MaybeSpanned::WithoutSpan(_) => None,
            MaybeSpanned::WithSpan(spanned) => Some(spanned.pos),
        }
    }
}

impl<T> Deref for MaybeSpanned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            MaybeSpanned::WithoutSpan(data) => data,
            MaybeSpanned::WithSpan(spanned) => &spanned.data,
        }
    }
}
