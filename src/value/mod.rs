//! Value Transforms
//!
//! Composable `Input -> Option<Output>` decoders used to read attributes and
//! text content off document nodes.
//!
//! Malformed input is never an error at this level: a decoder that cannot make
//! sense of its input returns `None` ("undefined"), and it is up to the caller
//! to decide whether the value was mandatory.
//!
//! ```rust,ignore
//! use myth_dae::value::{FLOAT_LIST, ValueTransformExt};
//!
//! let count = FLOAT_LIST.map(|v: Vec<f32>| v.len());
//! assert_eq!(node.content(&count), Some(9));
//! ```

mod decoders;

use std::marker::PhantomData;

pub use decoders::{
    BOOL, BOOL_LIST, BoolDecoder, BoolListDecoder, COLOR, ColorDecoder, FLOAT, FLOAT_LIST,
    FloatDecoder, FloatListDecoder, HEX_BYTES, HexBytesDecoder, INT, INT_LIST, IntDecoder,
    IntListDecoder, MATRIX, MATRIX_LIST, MatrixDecoder, MatrixListDecoder, NAME_LIST,
    NameListDecoder, TEXT, TextDecoder, UINT_LIST, UintListDecoder, VEC3, Vec3Decoder, row_major,
};

/// An optional-result transformation.
pub trait ValueTransform<I: ?Sized, O> {
    fn transform(&self, input: &I) -> Option<O>;
}

impl<I: ?Sized, O, F> ValueTransform<I, O> for F
where
    F: Fn(&I) -> Option<O>,
{
    fn transform(&self, input: &I) -> Option<O> {
        self(input)
    }
}

/// Combinators over [`ValueTransform`].
pub trait ValueTransformExt<I: ?Sized, O>: ValueTransform<I, O> + Sized {
    /// Applies `f` to a defined result.
    fn map<U, F>(self, f: F) -> Map<Self, F, O>
    where
        F: Fn(O) -> U,
    {
        Map {
            inner: self,
            f,
            _marker: PhantomData,
        }
    }

    /// Feeds a defined result into `next`.
    fn then<U, N>(self, next: N) -> Then<Self, N, O>
    where
        N: ValueTransform<O, U>,
    {
        Then {
            first: self,
            next,
            _marker: PhantomData,
        }
    }
}

impl<I: ?Sized, O, T: ValueTransform<I, O>> ValueTransformExt<I, O> for T {}

pub struct Map<T, F, O> {
    inner: T,
    f: F,
    _marker: PhantomData<fn() -> O>,
}

impl<I: ?Sized, O, U, T, F> ValueTransform<I, U> for Map<T, F, O>
where
    T: ValueTransform<I, O>,
    F: Fn(O) -> U,
{
    fn transform(&self, input: &I) -> Option<U> {
        self.inner.transform(input).map(&self.f)
    }
}

pub struct Then<A, B, O> {
    first: A,
    next: B,
    _marker: PhantomData<fn() -> O>,
}

impl<I: ?Sized, O, U, A, B> ValueTransform<I, U> for Then<A, B, O>
where
    A: ValueTransform<I, O>,
    B: ValueTransform<O, U>,
{
    fn transform(&self, input: &I) -> Option<U> {
        self.first
            .transform(input)
            .and_then(|mid| self.next.transform(&mid))
    }
}
