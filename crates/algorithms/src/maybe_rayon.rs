/// Row/column parallelism with a sequential fallback.
///
/// With the `parallel` feature this re-exports rayon's prelude. Without it,
/// `into_par_iter()` is an alias for `into_iter()`, so the same iterator
/// chains (`.map()`, `.flat_map()`, `.collect()`) compile and run on one
/// thread.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
