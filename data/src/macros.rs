#[macro_export]
macro_rules! tvec {
    // count helper: transform any expression into 1
    (@one $x:expr) => (1usize);
    ($elem:expr; $n:expr) => ({
        $crate::TVec::from_elem($elem, $n)
    });
    ($($x:expr),*$(,)*) => ({
        let count = 0usize $(+ tvec!(@one $x))*;
        #[allow(unused_mut)]
        let mut vec = $crate::TVec::new();
        if count <= vec.inline_size() {
            $(vec.push($x);)*
            vec
        } else {
            $crate::TVec::from_vec(vec![$($x,)*])
        }
    });
}

/// Builds a [`crate::dict::TensorDict`] from `path => tensor` pairs.
///
/// Values can be anything convertible to a [`crate::tensor::Tensor`],
/// typically ndarray arrays.
#[macro_export]
macro_rules! tdict {
    () => ($crate::dict::TensorDict::default());
    ($($path:expr => $t:expr),+ $(,)*) => ({
        let mut dict = $crate::dict::TensorDict::default();
        $(dict.insert($path, ::std::sync::Arc::new($t.into()));)+
        dict
    });
}
