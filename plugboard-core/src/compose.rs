//! Function composition helpers.
//!
//! Two flavours are provided:
//!
//! - Homogeneous chains of boxed `T -> T` functions: [`pipe`] and [`compose`].
//! - Heterogeneous pairwise combinators [`pipe2`] and [`compose2`], which the
//!   [`pipe!`](crate::pipe) and [`compose!`](crate::compose) macros fold over.
//!
//! For both flavours an empty chain is the identity and a single function is
//! returned as-is.

/// A boxed unary transform.
pub type BoxFn<T> = Box<dyn Fn(T) -> T + Send + Sync + 'static>;

/// Returns its argument unchanged.
pub fn identity<T>(value: T) -> T {
    value
}

/// Combines two functions left to right: `pipe2(f, g)(x) == g(f(x))`.
pub fn pipe2<A, B, C, F, G>(f: F, g: G) -> impl Fn(A) -> C
where
    F: Fn(A) -> B,
    G: Fn(B) -> C,
{
    move |value| g(f(value))
}

/// Combines two functions right to left: `compose2(f, g)(x) == f(g(x))`.
pub fn compose2<A, B, C, F, G>(f: F, g: G) -> impl Fn(A) -> C
where
    F: Fn(B) -> C,
    G: Fn(A) -> B,
{
    move |value| f(g(value))
}

/// Applies `fns` left to right.
///
/// Zero functions yield the identity; exactly one function is returned
/// without being wrapped.
pub fn pipe<T, I>(fns: I) -> BoxFn<T>
where
    T: 'static,
    I: IntoIterator<Item = BoxFn<T>>,
{
    let mut fns = fns.into_iter();
    let Some(first) = fns.next() else {
        return Box::new(identity);
    };
    fns.fold(first, |acc, next| -> BoxFn<T> {
        Box::new(move |value| next(acc(value)))
    })
}

/// Applies `fns` right to left.
///
/// Zero functions yield the identity; exactly one function is returned
/// without being wrapped.
pub fn compose<T, I>(fns: I) -> BoxFn<T>
where
    T: 'static,
    I: IntoIterator<Item = BoxFn<T>>,
{
    let mut fns = fns.into_iter().collect::<Vec<_>>().into_iter().rev();
    let Some(last) = fns.next() else {
        return Box::new(identity);
    };
    fns.fold(last, |acc, outer| -> BoxFn<T> {
        Box::new(move |value| outer(acc(value)))
    })
}

/// Builds a left-to-right chain out of heterogeneous functions.
///
/// # Example
///
/// ```rust,ignore
/// let f = pipe!(|x: i32| x + 1, |x: i32| x.to_string());
/// assert_eq!(f(1), "2");
/// ```
#[macro_export]
macro_rules! pipe {
    () => {
        $crate::identity
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {
        $crate::pipe2($f, $crate::pipe!($($rest),+))
    };
}

/// Builds a right-to-left chain out of heterogeneous functions.
///
/// # Example
///
/// ```rust,ignore
/// let f = compose!(|x: i32| x.to_string(), |x: i32| x + 1);
/// assert_eq!(f(1), "2");
/// ```
#[macro_export]
macro_rules! compose {
    () => {
        $crate::identity
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {
        $crate::compose2($f, $crate::compose!($($rest),+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_one() -> BoxFn<i32> {
        Box::new(|x| x + 1)
    }

    fn double() -> BoxFn<i32> {
        Box::new(|x| x * 2)
    }

    fn sub_three() -> BoxFn<i32> {
        Box::new(|x| x - 3)
    }

    #[test]
    fn test_pipe_applies_left_to_right() {
        let f = pipe([add_one(), double()]);
        assert_eq!(f(3), 8);
    }

    #[test]
    fn test_compose_applies_right_to_left() {
        let f = compose([add_one(), double()]);
        assert_eq!(f(3), 7);
    }

    #[test]
    fn test_empty_chains_are_identity() {
        assert_eq!(pipe::<i32, _>(Vec::new())(5), 5);
        assert_eq!(compose::<i32, _>(Vec::new())(5), 5);
    }

    #[test]
    fn test_single_function_is_returned_unchanged() {
        let f = add_one();
        let addr = &*f as *const (dyn Fn(i32) -> i32 + Send + Sync) as *const u8;
        let piped = pipe([f]);
        let piped_addr = &*piped as *const (dyn Fn(i32) -> i32 + Send + Sync) as *const u8;
        assert_eq!(addr, piped_addr);
        assert_eq!(piped(1), 2);
    }

    #[test]
    fn test_three_function_chains() {
        assert_eq!(pipe([add_one(), double(), sub_three()])(4), 7);
        assert_eq!(compose([add_one(), double(), sub_three()])(4), 3);
    }

    #[test]
    fn test_pairwise_combinators_change_types() {
        let len_plus_one = pipe2(|s: &str| s.len(), |n: usize| n + 1);
        assert_eq!(len_plus_one("abc"), 4);

        let shout = compose2(|s: String| s.to_uppercase(), |n: u8| n.to_string() + "x");
        assert_eq!(shout(7), "7X");
    }

    #[test]
    fn test_macros() {
        assert_eq!(crate::pipe!()(9), 9);
        assert_eq!(crate::compose!()("a"), "a");

        let single = crate::pipe!(|x: i32| x * 10);
        assert_eq!(single(2), 20);

        let piped = crate::pipe!(|x: i32| x + 1, |x: i32| x * 2, |x: i32| x.to_string());
        assert_eq!(piped(3), "8");

        let composed = crate::compose!(|x: i32| x.to_string(), |x: i32| x * 2, |x: i32| x + 1);
        assert_eq!(composed(3), "8");
    }
}
