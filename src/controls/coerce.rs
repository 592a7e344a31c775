/// Default repair for numeric controls: the declared value when it is present and
/// non-zero, else the minimum when present and non-zero, else zero.
///
/// An explicit zero default is indistinguishable from a missing one here; remote
/// metadata reports both the same way for several primitive inputs.
pub fn coerce_default<T>(value: Option<T>, minval: Option<T>) -> T
where
    T: Copy + Default + PartialEq,
{
    let is_set = |v: &T| *v != T::default();
    value
        .filter(is_set)
        .or_else(|| minval.filter(is_set))
        .unwrap_or_default()
}
