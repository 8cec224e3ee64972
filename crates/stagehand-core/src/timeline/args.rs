use std::any::{type_name, Any};
use std::fmt;

/// Positional values handed to an action at creation time.
///
/// Closures are the usual way to give an action state; the bag exists for callbacks that
/// are plain functions shared between several actions. Values are dropped together with
/// the action, after its `Destroy` call.
#[derive(Default)]
pub struct ActionArgs {
    values: Vec<Box<dyn Any>>,
}

impl ActionArgs {
    #[inline]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    pub fn push<T: Any>(&mut self, value: T) -> &mut Self {
        self.values.push(Box::new(value));
        self
    }

    #[inline]
    pub fn with<T: Any>(mut self, value: T) -> Self {
        self.values.push(Box::new(value));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn try_get<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref::<T>()
    }

    pub fn try_get_mut<T: Any>(&mut self, index: usize) -> Option<&mut T> {
        self.values.get_mut(index)?.downcast_mut::<T>()
    }

    /// Panics when `index` is out of range or holds another type.
    #[track_caller]
    pub fn get<T: Any>(&self, index: usize) -> &T {
        let len = self.values.len();
        match self.values.get(index) {
            Some(v) => v
                .downcast_ref::<T>()
                .unwrap_or_else(|| bad_type::<T>(index)),
            None => out_of_range(index, len),
        }
    }

    /// Panics when `index` is out of range or holds another type.
    #[track_caller]
    pub fn get_mut<T: Any>(&mut self, index: usize) -> &mut T {
        let len = self.values.len();
        match self.values.get_mut(index) {
            Some(v) => v
                .downcast_mut::<T>()
                .unwrap_or_else(|| bad_type::<T>(index)),
            None => out_of_range(index, len),
        }
    }
}

impl fmt::Debug for ActionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionArgs")
            .field("len", &self.values.len())
            .finish()
    }
}

#[cold]
#[track_caller]
fn out_of_range(index: usize, len: usize) -> ! {
    panic!("action argument {index} out of range ({len} values)");
}

#[cold]
#[track_caller]
fn bad_type<T>(index: usize) -> ! {
    panic!("action argument {index} is not a {}", type_name::<T>());
}

/// Build an [`ActionArgs`] from a list of values.
///
/// ```
/// let args = stagehand_core::args![3_u32, "label"];
/// assert_eq!(*args.get::<u32>(0), 3);
/// assert_eq!(*args.get::<&str>(1), "label");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::timeline::ActionArgs::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut args = $crate::timeline::ActionArgs::new();
        $( args.push($value); )+
        args
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_retrieved_by_position() {
        let mut args = crate::args![1_i32, String::from("two"), 3.0_f32];
        assert_eq!(args.len(), 3);
        assert_eq!(*args.get::<i32>(0), 1);
        assert_eq!(args.get::<String>(1), "two");

        *args.get_mut::<f32>(2) += 1.0;
        assert_eq!(*args.get::<f32>(2), 4.0);
    }

    #[test]
    fn try_get_reports_mismatches() {
        let args = ActionArgs::new().with(5_u8);
        assert!(args.try_get::<u16>(0).is_none());
        assert!(args.try_get::<u8>(1).is_none());
        assert_eq!(args.try_get::<u8>(0), Some(&5));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let args = crate::args![1_u8];
        let _ = args.get::<u8>(3);
    }

    #[test]
    #[should_panic(expected = "is not a")]
    fn wrong_type_panics() {
        let args = crate::args![1_u8];
        let _ = args.get::<String>(0);
    }
}
