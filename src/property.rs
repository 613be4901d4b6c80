/// A settable value that reports whether an assignment actually changed it.
///
/// Owners call [`Property::set`] and run their change hook only when it
/// returns the previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Property<T> {
    value: T,
}

impl<T: PartialEq> Property<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Assign `value`. Returns the old value if it differed, `None` otherwise.
    pub fn set(&mut self, value: T) -> Option<T> {
        if self.value == value {
            return None;
        }
        Some(std::mem::replace(&mut self.value, value))
    }
}

impl<T: Copy> Property<T> {
    pub fn value(&self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let mut p = Property::new(false);
        assert_eq!(p.set(true), Some(false));
        assert!(p.value());
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let mut p = Property::new(String::from("a"));
        assert_eq!(p.set("a".to_string()), None);
        assert_eq!(p.get(), "a");
    }
}
