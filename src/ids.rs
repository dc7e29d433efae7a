// Defines an index newtype that can index slices and vectors directly.
macro_rules! impl_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(usize);

        impl $name {
            /// Create a new id from an index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                $name(index)
            }

            /// The index wrapped by the id.
            #[inline]
            pub fn as_usize(&self) -> usize {
                self.0
            }

            /// The ids `0..count` in ascending order.
            pub fn range(count: usize) -> impl Iterator<Item = $name> {
                (0..count).map($name)
            }
        }

        // Shifts an id by the size of the automata copied before it
        impl core::ops::Add<usize> for $name {
            type Output = $name;

            #[inline]
            fn add(self, offset: usize) -> Self::Output {
                $name(self.0 + offset)
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, id: $name) -> &Self::Output {
                &self[id.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, id: $name) -> &Self::Output {
                &self[id.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, id: $name) -> &mut T {
                &mut self[id.0]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_id!(
    StateID,
    "The index of a state within the automaton that owns it."
);
impl_id!(
    GroupID,
    "The index of a group of equivalent states during minimization."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_index_and_shift() {
        let mut labels = vec!["q0", "q1", "q2"];
        let id = StateID::new(1);
        assert_eq!(labels[id], "q1");
        assert_eq!(labels.as_slice()[id + 1], "q2");
        labels[id] = "seen_a";
        assert_eq!(labels, vec!["q0", "seen_a", "q2"]);
        assert_eq!(
            StateID::range(3).map(|id| id.to_string()).collect::<Vec<_>>(),
            vec!["0", "1", "2"]
        );
        assert!(GroupID::new(0) < GroupID::new(1));
    }
}
