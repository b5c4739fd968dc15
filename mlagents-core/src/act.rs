use std::fmt::Debug;

/// A set of actions taken by agents.
pub trait Act: Clone + Debug {
    /// Returns the number of actions in the object.
    fn len(&self) -> usize;

    /// Returns `true` if the object holds no actions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
