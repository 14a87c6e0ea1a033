/// What a component did with a key event.
///
/// `T` is the event the parent view or App acts on, e.g. a submitted
/// command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, and the parent should act on this
  Event(T),
  /// Not consumed; the parent tries its own bindings
  NotHandled,
}
