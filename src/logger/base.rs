/// Log items one by one.
pub trait Logger<T>: Send {
    /// Logs an item.
    fn log(&mut self, item: T);
}
