use std::sync::mpsc;
use std::thread::JoinHandle;

use super::Logger;

enum Message<T> {
    Log(T),
    Sync(mpsc::Sender<()>),
    End,
}

/// Async logger, forwarding items to a wrapped logger on a dedicated thread.
pub struct AsyncLogger<T> {
    sender: mpsc::Sender<Message<T>>,
    handler: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> AsyncLogger<T> {
    /// Create a new async logger.
    pub fn new<L>(mut logger: L) -> Self
    where
        L: Logger<T> + 'static,
    {
        let (sender, receiver) = mpsc::channel();

        let handler = std::thread::spawn(move || {
            for message in receiver.iter() {
                match message {
                    Message::Log(item) => logger.log(item),
                    Message::Sync(callback) => {
                        callback
                            .send(())
                            .expect("Can notify the caller waiting for the sync.");
                    }
                    Message::End => return,
                }
            }
        });

        Self {
            sender,
            handler: Some(handler),
        }
    }

    /// Wait for every previously logged item to reach the wrapped logger.
    pub fn sync(&self) {
        let (sender, receiver) = mpsc::channel();

        self.sender
            .send(Message::Sync(sender))
            .expect("Can send a message to the logger thread.");
        receiver
            .recv()
            .expect("Should sync, otherwise the thread is dead.");
    }
}

impl<T: Send> Logger<T> for AsyncLogger<T> {
    fn log(&mut self, item: T) {
        self.sender
            .send(Message::Log(item))
            .expect("Can send a message to the logger thread.");
    }
}

impl<T> Drop for AsyncLogger<T> {
    fn drop(&mut self) {
        // The thread stops once it has drained everything logged before the
        // end message.
        self.sender.send(Message::End).ok();

        if let Some(handler) = self.handler.take() {
            handler.join().expect("The logger thread should stop.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedLogger {
        values: Arc<Mutex<Vec<String>>>,
    }

    impl Logger<String> for SharedLogger {
        fn log(&mut self, item: String) {
            self.values.lock().unwrap().push(item);
        }
    }

    #[test]
    fn forwards_items_to_the_wrapped_logger() {
        let inner = SharedLogger::default();
        let mut logger = AsyncLogger::new(inner.clone());

        logger.log("one".to_string());
        logger.log("two".to_string());
        logger.sync();

        assert_eq!(
            vec!["one".to_string(), "two".to_string()],
            inner.values.lock().unwrap().clone()
        );
    }

    #[test]
    fn drop_drains_pending_items() {
        let inner = SharedLogger::default();
        let mut logger = AsyncLogger::new(inner.clone());

        logger.log("pending".to_string());
        drop(logger);

        assert_eq!(1, inner.values.lock().unwrap().len());
    }
}
