//! Parent notifier
//!
//! The consuming workflow (an order line, a preview strip, ...) implements
//! [`ImagesConsumer`] and receives the ordered finalized images after every
//! session mutation.

use crate::state::data::EncodedImage;

/// Receives the current finalized images, in slot order, with uncropped
/// slots left out
pub trait ImagesConsumer: Send {
    fn on_images_update(&mut self, images: &[EncodedImage]);
}

impl<F> ImagesConsumer for F
where
    F: FnMut(&[EncodedImage]) + Send,
{
    fn on_images_update(&mut self, images: &[EncodedImage]) {
        self(images)
    }
}
