//! [`ActorEntity`] implementation for [`Order`].
//!
//! Identity is the backend's order id. A patch is a partial wire record
//! merged with [`Order::merge`], which keeps the display date and time.

use crate::framework::ActorEntity;
use crate::model::{Order, RawOrder};

impl ActorEntity for Order {
    type Id = String;
    type Patch = RawOrder;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: RawOrder) {
        self.merge(patch);
    }
}
