use mongodb::bson::{doc, Bson, Document};

pub const STATUS_SHIPPED: &str = "shipped";

/// `$set` applied by `PATCH /unpaid/{id}`: back to unpaid, status cleared.
pub fn unpaid_update() -> Document {
    doc! { "$set": { "paid": false, "status": Bson::Null } }
}

/// `$set` applied by `PATCH /shipped/{id}`. `paid` is left alone.
pub fn shipped_update() -> Document {
    doc! { "$set": { "status": STATUS_SHIPPED } }
}
