mod email_batch_get;
mod email_batch_records_get;
mod email_batch_remove;
mod email_send;
mod email_send_csv;
mod status_get;

pub use self::{
    email_batch_get::email_batch_get, email_batch_records_get::email_batch_records_get,
    email_batch_remove::email_batch_remove, email_send::email_send,
    email_send_csv::email_send_csv, status_get::status_get,
};
