mod api_ext;
mod batch;
mod batch_id;
mod batch_report;
mod batch_reporter;
mod batch_status;
mod batch_store;
mod batch_submission;
mod database_ext;
mod dispatch_request;
mod memory_batch_store;
mod send_record;

pub use self::{
    api_ext::BatchesApi,
    batch::Batch,
    batch_id::BatchId,
    batch_report::{BatchReport, BatchReportTrigger},
    batch_reporter::{BatchReporter, ServerLogReporter},
    batch_status::BatchStatus,
    batch_store::BatchStore,
    batch_submission::BatchSubmission,
    dispatch_request::{DispatchRequest, Recipients},
    memory_batch_store::MemoryBatchStore,
    send_record::SendRecord,
};
