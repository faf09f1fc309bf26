mod batch_reports_send_job;

pub(crate) use batch_reports_send_job::BatchReportsSendJob;
