pub mod checkpoint_verification;
pub mod location_sample;
pub mod photo;
pub mod report;
pub mod sync_queue_item;
pub mod sync_result;
pub mod time_record;

pub use checkpoint_verification::{CheckpointVerification, CheckpointVerificationDraft};
pub use location_sample::{LocationSample, LocationSampleDraft};
pub use photo::{Photo, PhotoDraft};
pub use report::{Report, ReportDraft};
pub use sync_queue_item::SyncQueueItem;
pub use sync_result::SyncResult;
pub use time_record::{TimeRecord, TimeRecordDraft, TimeRecordKind};
