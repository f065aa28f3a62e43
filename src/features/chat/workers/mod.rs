mod chat_archive;

pub use chat_archive::ChatArchiveWorker;
