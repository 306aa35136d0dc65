//! Uploads: a server-less progress simulator and a narrating uploader.

mod simulator;
mod uploader;

pub use simulator::UploadSimulator;
pub use uploader::Uploader;
