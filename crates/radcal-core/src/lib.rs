pub mod band;
pub mod batch;
pub mod calibration;
pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod metadata;
pub mod panel;
pub mod pipeline;
pub mod radiometry;
pub mod region;
pub mod undistort;
