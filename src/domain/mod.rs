// Domain layer - boiler samples and the pure analytics over them
pub mod daily;
pub mod hourly;
pub mod off_hours;
pub mod sample;
pub mod smoothing;
pub mod validation;
