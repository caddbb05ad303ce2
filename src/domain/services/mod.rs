pub mod path_service;
pub mod structure_classifier;
